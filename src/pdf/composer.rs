//! 分页文档排版器
//!
//! 在 printpdf 之上维护一个正在排版的 PDF 文档：固定 A4 页面、
//! 页眉页脚、按估算字宽折行、嵌入本地图片。页面编号按页组计，
//! 每开一个新页组从 1 重新计数，对应"一份文档里的一个小节"。

use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use printpdf::{
    image_crate, BuiltinFont, Image, ImageTransform, IndirectFontRef, Line, Mm, PdfDocument,
    PdfDocumentReference, PdfLayerReference, Point,
};

use crate::error::RenderError;
use crate::models::options::{ExportOptions, FontFamily, TextAlignment};
use crate::pdf::flatten::{Block, Inline};
use crate::pdf::metrics::{self, PT_TO_MM};

/// A4 页面尺寸（毫米）
const PAGE_WIDTH: f64 = 210.0;
const PAGE_HEIGHT: f64 = 297.0;

/// 行高在行距之外的固定基数
const LINE_BASE: f64 = 1.25;

/// 嵌入图片按此分辨率换算物理尺寸
const IMAGE_DPI: f64 = 96.0;

/// 页面几何与排版参数，从导出选项导出
#[derive(Debug, Clone)]
pub struct PageLayout {
    pub font: FontFamily,
    pub font_size: f64,
    pub line_spacing: f64,
    pub margin_left: f64,
    pub margin_right: f64,
    pub margin_top: f64,
    pub margin_bottom: f64,
    pub footer_reservation: f64,
    pub alignment: TextAlignment,
}

impl PageLayout {
    pub fn from_options(options: &ExportOptions) -> Self {
        Self {
            font: options.font,
            font_size: f64::from(options.font_size),
            line_spacing: options.line_spacing,
            margin_left: f64::from(options.margins.left),
            margin_right: f64::from(options.margins.right),
            margin_top: f64::from(options.margins.top),
            margin_bottom: f64::from(options.margins.bottom),
            footer_reservation: options.footer_reservation,
            alignment: options.text_alignment,
        }
    }

    /// 页眉起始位置就是上边距
    fn header_margin(&self) -> f64 {
        self.margin_top
    }

    /// 正文上边界：上边距之外再留出与行距、字号成比例的一段，
    /// 保证正文与页眉拉开距离
    fn body_top(&self) -> f64 {
        self.margin_top + self.line_spacing * self.font_size
    }

    /// 自动分页的下边界：底边距之外再给页脚留一段
    fn bottom_limit(&self) -> f64 {
        PAGE_HEIGHT - self.margin_bottom - self.footer_reservation
    }

    fn content_width(&self) -> f64 {
        PAGE_WIDTH - self.margin_left - self.margin_right
    }

    /// 正文行高（毫米）
    fn line_height(&self, size_pt: f64) -> f64 {
        self.line_spacing * LINE_BASE * size_pt * PT_TO_MM
    }
}

struct FontSet {
    regular: IndirectFontRef,
    bold: IndirectFontRef,
    italic: IndirectFontRef,
    bold_italic: IndirectFontRef,
}

impl FontSet {
    fn load(doc: &PdfDocumentReference, family: FontFamily) -> Result<Self, RenderError> {
        let (regular, bold, italic, bold_italic) = match family {
            FontFamily::Serif => (
                BuiltinFont::TimesRoman,
                BuiltinFont::TimesBold,
                BuiltinFont::TimesItalic,
                BuiltinFont::TimesBoldItalic,
            ),
            FontFamily::Mono => (
                BuiltinFont::Courier,
                BuiltinFont::CourierBold,
                BuiltinFont::CourierOblique,
                BuiltinFont::CourierBoldOblique,
            ),
            FontFamily::Sans => (
                BuiltinFont::Helvetica,
                BuiltinFont::HelveticaBold,
                BuiltinFont::HelveticaOblique,
                BuiltinFont::HelveticaBoldOblique,
            ),
        };

        Ok(Self {
            regular: doc.add_builtin_font(regular).map_err(RenderError::pdf)?,
            bold: doc.add_builtin_font(bold).map_err(RenderError::pdf)?,
            italic: doc.add_builtin_font(italic).map_err(RenderError::pdf)?,
            bold_italic: doc
                .add_builtin_font(bold_italic)
                .map_err(RenderError::pdf)?,
        })
    }

    fn pick(&self, bold: bool, italic: bool) -> &IndirectFontRef {
        match (bold, italic) {
            (true, true) => &self.bold_italic,
            (true, false) => &self.bold,
            (false, true) => &self.italic,
            (false, false) => &self.regular,
        }
    }
}

/// 折行后的一个词
struct StyledWord {
    text: String,
    bold: bool,
    italic: bool,
    size: f64,
    width: f64,
}

/// 一个正在排版的 PDF 文档
pub struct PdfComposer {
    doc: PdfDocumentReference,
    layer: PdfLayerReference,
    fonts: FontSet,
    layout: PageLayout,
    /// 距页面顶端的纵向位置，指向下一块内容的上边
    cursor_y: f64,
    header: String,
    subheader: String,
    group_count: usize,
    page_in_group: usize,
    page_count: usize,
}

impl PdfComposer {
    /// 新建空文档，第一组内容要等 `begin_group` 才会有页面可写
    pub fn new(layout: PageLayout, title: &str) -> Result<Self, RenderError> {
        let title = if title.is_empty() {
            "Essay responses"
        } else {
            title
        };
        let (doc, page, layer) =
            PdfDocument::new(title, mm(PAGE_WIDTH), mm(PAGE_HEIGHT), "Layer 1");
        let layer = doc.get_page(page).get_layer(layer);
        let fonts = FontSet::load(&doc, layout.font)?;

        Ok(Self {
            doc,
            layer,
            fonts,
            cursor_y: layout.body_top(),
            layout,
            header: String::new(),
            subheader: String::new(),
            group_count: 0,
            page_in_group: 0,
            page_count: 0,
        })
    }

    /// 开始一个新页组：换页眉、加新页、页码从 1 重新计
    pub fn begin_group(&mut self, header: &str, subheader: &str) {
        self.header = header.to_string();
        self.subheader = subheader.to_string();
        self.group_count += 1;
        self.page_in_group = 0;
        self.start_page();
    }

    /// 写入一串排版块
    pub fn write_blocks(&mut self, blocks: &[Block]) -> Result<(), RenderError> {
        for block in blocks {
            match block {
                Block::Paragraph(inlines) => self.write_paragraph(inlines),
                Block::Image { path } => self.place_image(path)?,
            }
        }
        Ok(())
    }

    /// 结束排版，编码为 PDF 字节
    pub fn finish(self) -> Result<Vec<u8>, RenderError> {
        self.doc.save_to_bytes().map_err(RenderError::pdf)
    }

    pub fn group_count(&self) -> usize {
        self.group_count
    }

    pub fn page_count(&self) -> usize {
        self.page_count
    }

    // ========== 页面管理 ==========

    fn start_page(&mut self) {
        // 文档创建时自带第一页，之后才需要添加
        if self.page_count > 0 {
            let (page, layer) = self
                .doc
                .add_page(mm(PAGE_WIDTH), mm(PAGE_HEIGHT), "Layer 1");
            self.layer = self.doc.get_page(page).get_layer(layer);
        }
        self.page_count += 1;
        self.page_in_group += 1;
        self.cursor_y = self.layout.body_top();
        self.draw_header();
        self.draw_footer();
    }

    /// 放不下时换页；超过整页高度的内容只在页首硬放
    fn ensure_room(&mut self, needed: f64) {
        if self.cursor_y + needed > self.layout.bottom_limit()
            && self.cursor_y > self.layout.body_top()
        {
            self.start_page();
        }
    }

    fn draw_header(&self) {
        if self.header.is_empty() && self.subheader.is_empty() {
            return;
        }

        let size = self.layout.font_size;
        let line = size * PT_TO_MM * 1.3;
        let mut y = self.layout.header_margin() + size * PT_TO_MM;

        if !self.header.is_empty() {
            self.draw_text(&self.header, &self.fonts.bold, size, self.layout.margin_left, y);
            y += line;
        }
        if !self.subheader.is_empty() {
            self.draw_text(
                &self.subheader,
                &self.fonts.regular,
                size,
                self.layout.margin_left,
                y,
            );
            y += line;
        }

        self.draw_rule(y);
    }

    /// 页脚：按页组计数的页码，字号为正文的 0.8 倍
    fn draw_footer(&self) {
        let size = (0.8 * self.layout.font_size).round();
        let text = format!("Page {}", self.page_in_group);
        let width = metrics::text_width_mm(&text, self.layout.font, false, size);
        let x = (PAGE_WIDTH - width) / 2.0;
        let y = self.layout.bottom_limit() + 0.6 * self.layout.footer_reservation;
        self.draw_text(&text, &self.fonts.regular, size, x, y);
    }

    fn draw_rule(&self, y_from_top: f64) {
        let y = mm(PAGE_HEIGHT - y_from_top);
        let points = vec![
            (Point::new(mm(self.layout.margin_left), y), false),
            (Point::new(mm(PAGE_WIDTH - self.layout.margin_right), y), false),
        ];
        self.layer.set_outline_thickness(0.2 as _);
        self.layer.add_line(Line {
            points,
            is_closed: false,
        });
    }

    /// 在距页面顶端 `y_from_top` 的基线处写一段文本
    fn draw_text(&self, text: &str, font: &IndirectFontRef, size_pt: f64, x: f64, y_from_top: f64) {
        self.layer
            .use_text(text, size_pt as _, mm(x), mm(PAGE_HEIGHT - y_from_top), font);
    }

    // ========== 正文排版 ==========

    fn write_paragraph(&mut self, inlines: &[Inline]) {
        let lines = self.wrap(inlines);
        let avail = self.layout.content_width();

        for (words, hard_end) in &lines {
            if words.is_empty() {
                self.cursor_y += self.layout.line_height(self.layout.font_size);
                continue;
            }

            let max_size = words.iter().map(|w| w.size).fold(self.layout.font_size, f64::max);
            let line_height = self.layout.line_height(max_size);
            self.ensure_room(line_height);

            let natural: f64 = self.natural_line_width(words);
            // 两端对齐只拉开词间距，段落最后一行和强制换行的行保持原样
            let justify_extra = if self.layout.alignment == TextAlignment::Justify
                && !*hard_end
                && words.len() > 1
                && natural < avail
            {
                (avail - natural) / (words.len() - 1) as f64
            } else {
                0.0
            };

            let baseline = self.cursor_y + 0.8 * max_size * PT_TO_MM;
            let mut x = self.layout.margin_left;
            for (index, word) in words.iter().enumerate() {
                if index > 0 {
                    x += self.space_width(word) + justify_extra;
                }
                let font = self.fonts.pick(word.bold, word.italic);
                self.draw_text(&word.text, font, word.size, x, baseline);
                x += word.width;
            }

            self.cursor_y += line_height;
        }

        // 段落之间空半行
        self.cursor_y += 0.5 * self.layout.line_height(self.layout.font_size);
    }

    /// 按估算宽度贪心折行；返回 (行, 是否为段尾或强制换行)
    fn wrap(&self, inlines: &[Inline]) -> Vec<(Vec<StyledWord>, bool)> {
        let avail = self.layout.content_width();
        let mut lines: Vec<(Vec<StyledWord>, bool)> = Vec::new();
        let mut line: Vec<StyledWord> = Vec::new();
        let mut line_width = 0.0;

        for inline in inlines {
            match inline {
                Inline::Break => {
                    lines.push((std::mem::take(&mut line), true));
                    line_width = 0.0;
                }
                Inline::Text {
                    text,
                    bold,
                    italic,
                    scale,
                } => {
                    let size = self.layout.font_size * scale;
                    for token in text.split_whitespace() {
                        let word = StyledWord {
                            text: token.to_string(),
                            bold: *bold,
                            italic: *italic,
                            size,
                            width: metrics::text_width_mm(token, self.layout.font, *bold, size),
                        };
                        let space = if line.is_empty() {
                            0.0
                        } else {
                            self.space_width(&word)
                        };

                        if !line.is_empty() && line_width + space + word.width > avail {
                            lines.push((std::mem::take(&mut line), false));
                            line_width = word.width;
                            line.push(word);
                        } else {
                            line_width += space + word.width;
                            line.push(word);
                        }
                    }
                }
            }
        }

        if !line.is_empty() {
            lines.push((line, true));
        } else if let Some(last) = lines.last_mut() {
            last.1 = true;
        }

        lines
    }

    fn natural_line_width(&self, words: &[StyledWord]) -> f64 {
        let mut width = 0.0;
        for (index, word) in words.iter().enumerate() {
            if index > 0 {
                width += self.space_width(word);
            }
            width += word.width;
        }
        width
    }

    fn space_width(&self, word: &StyledWord) -> f64 {
        metrics::text_width_mm(" ", self.layout.font, false, word.size)
    }

    // ========== 图片 ==========

    fn place_image(&mut self, path: &str) -> Result<(), RenderError> {
        let image = decode_image(path)?;

        let natural_width = image.image.width.0 as f64 * 25.4 / IMAGE_DPI;
        let natural_height = image.image.height.0 as f64 * 25.4 / IMAGE_DPI;
        let scale = (self.layout.content_width() / natural_width).min(1.0);
        let height = natural_height * scale;

        self.ensure_room(height);

        let transform = ImageTransform {
            translate_x: Some(mm(self.layout.margin_left)),
            translate_y: Some(mm(PAGE_HEIGHT - self.cursor_y - height)),
            scale_x: Some(scale as _),
            scale_y: Some(scale as _),
            dpi: Some(IMAGE_DPI as _),
            ..Default::default()
        };
        image.add_to_layer(self.layer.clone(), transform);

        self.cursor_y += height + 0.5 * self.layout.line_height(self.layout.font_size);
        Ok(())
    }
}

/// 按扩展名选择解码器读入图片
fn decode_image(path: &str) -> Result<Image, RenderError> {
    let file = File::open(path).map_err(|e| RenderError::image(path, e))?;
    let reader = BufReader::new(file);

    let extension = Path::new(path)
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase())
        .unwrap_or_default();

    match extension.as_str() {
        "png" => {
            let decoder = image_crate::codecs::png::PngDecoder::new(reader)
                .map_err(|e| RenderError::image(path, e))?;
            Image::try_from(decoder).map_err(|e| RenderError::image(path, e))
        }
        "jpg" | "jpeg" => {
            let decoder = image_crate::codecs::jpeg::JpegDecoder::new(reader)
                .map_err(|e| RenderError::image(path, e))?;
            Image::try_from(decoder).map_err(|e| RenderError::image(path, e))
        }
        "gif" => {
            let decoder = image_crate::codecs::gif::GifDecoder::new(reader)
                .map_err(|e| RenderError::image(path, e))?;
            Image::try_from(decoder).map_err(|e| RenderError::image(path, e))
        }
        "bmp" => {
            let decoder = image_crate::codecs::bmp::BmpDecoder::new(reader)
                .map_err(|e| RenderError::image(path, e))?;
            Image::try_from(decoder).map_err(|e| RenderError::image(path, e))
        }
        _ => Err(RenderError::UnsupportedImage {
            path: path.to_string(),
        }),
    }
}

/// printpdf 的长度单位包装
fn mm(value: f64) -> Mm {
    Mm(value as _)
}
