//! 文档渲染状态机 - 业务能力层
//!
//! 按输出种类（题干 / 作答）各维护一个文档缓冲。每次渲染调用都会在
//! 对应缓冲里开一个新页组写入内容；要求出件（shipout）时结束文档、
//! 返回编码字节并清空该缓冲，否则缓冲保持打开，下一次调用继续往同
//! 一份文档里追加页组。是否出件由调用方决定：逐题出件得到"一题一个
//! 文件"，只在答卷最后一题出件得到"一份答卷一个文件"。

use crate::error::RenderError;
use crate::models::options::ExportOptions;
use crate::models::question::TextFormat;
use crate::pdf::composer::{PageLayout, PdfComposer};
use crate::pdf::flatten::{flatten_html, flatten_plain};
use crate::services::text_normalizer;

/// 输出种类，各自独占一个缓冲槽
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputKind {
    QuestionText = 0,
    Response = 1,
}

/// 一次渲染请求
#[derive(Debug)]
pub struct RenderRequest<'a> {
    pub kind: OutputKind,
    pub text: &'a str,
    pub format: TextFormat,
    /// 页眉第一行（粗体）
    pub header: &'a str,
    /// 页眉第二行
    pub subheader: &'a str,
    /// 记入文档信息的作者名
    pub author: &'a str,
    /// 是否结束文档并返回字节
    pub shipout: bool,
}

/// 文档渲染器
pub struct DocumentRenderer {
    layout: PageLayout,
    fix_rem_font_size: bool,
    buffers: [Option<PdfComposer>; 2],
}

impl DocumentRenderer {
    pub fn new(options: &ExportOptions) -> Self {
        Self {
            layout: PageLayout::from_options(options),
            fix_rem_font_size: options.fix_rem_font_size,
            buffers: [None, None],
        }
    }

    /// 渲染一段内容
    ///
    /// 出件时返回完整的 PDF 字节，否则返回 `None` 并保留缓冲。
    /// 渲染出错时对应缓冲会被丢弃，不会把坏状态留给下一个单元。
    pub fn render(&mut self, request: &RenderRequest<'_>) -> Result<Option<Vec<u8>>, RenderError> {
        let text = self.normalize(request.text, request.format);

        let slot = request.kind as usize;
        let mut composer = match self.buffers[slot].take() {
            Some(open) => open,
            None => PdfComposer::new(self.layout.clone(), request.author)?,
        };

        composer.begin_group(request.header, request.subheader);

        let blocks = match request.format {
            TextFormat::Html => flatten_html(&text),
            TextFormat::Plain => flatten_plain(&text),
        };
        composer.write_blocks(&blocks)?;

        if request.shipout {
            Ok(Some(composer.finish()?))
        } else {
            self.buffers[slot] = Some(composer);
            Ok(None)
        }
    }

    /// 丢弃所有未出件的缓冲
    ///
    /// 在一份答卷处理完后调用，避免出错时残留的页组泄漏进下一份
    /// 答卷的文档。
    pub fn discard_open(&mut self) {
        self.buffers = [None, None];
    }

    /// 指定种类的缓冲里已累积的页组数，没有打开的缓冲时为 0
    pub fn open_group_count(&self, kind: OutputKind) -> usize {
        self.buffers[kind as usize]
            .as_ref()
            .map(|composer| composer.group_count())
            .unwrap_or(0)
    }

    /// 排版前的文本整理：不间断空格改写 + 可选的 rem 字号修正
    fn normalize(&self, text: &str, format: TextFormat) -> String {
        match format {
            TextFormat::Html => {
                let text = text_normalizer::replace_nonbreaking_space(text);
                if self.fix_rem_font_size {
                    text_normalizer::fix_rem_font_size(&text)
                } else {
                    text
                }
            }
            TextFormat::Plain => text.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request<'a>(kind: OutputKind, shipout: bool) -> RenderRequest<'a> {
        RenderRequest {
            kind,
            text: "<p>body text</p>",
            format: TextFormat::Html,
            header: "Response",
            subheader: "Lee Ann",
            author: "Lee Ann",
            shipout,
        }
    }

    #[test]
    fn test_shipout_returns_bytes_and_clears_buffer() {
        let options = ExportOptions::default();
        let mut renderer = DocumentRenderer::new(&options);

        let bytes = renderer
            .render(&request(OutputKind::Response, true))
            .unwrap();
        assert!(bytes.is_some());
        assert_eq!(renderer.open_group_count(OutputKind::Response), 0);
    }

    #[test]
    fn test_open_buffer_accumulates_page_groups() {
        let options = ExportOptions::default();
        let mut renderer = DocumentRenderer::new(&options);

        assert!(renderer
            .render(&request(OutputKind::Response, false))
            .unwrap()
            .is_none());
        assert!(renderer
            .render(&request(OutputKind::Response, false))
            .unwrap()
            .is_none());
        assert_eq!(renderer.open_group_count(OutputKind::Response), 2);

        // 第三次出件：一个文档三个页组
        let bytes = renderer
            .render(&request(OutputKind::Response, true))
            .unwrap()
            .unwrap();
        assert!(bytes.starts_with(b"%PDF"));
        assert_eq!(renderer.open_group_count(OutputKind::Response), 0);
    }

    #[test]
    fn test_kinds_use_independent_buffers() {
        let options = ExportOptions::default();
        let mut renderer = DocumentRenderer::new(&options);

        renderer
            .render(&request(OutputKind::Response, false))
            .unwrap();
        renderer
            .render(&request(OutputKind::QuestionText, false))
            .unwrap();

        assert_eq!(renderer.open_group_count(OutputKind::Response), 1);
        assert_eq!(renderer.open_group_count(OutputKind::QuestionText), 1);

        renderer.discard_open();
        assert_eq!(renderer.open_group_count(OutputKind::Response), 0);
        assert_eq!(renderer.open_group_count(OutputKind::QuestionText), 0);
    }

    #[test]
    fn test_rem_fix_is_applied_before_composition() {
        let options = ExportOptions::default();
        let renderer = DocumentRenderer::new(&options);

        let normalized = renderer.normalize(
            r#"<span style="font-size: 0.9375rem">x</span>"#,
            TextFormat::Html,
        );
        assert!(normalized.contains("font-size: 94%"));
    }
}
