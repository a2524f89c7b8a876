//! HTML 与纯文本到排版块的拍平
//!
//! 排版器只认两种块：带样式行内片段的段落，和独立成块的图片。
//! 这里把作答与题干常见的标记拍平成这两种块：`<p>`/`<div>`/`<li>`
//! 和标题开新段，`<br>` 在段内换行，`<b>`/`<i>` 与 span 上的百分比
//! 字号转成行内样式（rem 修正产出的正是百分比字号），`<img>` 变成
//! 图片块。其余标签忽略。

use crate::utils::html;

/// 行内片段
#[derive(Debug, Clone, PartialEq)]
pub enum Inline {
    Text {
        text: String,
        bold: bool,
        italic: bool,
        /// 相对正文字号的缩放
        scale: f64,
    },
    /// 段内强制换行
    Break,
}

/// 排版块
#[derive(Debug, Clone, PartialEq)]
pub enum Block {
    Paragraph(Vec<Inline>),
    Image { path: String },
}

/// 当前生效的行内样式
#[derive(Debug, Clone, Copy)]
struct Style {
    bold: bool,
    italic: bool,
    scale: f64,
}

impl Style {
    fn plain() -> Self {
        Self {
            bold: false,
            italic: false,
            scale: 1.0,
        }
    }
}

/// 标题的字号缩放
fn heading_scale(name: &str) -> Option<f64> {
    match name {
        "h1" => Some(1.5),
        "h2" => Some(1.3),
        "h3" => Some(1.17),
        "h4" => Some(1.0),
        "h5" => Some(0.9),
        "h6" => Some(0.75),
        _ => None,
    }
}

/// 把 HTML 拍平成排版块
pub fn flatten_html(input: &str) -> Vec<Block> {
    let mut blocks: Vec<Block> = Vec::new();
    let mut current: Vec<Inline> = Vec::new();
    // (标签名, 进入之前的样式)
    let mut stack: Vec<(String, Style)> = Vec::new();
    let mut style = Style::plain();
    let mut pos = 0;

    loop {
        let tag = html::next_tag(input, pos);
        let text_end = tag.as_ref().map(|t| t.range.start).unwrap_or(input.len());

        if text_end > pos {
            push_text(&mut current, &input[pos..text_end], style);
        }

        let Some(tag) = tag else {
            break;
        };
        pos = tag.range.end;
        let tag_src = &input[tag.range.clone()];

        if tag.closing {
            match tag.name.as_str() {
                "p" | "div" | "li" | "h1" | "h2" | "h3" | "h4" | "h5" | "h6" => {
                    flush(&mut blocks, &mut current);
                    pop_style(&mut stack, &mut style, &tag.name);
                }
                "b" | "strong" | "i" | "em" | "span" => {
                    pop_style(&mut stack, &mut style, &tag.name);
                }
                _ => {}
            }
            continue;
        }

        match tag.name.as_str() {
            "p" | "div" => {
                flush(&mut blocks, &mut current);
                stack.push((tag.name.clone(), style));
            }
            "li" => {
                flush(&mut blocks, &mut current);
                stack.push((tag.name.clone(), style));
                current.push(Inline::Text {
                    text: "- ".to_string(),
                    bold: style.bold,
                    italic: style.italic,
                    scale: style.scale,
                });
            }
            "h1" | "h2" | "h3" | "h4" | "h5" | "h6" => {
                flush(&mut blocks, &mut current);
                stack.push((tag.name.clone(), style));
                style.bold = true;
                if let Some(scale) = heading_scale(&tag.name) {
                    style.scale *= scale;
                }
            }
            "br" => {
                current.push(Inline::Break);
            }
            "b" | "strong" => {
                stack.push((tag.name.clone(), style));
                style.bold = true;
            }
            "i" | "em" => {
                stack.push((tag.name.clone(), style));
                style.italic = true;
            }
            "span" => {
                stack.push((tag.name.clone(), style));
                if let Some(range) = html::attr_value_range(tag_src, "style") {
                    if let Some(percent) = find_percent_font_size(&tag_src[range]) {
                        style.scale *= percent / 100.0;
                    }
                }
            }
            "img" => {
                if let Some(range) = html::attr_value_range(tag_src, "src") {
                    flush(&mut blocks, &mut current);
                    blocks.push(Block::Image {
                        path: tag_src[range].to_string(),
                    });
                }
            }
            _ => {}
        }
    }

    flush(&mut blocks, &mut current);
    blocks
}

/// 把纯文本拍平成排版块：空行分段，单个换行在段内换行
pub fn flatten_plain(input: &str) -> Vec<Block> {
    let mut blocks = Vec::new();

    for paragraph in input.split("\n\n") {
        let mut inlines: Vec<Inline> = Vec::new();
        for (index, line) in paragraph.lines().enumerate() {
            if index > 0 {
                inlines.push(Inline::Break);
            }
            if !line.trim().is_empty() {
                inlines.push(Inline::Text {
                    text: line.to_string(),
                    bold: false,
                    italic: false,
                    scale: 1.0,
                });
            }
        }
        if !inlines.is_empty() {
            blocks.push(Block::Paragraph(inlines));
        }
    }

    blocks
}

/// 把一段原始文本按 HTML 规则折叠空白后追加到当前段落
fn push_text(current: &mut Vec<Inline>, raw: &str, style: Style) {
    let decoded = html::decode_entities(raw);
    let collapsed = collapse_whitespace(&decoded);
    if collapsed.is_empty() {
        return;
    }
    current.push(Inline::Text {
        text: collapsed,
        bold: style.bold,
        italic: style.italic,
        scale: style.scale,
    });
}

/// HTML 语义的空白折叠：连续空白变成一个空格
fn collapse_whitespace(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut in_whitespace = false;

    for c in text.chars() {
        // 不间断空格保留为普通空格，但不参与折叠后的去除
        if c.is_whitespace() {
            if !in_whitespace && !out.is_empty() {
                out.push(' ');
            }
            in_whitespace = true;
        } else {
            out.push(c);
            in_whitespace = false;
        }
    }

    if out.ends_with(' ') {
        out.pop();
    }
    out
}

/// 在 style 声明里查找百分比字号
fn find_percent_font_size(style: &str) -> Option<f64> {
    let lower = style.to_ascii_lowercase();
    let found = lower.find("font-size")?;
    let rest = &style[found + "font-size".len()..];
    let rest = rest.trim_start();
    let rest = rest.strip_prefix(':')?.trim_start();

    let digits: String = rest
        .chars()
        .take_while(|c| c.is_ascii_digit() || *c == '.')
        .collect();
    let value: f64 = digits.parse().ok()?;

    let after = rest[digits.len()..].trim_start();
    if after.starts_with('%') {
        Some(value)
    } else {
        None
    }
}

fn flush(blocks: &mut Vec<Block>, current: &mut Vec<Inline>) {
    if current.is_empty() {
        return;
    }
    let inlines = std::mem::take(current);
    // 只有换行没有文字的段落不值得保留
    if inlines.iter().any(|i| matches!(i, Inline::Text { .. })) {
        blocks.push(Block::Paragraph(inlines));
    }
}

fn pop_style(stack: &mut Vec<(String, Style)>, style: &mut Style, name: &str) {
    if let Some(position) = stack.iter().rposition(|(n, _)| n == name) {
        let (_, saved) = stack.remove(position);
        *style = saved;
        stack.truncate(position);
    }
}
