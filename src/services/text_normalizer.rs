//! 文本整理 - 业务能力层
//!
//! 作答与题干文本进入排版之前的三个独立变换：
//! - 字数统计：在文本末尾附加 "N words, M characters" 说明；
//! - rem 字号修正：上游编辑器会在 `<span>` 的 style 里写出 rem 单位的
//!   字号，排版后文字小到无法阅读，这里把 rem 值改写成百分比；
//! - 不间断空格修正：原始的 U+00A0 字节序列会干扰排版器，改写为
//!   显式的 `&nbsp;` 实体。
//!
//! 每个变换都只做字符串到字符串的纯转换，是否启用由导出选项决定。

use std::ops::Range;

use crate::models::question::TextFormat;
use crate::utils::html;

/// 在文本末尾附加字数统计
///
/// 字数与字符数都基于去掉标记后的纯文本，字符数不含空白。HTML 文本的
/// 统计说明包装成独立的块元素，纯文本则隔一个空行直接附加。
pub fn append_statistics(text: &str, format: TextFormat) -> String {
    let plain = match format {
        TextFormat::Html => html::decode_entities(&html::strip_tags(text)),
        TextFormat::Plain => text.to_string(),
    };

    let words = plain.split_whitespace().count();
    let chars = plain.chars().filter(|c| !c.is_whitespace()).count();
    let note = format!("{} words, {} characters (not counting spaces)", words, chars);

    match format {
        TextFormat::Html => format!("{}<div>\n\n{}</div>", text, note),
        TextFormat::Plain => format!("{}\n\n{}", text, note),
    }
}

/// 把 `<span style="...font-size: <v>rem...">` 里的 rem 字号改写为百分比
///
/// rem 相对于 16px 基准，改写为 `round(v * 100)` 加 `%`。匹配大小写
/// 不敏感，容忍 style 前后的其他属性与单双引号，但不会越过 style
/// 属性值的闭合引号。没有 rem 字号声明的 `<span>` 原样保留。
pub fn fix_rem_font_size(input: &str) -> String {
    let mut edits: Vec<(Range<usize>, String)> = Vec::new();
    let mut pos = 0;

    while let Some(tag) = html::next_tag(input, pos) {
        pos = tag.range.end;
        if tag.closing || tag.name != "span" {
            continue;
        }

        let tag_src = &input[tag.range.clone()];
        let Some(style) = html::attr_value_range(tag_src, "style") else {
            continue;
        };

        if let Some((value_range, value)) = find_rem_font_size(&tag_src[style.clone()]) {
            let percent = format!("{}%", (value * 100.0).round() as i64);
            let start = tag.range.start + style.start + value_range.start;
            let end = tag.range.start + style.start + value_range.end;
            edits.push((start..end, percent));
        }
    }

    html::apply_edits(input, edits)
}

/// 在 style 声明里查找 `font-size: <数字>rem`
///
/// 返回从数字开始到 `rem` 结束的范围和解析出的数值。
fn find_rem_font_size(style: &str) -> Option<(Range<usize>, f64)> {
    let lower = style.to_ascii_lowercase();
    let bytes = style.as_bytes();
    let mut search_from = 0;

    while let Some(found) = lower[search_from..].find("font-size") {
        let prop_start = search_from + found;
        search_from = prop_start + "font-size".len();

        // 属性名必须是完整的词，排除 x-font-size 之类
        if prop_start > 0 {
            let before = bytes[prop_start - 1];
            if before.is_ascii_alphanumeric() || before == b'-' {
                continue;
            }
        }

        let mut i = search_from;
        while i < bytes.len() && bytes[i].is_ascii_whitespace() {
            i += 1;
        }
        if i >= bytes.len() || bytes[i] != b':' {
            continue;
        }
        i += 1;
        while i < bytes.len() && bytes[i].is_ascii_whitespace() {
            i += 1;
        }

        let number_start = i;
        while i < bytes.len() && (bytes[i].is_ascii_digit() || bytes[i] == b'.') {
            i += 1;
        }
        if i == number_start {
            continue;
        }
        let value: f64 = match style[number_start..i].parse() {
            Ok(v) => v,
            Err(_) => continue,
        };

        let mut unit_start = i;
        while unit_start < bytes.len() && bytes[unit_start].is_ascii_whitespace() {
            unit_start += 1;
        }
        let unit_end = unit_start + 3;
        if unit_end > bytes.len() || !lower.is_char_boundary(unit_end) {
            continue;
        }
        if !lower[unit_start..unit_end].eq_ignore_ascii_case("rem") {
            continue;
        }
        // 其他单位（pt、px、%）不会造成问题，只处理 rem
        if unit_end < bytes.len() && bytes[unit_end].is_ascii_alphabetic() {
            continue;
        }

        return Some((number_start..unit_end, value));
    }

    None
}

/// 把原始的不间断空格字符改写为 `&nbsp;` 实体
pub fn replace_nonbreaking_space(text: &str) -> String {
    text.replace('\u{a0}', "&nbsp;")
}
