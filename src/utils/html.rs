//! HTML 扫描工具
//!
//! 导出管线需要对 HTML 做两类处理：在原文里只替换特定片段（字号修正、
//! 图片路径重写），以及把整段 HTML 拍平成段落供排版使用。这里提供一个
//! 显式的小扫描器，嵌套引号、属性顺序这类边角都可以单独测试，
//! 不依赖正则。

use std::ops::Range;

/// 一次扫描命中的标签
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tag {
    /// 整个标签在原文中的字节范围（含 `<` 与 `>`）
    pub range: Range<usize>,
    /// 小写的标签名
    pub name: String,
    /// 是否为闭合标签（`</p>`）
    pub closing: bool,
}

/// 从 `from` 开始查找下一个标签
///
/// 属性值里的 `>` 不会提前结束标签。形如 `<3` 的普通文本不会被
/// 误认成标签。
pub fn next_tag(html: &str, from: usize) -> Option<Tag> {
    let bytes = html.as_bytes();
    let len = bytes.len();
    let mut i = from;

    while i < len {
        if bytes[i] != b'<' {
            i += 1;
            continue;
        }

        let mut j = i + 1;
        let closing = j < len && bytes[j] == b'/';
        if closing {
            j += 1;
        }

        if j >= len || !bytes[j].is_ascii_alphabetic() {
            i += 1;
            continue;
        }

        let name_start = j;
        while j < len && bytes[j].is_ascii_alphanumeric() {
            j += 1;
        }
        let name = html[name_start..j].to_ascii_lowercase();

        // 扫描到 '>'，引号内的内容原样跳过
        let mut quote: Option<u8> = None;
        let mut k = j;
        while k < len {
            let b = bytes[k];
            match quote {
                Some(q) => {
                    if b == q {
                        quote = None;
                    }
                }
                None => {
                    if b == b'"' || b == b'\'' {
                        quote = Some(b);
                    } else if b == b'>' {
                        return Some(Tag {
                            range: i..k + 1,
                            name,
                            closing,
                        });
                    }
                }
            }
            k += 1;
        }

        // 未闭合的标签，当作普通文本
        return None;
    }

    None
}

/// 在单个标签的源文本里查找属性值的字节范围
///
/// `tag_src` 是 `next_tag` 命中的整个标签（含 `<` 与 `>`）。返回的
/// 范围不含引号。属性名大小写不敏感，支持单引号、双引号和裸值。
pub fn attr_value_range(tag_src: &str, attr: &str) -> Option<Range<usize>> {
    let bytes = tag_src.as_bytes();
    let len = bytes.len();

    // 跳过 '<'、可选的 '/' 和标签名
    let mut i = 1;
    if i < len && bytes[i] == b'/' {
        i += 1;
    }
    while i < len && bytes[i].is_ascii_alphanumeric() {
        i += 1;
    }

    while i < len {
        while i < len && bytes[i].is_ascii_whitespace() {
            i += 1;
        }
        if i >= len || bytes[i] == b'>' {
            return None;
        }
        if bytes[i] == b'/' {
            i += 1;
            continue;
        }

        // 属性名
        let name_start = i;
        while i < len
            && (bytes[i].is_ascii_alphanumeric()
                || bytes[i] == b'-'
                || bytes[i] == b'_'
                || bytes[i] == b':')
        {
            i += 1;
        }
        if i == name_start {
            i += 1;
            continue;
        }
        let name = &tag_src[name_start..i];

        // 可选的 "= 值"
        let mut j = i;
        while j < len && bytes[j].is_ascii_whitespace() {
            j += 1;
        }
        if j < len && bytes[j] == b'=' {
            j += 1;
            while j < len && bytes[j].is_ascii_whitespace() {
                j += 1;
            }
            if j < len && (bytes[j] == b'"' || bytes[j] == b'\'') {
                let quote = bytes[j];
                let value_start = j + 1;
                let mut k = value_start;
                while k < len && bytes[k] != quote {
                    k += 1;
                }
                if name.eq_ignore_ascii_case(attr) {
                    return Some(value_start..k);
                }
                i = (k + 1).min(len);
            } else {
                let value_start = j;
                let mut k = j;
                while k < len && !bytes[k].is_ascii_whitespace() && bytes[k] != b'>' {
                    k += 1;
                }
                if name.eq_ignore_ascii_case(attr) {
                    return Some(value_start..k);
                }
                i = k;
            }
        }
        // 没有 '=' 的布尔属性，直接看下一个
    }

    None
}

/// 解码常见的 HTML 实体，未知实体原样保留
pub fn decode_entities(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut rest = text;

    while let Some(pos) = rest.find('&') {
        out.push_str(&rest[..pos]);
        let after = &rest[pos..];

        if let Some(semi) = after.find(';') {
            // 实体长度有限，避免把普通 '&' 到远处分号的一段当成实体
            if semi > 1 && semi <= 12 {
                if let Some(decoded) = decode_entity(&after[1..semi]) {
                    out.push(decoded);
                    rest = &after[semi + 1..];
                    continue;
                }
            }
        }

        out.push('&');
        rest = &after[1..];
    }

    out.push_str(rest);
    out
}

fn decode_entity(entity: &str) -> Option<char> {
    let decoded = match entity {
        "amp" => '&',
        "lt" => '<',
        "gt" => '>',
        "quot" => '"',
        "apos" => '\'',
        "nbsp" => '\u{a0}',
        _ => {
            let code = if let Some(hex) = entity
                .strip_prefix("#x")
                .or_else(|| entity.strip_prefix("#X"))
            {
                u32::from_str_radix(hex, 16).ok()?
            } else if let Some(dec) = entity.strip_prefix('#') {
                dec.parse::<u32>().ok()?
            } else {
                return None;
            };
            char::from_u32(code)?
        }
    };
    Some(decoded)
}

/// 去掉所有标签，每个标签替换为一个空格，便于统计字数
pub fn strip_tags(html: &str) -> String {
    let mut out = String::with_capacity(html.len());
    let mut pos = 0;

    while let Some(tag) = next_tag(html, pos) {
        out.push_str(&html[pos..tag.range.start]);
        out.push(' ');
        pos = tag.range.end;
    }

    out.push_str(&html[pos..]);
    out
}

/// 把一组互不重叠的替换应用到原文上
///
/// 编辑按起点排序后依次拼接；出现重叠时保留靠前的一个。
pub fn apply_edits(src: &str, mut edits: Vec<(Range<usize>, String)>) -> String {
    edits.sort_by_key(|(range, _)| range.start);

    let mut out = String::with_capacity(src.len());
    let mut pos = 0;
    for (range, replacement) in edits {
        if range.start < pos {
            continue;
        }
        out.push_str(&src[pos..range.start]);
        out.push_str(&replacement);
        pos = range.end;
    }
    out.push_str(&src[pos..]);
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_next_tag_finds_tags_in_order() {
        let html = "a <p class=\"x\">b</p> c";

        let tag = next_tag(html, 0).unwrap();
        assert_eq!(tag.name, "p");
        assert!(!tag.closing);
        assert_eq!(&html[tag.range.clone()], "<p class=\"x\">");

        let tag = next_tag(html, tag.range.end).unwrap();
        assert_eq!(tag.name, "p");
        assert!(tag.closing);
    }

    #[test]
    fn test_next_tag_ignores_gt_inside_quotes() {
        let html = r#"<img alt="a > b" src="x.png">"#;
        let tag = next_tag(html, 0).unwrap();
        assert_eq!(tag.range, 0..html.len());
    }

    #[test]
    fn test_next_tag_skips_plain_angle_brackets() {
        assert!(next_tag("3 < 4 and 5 > 4", 0).is_none());
    }

    #[test]
    fn test_attr_value_range_double_and_single_quotes() {
        let tag = r#"<span class="big" style="font-size: 1rem">"#;
        let range = attr_value_range(tag, "style").unwrap();
        assert_eq!(&tag[range], "font-size: 1rem");

        let tag = "<span style='font-size: 1rem' class='big'>";
        let range = attr_value_range(tag, "style").unwrap();
        assert_eq!(&tag[range], "font-size: 1rem");
    }

    #[test]
    fn test_attr_value_range_is_case_insensitive_and_tolerates_bare_values() {
        let tag = "<IMG SRC=x.png width=100>";
        let range = attr_value_range(tag, "src").unwrap();
        assert_eq!(&tag[range], "x.png");
    }

    #[test]
    fn test_attr_value_range_skips_boolean_attributes() {
        let tag = r#"<input disabled style="color: red">"#;
        let range = attr_value_range(tag, "style").unwrap();
        assert_eq!(&tag[range], "color: red");
    }

    #[test]
    fn test_decode_entities() {
        assert_eq!(decode_entities("a &amp; b &lt;c&gt;"), "a & b <c>");
        assert_eq!(decode_entities("x&nbsp;y"), "x\u{a0}y");
        assert_eq!(decode_entities("&#65;&#x42;"), "AB");
        // 未知实体与孤立的 & 原样保留
        assert_eq!(decode_entities("&unknown; & more"), "&unknown; & more");
    }

    #[test]
    fn test_strip_tags() {
        let text = strip_tags("<p>hello</p><p>world</p>");
        let words: Vec<&str> = text.split_whitespace().collect();
        assert_eq!(words, ["hello", "world"]);
    }

    #[test]
    fn test_apply_edits_replaces_ranges() {
        let out = apply_edits(
            "0123456789",
            vec![(2..4, "AB".to_string()), (6..7, "".to_string())],
        );
        assert_eq!(out, "01AB45789");
    }
}
