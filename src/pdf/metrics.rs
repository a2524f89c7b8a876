//! 字宽估算
//!
//! 内置字体没有完整的度量表，这里按字符类别给出近似宽度
//! （以千分之一 em 计），只用于折行和居中，不影响最终字形。

use crate::models::options::FontFamily;

/// 磅到毫米的换算系数
pub const PT_TO_MM: f64 = 0.352_778;

/// 估算一段文本的宽度（毫米）
pub fn text_width_mm(text: &str, family: FontFamily, bold: bool, size_pt: f64) -> f64 {
    let units: f64 = text.chars().map(|c| char_units(c, family, bold)).sum();
    units / 1000.0 * size_pt * PT_TO_MM
}

/// 单个字符的近似宽度（千分之一 em）
fn char_units(c: char, family: FontFamily, bold: bool) -> f64 {
    // 等宽字体所有字符一样宽
    if family == FontFamily::Mono {
        return 600.0;
    }

    // 全角与 CJK 字符按整 em 算
    if (c as u32) >= 0x2E80 {
        return 1000.0;
    }

    let base = match c {
        'i' | 'j' | 'l' | '!' | ',' | '.' | ':' | ';' | '|' | '\'' | '`' => 278.0,
        'f' | 't' | 'r' | '(' | ')' | '[' | ']' | '{' | '}' | '/' | '\\' | '"' | '-' => 333.0,
        ' ' => 278.0,
        'm' | 'w' | 'M' | 'W' | '@' | '%' => 889.0,
        'A'..='Z' | '&' | '#' => 700.0,
        '0'..='9' | '+' | '=' | '<' | '>' | '~' | '$' | '_' | '^' | '*' => 556.0,
        _ => 556.0,
    };

    let family_factor = match family {
        FontFamily::Serif => 0.92,
        _ => 1.0,
    };
    let bold_factor = if bold { 1.05 } else { 1.0 };

    base * family_factor * bold_factor
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wider_text_measures_wider() {
        let narrow = text_width_mm("ill", FontFamily::Sans, false, 12.0);
        let wide = text_width_mm("MMM", FontFamily::Sans, false, 12.0);
        assert!(wide > narrow);
    }

    #[test]
    fn test_width_scales_with_font_size() {
        let small = text_width_mm("hello", FontFamily::Sans, false, 10.0);
        let large = text_width_mm("hello", FontFamily::Sans, false, 20.0);
        assert!((large - 2.0 * small).abs() < 1e-9);
    }

    #[test]
    fn test_mono_width_is_per_character() {
        let a = text_width_mm("iiii", FontFamily::Mono, false, 12.0);
        let b = text_width_mm("MMMM", FontFamily::Mono, false, 12.0);
        assert!((a - b).abs() < 1e-9);
    }
}
