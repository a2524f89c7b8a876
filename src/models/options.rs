//! 导出选项
//!
//! 一次导出任务的全部配置。在任务入口处构造一次，之后只读，
//! 贯穿所有组件调用。

use serde::Deserialize;

use crate::error::OptionsError;

/// 页边距允许的最大值（毫米）
const MARGIN_MAX: u32 = 80;

/// 字号允许的范围（磅）
const FONT_SIZE_MIN: u32 = 6;
const FONT_SIZE_MAX: u32 = 50;

/// 姓名排序方式，影响路径与文档内显示的姓名
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NameOrdering {
    /// 姓 - 名
    LastFirst,
    /// 名 - 姓
    FirstLast,
    /// 姓 - 名 - 用户名
    LastFirstUser,
}

/// 字体族
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FontFamily {
    Serif,
    Sans,
    Mono,
}

/// 正文对齐方式
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TextAlignment {
    Left,
    Justify,
}

/// 页边距（毫米）
#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(default)]
pub struct PageMargins {
    pub left: u32,
    pub right: u32,
    pub top: u32,
    pub bottom: u32,
}

impl Default for PageMargins {
    fn default() -> Self {
        Self {
            left: 20,
            right: 50,
            top: 20,
            bottom: 20,
        }
    }
}

/// 导出选项
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ExportOptions {
    /// 姓名排序方式
    pub name_ordering: NameOrdering,
    /// 每个用户按评分规则最多导出一份答卷
    pub only_one_per_user: bool,
    /// 是否打包附件
    pub include_attachments: bool,
    /// 是否为每个单元生成题干文档
    pub include_question_text: bool,
    /// 是否在作答后附加字数统计
    pub include_statistics: bool,
    /// 是否缩短姓名（40 字符）与测验名（15 字符），控制路径长度
    pub shorten_names: bool,
    /// 是否把一份答卷的所有作答合并到同一份文档
    pub all_in_one: bool,
    /// 强制使用题干的纯文本摘要
    pub force_question_text_summary: bool,
    /// 是否启用 rem 字号修正
    pub fix_rem_font_size: bool,
    /// 字体族
    pub font: FontFamily,
    /// 字号（磅）
    pub font_size: u32,
    /// 行距倍数
    pub line_spacing: f64,
    /// 页边距
    pub margins: PageMargins,
    /// 正文对齐方式
    pub text_alignment: TextAlignment,
    /// 页脚保留高度（毫米），自动分页会在底边距之外再空出这段距离
    pub footer_reservation: f64,
}

impl Default for ExportOptions {
    fn default() -> Self {
        Self {
            name_ordering: NameOrdering::LastFirst,
            only_one_per_user: false,
            include_attachments: true,
            include_question_text: true,
            include_statistics: false,
            shorten_names: false,
            all_in_one: false,
            force_question_text_summary: false,
            fix_rem_font_size: true,
            font: FontFamily::Sans,
            font_size: 12,
            line_spacing: 1.5,
            margins: PageMargins::default(),
            text_alignment: TextAlignment::Left,
            footer_reservation: 15.0,
        }
    }
}

impl ExportOptions {
    /// 校验选项取值
    ///
    /// 必须在任务开始之前调用，不合法的配置不会产生任何输出。
    pub fn validate(&self) -> Result<(), OptionsError> {
        let margins = [
            self.margins.left,
            self.margins.right,
            self.margins.top,
            self.margins.bottom,
        ];
        for margin in margins {
            if margin > MARGIN_MAX {
                return Err(OptionsError::MarginOutOfRange { value: margin });
            }
        }

        if !(FONT_SIZE_MIN..=FONT_SIZE_MAX).contains(&self.font_size) {
            return Err(OptionsError::FontSizeOutOfRange {
                value: self.font_size,
            });
        }

        Ok(())
    }
}
