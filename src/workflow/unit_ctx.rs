//! 单元处理上下文
//!
//! 封装"我正在处理哪份答卷的第几道题"这一信息

use std::fmt::Display;

/// 单元处理上下文
///
/// 包含处理单个题目单元所需的全部上下文信息
#[derive(Debug, Clone)]
pub struct UnitCtx {
    /// 答卷序号（从 1 开始，仅用于日志显示）
    pub attempt_index: usize,

    /// 单元在答卷中的序号（从 1 开始）
    pub question_no: usize,

    /// 答卷里的单元总数
    pub question_total: usize,

    /// 题目目录标签
    pub folder: String,

    /// 答卷标识（路径用）
    pub attempt_slug: String,

    /// 学生显示名（页眉用）
    pub display_name: String,
}

impl Display for UnitCtx {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "[答卷#{} 题目 {}/{} {}]",
            self.attempt_index, self.question_no, self.question_total, self.folder
        )
    }
}
