//! 测验上下文
//!
//! 承载一次导出所针对的测验信息：课程、测验名、课程模块 ID，
//! 以及识别题干内嵌资源所需的站点信息。

use serde::Deserialize;

/// 测验上下文
#[derive(Debug, Clone, Deserialize)]
pub struct QuizContext {
    /// 课程短名称
    pub course_short_name: String,
    /// 测验名称
    pub quiz_name: String,
    /// 课程模块 ID，保证压缩包名称在同名测验之间仍然唯一
    pub course_module_id: u64,
    /// 站点根地址，用于识别题干中的内嵌资源链接
    pub base_url: String,
    /// Web 服务的文档根目录，用于本地路径补偿
    #[serde(default)]
    pub document_root: Option<String>,
    /// 只导出指定分组的答卷
    #[serde(default)]
    pub group_id: Option<u64>,
}
