//! 数据来源能力 - 基础设施层
//!
//! 导出管线不直接访问任何存储，答卷选取、题目内容和内嵌资源都
//! 通过这里的两个能力接口注入。接口之外的东西（查询语句、权限、
//! 偏好设置）全部留在协作者一侧。

use std::path::PathBuf;

use crate::error::SourceError;
use crate::models::attempt::{AttemptFilter, AttemptRecord};
use crate::models::question::SlotContent;

/// 题干里一处内嵌资源的引用
///
/// 对应站点上 `/pluginfile.php/<context>/question/questiontext/
/// <usage>/<slot>/<questionid>/<filename>` 形式的链接。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourceRef {
    pub context_id: u64,
    pub usage_id: u64,
    pub slot: u64,
    pub question_id: u64,
    pub filename: String,
}

/// 答卷与题目内容的来源
pub trait AttemptSource {
    /// 测验里是否存在论述题（随机题槽位也算，它可能落为论述题）
    fn has_essay_questions(&self) -> Result<bool, SourceError>;

    /// 按筛选条件返回已完成的答卷，顺序稳定
    fn finished_attempts(
        &self,
        filter: &AttemptFilter,
    ) -> Result<Vec<AttemptRecord>, SourceError>;

    /// 返回一份答卷按槽位顺序排列的题目内容
    fn slots(&self, attempt_id: u64) -> Result<Vec<SlotContent>, SourceError>;
}

/// 内嵌资源解析能力
pub trait ResourceResolver {
    /// 把资源引用解析为本地可读的文件路径
    fn resolve(&self, reference: &ResourceRef) -> Result<PathBuf, SourceError>;
}
