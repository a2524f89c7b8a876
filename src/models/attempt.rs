//! 答卷模型
//!
//! 一份答卷对应一名学生完成的一次测验提交，由外部数据来源按
//! 筛选条件一次性选出，导出期间不再变化。

use serde::Deserialize;

/// 一份已完成的答卷
#[derive(Debug, Clone, Deserialize)]
pub struct AttemptRecord {
    /// 答卷 ID
    pub id: u64,
    /// 学生名
    pub first_name: String,
    /// 学生姓
    pub last_name: String,
    /// 用户名
    pub username: String,
    /// 完成时间（Unix 时间戳，秒）
    pub finished_at: i64,
}

/// 答卷筛选条件
///
/// 具体的筛选逻辑（分组成员、评分规则）由数据来源实现，
/// 这里只承载条件本身。
#[derive(Debug, Clone, Default)]
pub struct AttemptFilter {
    /// 只选取指定分组的学生
    pub group_id: Option<u64>,
    /// 每个用户按测验的评分规则最多保留一份答卷
    pub only_one_per_user: bool,
}
