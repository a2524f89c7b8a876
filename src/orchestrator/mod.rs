//! 编排层（Orchestration Layer）
//!
//! ## 职责
//!
//! 本层负责任务调度和失败隔离，是整个系统的"指挥中心"。
//!
//! ## 模块划分
//!
//! ### `app` - 应用生命周期
//! - 加载数据目录，装配来源与解析器
//! - 投递压缩包或空结果提示
//!
//! ### `export_job` - 导出任务
//! - 选项校验、空结果判断
//! - 逐份答卷驱动抽取与处理
//! - 空包丢弃与全局统计
//!
//! ### `attempt_processor` - 单份答卷处理器
//! - 遍历单份答卷的题目单元
//! - 单元失败转成压缩包里的错误记录
//! - 答卷结束时清理渲染缓冲
//!
//! ## 层次关系
//!
//! ```text
//! app (装配资源，投递结果)
//!     ↓
//! export_job (处理 Vec<AttemptRecord>)
//!     ↓
//! attempt_processor (处理 Vec<QuestionUnit>)
//!     ↓
//! workflow::UnitFlow (处理单个 QuestionUnit)
//!     ↓
//! services (能力层：extract / normalize / render / archive / errors)
//!     ↓
//! infrastructure (基础设施：AttemptSource / ResourceResolver)
//! ```
//!
//! ## 设计原则
//!
//! 1. **单一职责**：export_job 管任务，attempt_processor 管单份答卷
//! 2. **严格串行**：渲染缓冲和压缩包输出流都是顺序敏感的共享状态，
//!    不存在任何并发
//! 3. **向下依赖**：编排层 → workflow → services → infrastructure
//! 4. **失败隔离**：单元循环内的失败只产生错误记录，不中断任务

pub mod app;
pub mod attempt_processor;
pub mod export_job;

// 重新导出主要类型
pub use app::App;
pub use attempt_processor::{process_attempt, AttemptStats};
pub use export_job::{ExportJob, ExportOutcome, ExportStats};
