//! # Essay Download
//!
//! 把测验里的论述题作答导出为一个可下载的 ZIP 压缩包：每份答卷的
//! 每道论述题生成一份排版好的 PDF（作答，外加可选的题干），附件
//! 原样打包，单元级的失败转成包里的错误记录而不中断任务。
//!
//! ## 架构设计
//!
//! 本系统采用严格的四层架构：
//!
//! ### ① 基础设施层（Infrastructure）
//! - `infrastructure/` - 只暴露数据访问能力
//! - `AttemptSource` - 答卷选取与题目内容读取
//! - `ResourceResolver` - 内嵌资源到本地路径的解析
//!
//! ### ② 业务能力层（Services）
//! - `services/` - 描述"我能做什么"，只处理单个单元
//! - `ContentExtractor` - 槽位内容整理成题目单元
//! - `DocumentRenderer` - 双缓冲的 PDF 渲染状态机
//! - `ArchivePackager` - ZIP 打包能力
//! - `ErrorSink` - 错误记录能力
//!
//! ### ③ 流程层（Workflow）
//! - `workflow/` - 定义"一个单元"的完整处理流程
//! - `UnitCtx` - 上下文封装（答卷序号 + 单元序号）
//! - `UnitFlow` - 流程编排（渲染 → 入包 → 附件）
//!
//! ### ④ 编排层（Orchestration）
//! - `orchestrator/app` - 应用生命周期，装配资源
//! - `orchestrator/export_job` - 导出任务，逐份答卷驱动
//! - `orchestrator/attempt_processor` - 单份答卷处理器，失败隔离
//!
//! ## 模块结构

pub mod config;
pub mod error;
pub mod infrastructure;
pub mod models;
pub mod orchestrator;
pub mod pdf;
pub mod services;
pub mod utils;
pub mod workflow;

// 重新导出常用类型
pub use config::Config;
pub use error::{ExportError, Result};
pub use infrastructure::{AttemptSource, DirectoryResolver, FixtureSource, ResourceResolver};
pub use models::{AttemptRecord, ExportOptions, QuestionUnit, QuizContext};
pub use orchestrator::{App, ExportJob, ExportOutcome};
pub use services::{ArchivePackager, ContentExtractor, DocumentRenderer, ErrorSink};
pub use workflow::{UnitCtx, UnitFlow};
