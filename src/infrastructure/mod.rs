//! 基础设施层（Infrastructure Layer）
//!
//! 持有数据访问能力，只暴露接口：
//! - `AttemptSource` - 答卷选取与题目内容读取能力
//! - `ResourceResolver` - 内嵌资源到本地路径的解析能力
//! - `FixtureSource` / `DirectoryResolver` - 基于 TOML 数据目录的实现

pub mod content_source;
pub mod fixture_source;

pub use content_source::{AttemptSource, ResourceRef, ResourceResolver};
pub use fixture_source::{DirectoryResolver, FixtureSource};
