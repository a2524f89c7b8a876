//! 业务能力层（Services Layer）
//!
//! 每个模块描述"我能做什么"，只处理单个题目单元，不关心流程顺序：
//! - `content_extractor` - 把答卷槽位整理成题目单元
//! - `image_rewrite` - 题干内嵌图片链接重写为本地路径
//! - `text_normalizer` - 字数统计、rem 字号修正、不间断空格修正
//! - `document_renderer` - 双缓冲的 PDF 渲染状态机
//! - `archive` - ZIP 输出流打包
//! - `naming` - 确定性的路径与名称构造
//! - `error_sink` - 单元失败转成压缩包里的错误记录

pub mod archive;
pub mod content_extractor;
pub mod document_renderer;
pub mod error_sink;
pub mod image_rewrite;
pub mod naming;
pub mod text_normalizer;

pub use archive::ArchivePackager;
pub use content_extractor::ContentExtractor;
pub use document_renderer::{DocumentRenderer, OutputKind, RenderRequest};
pub use error_sink::ErrorSink;
pub use image_rewrite::ImageRewriter;
