//! PDF 排版
//!
//! - `flatten` - HTML / 纯文本到排版块的拍平
//! - `metrics` - 内置字体的字宽估算，只用于折行
//! - `composer` - 分页文档排版器（页面、页眉页脚、折行、图片）

pub mod composer;
pub mod flatten;
pub mod metrics;

pub use composer::{PageLayout, PdfComposer};
pub use flatten::{flatten_html, flatten_plain, Block, Inline};
