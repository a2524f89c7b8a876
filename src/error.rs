//! 应用程序错误类型
//!
//! 按领域划分为四个子错误：选项校验、数据来源、文档渲染、压缩包写入。
//! 单元循环内部的失败不会沿这些类型一路冒泡到调用方，而是在编排层
//! 被转换成压缩包里的错误记录（见 `services::error_sink`）。

use std::path::PathBuf;

use thiserror::Error;

/// 顶层错误类型
#[derive(Debug, Error)]
pub enum ExportError {
    /// 导出选项校验错误
    #[error("导出选项错误: {0}")]
    Options(#[from] OptionsError),
    /// 数据来源错误
    #[error("数据来源错误: {0}")]
    Source(#[from] SourceError),
    /// 文档渲染错误
    #[error("文档渲染错误: {0}")]
    Render(#[from] RenderError),
    /// 压缩包写入错误
    #[error("压缩包错误: {0}")]
    Archive(#[from] ArchiveError),
    /// 其他错误（用于包装无法归类的失败）
    #[error("错误: {0}")]
    Other(String),
}

/// 导出选项校验错误
///
/// 这些错误在任务开始之前就会被拦下，不会产生任何输出。
#[derive(Debug, Error, PartialEq, Eq)]
pub enum OptionsError {
    /// 页边距超出允许范围
    #[error("页边距必须是 0 到 80 之间的整数，实际为 {value}")]
    MarginOutOfRange { value: u32 },
    /// 字号超出允许范围
    #[error("字号必须是 6 到 50 之间的整数，实际为 {value}")]
    FontSizeOutOfRange { value: u32 },
}

/// 数据来源错误
#[derive(Debug, Error)]
pub enum SourceError {
    /// 找不到答卷记录
    #[error("找不到答卷记录: {id}")]
    AttemptNotFound { id: u64 },
    /// 读取文件失败
    #[error("无法读取文件 ({}): {source}", .path.display())]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    /// TOML 解析失败
    #[error("无法解析 TOML 文件 ({}): {source}", .path.display())]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },
    /// 内嵌资源不可用
    #[error("无法访问内嵌资源: {filename}")]
    Resource { filename: String },
}

/// 文档渲染错误
#[derive(Debug, Error)]
pub enum RenderError {
    /// PDF 底层库报错
    #[error("PDF 文档生成失败: {source}")]
    Pdf {
        source: Box<dyn std::error::Error + Send + Sync>,
    },
    /// 图片解码或嵌入失败
    #[error("无法嵌入图片 ({path}): {source}")]
    Image {
        path: String,
        source: Box<dyn std::error::Error + Send + Sync>,
    },
    /// 图片格式不受支持
    #[error("不支持的图片格式: {path}")]
    UnsupportedImage { path: String },
}

/// 压缩包写入错误
#[derive(Debug, Error)]
pub enum ArchiveError {
    /// 写入条目失败
    #[error("无法写入压缩包条目 ({path}): {source}")]
    Entry {
        path: String,
        source: zip::result::ZipError,
    },
    /// 附件读写失败
    #[error("无法打包附件 ({path}): {source}")]
    Attachment {
        path: String,
        source: std::io::Error,
    },
    /// 收尾失败
    #[error("无法完成压缩包: {source}")]
    Finish { source: zip::result::ZipError },
}

// ========== 便捷构造函数 ==========

impl SourceError {
    /// 创建文件读取错误
    pub fn read(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        SourceError::Read {
            path: path.into(),
            source,
        }
    }

    /// 创建 TOML 解析错误
    pub fn parse(path: impl Into<PathBuf>, source: toml::de::Error) -> Self {
        SourceError::Parse {
            path: path.into(),
            source,
        }
    }
}

impl RenderError {
    /// 创建 PDF 底层库错误
    pub fn pdf(source: impl std::error::Error + Send + Sync + 'static) -> Self {
        RenderError::Pdf {
            source: Box::new(source),
        }
    }

    /// 创建图片嵌入错误
    pub fn image(
        path: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        RenderError::Image {
            path: path.into(),
            source: Box::new(source),
        }
    }
}

// ========== Result 类型别名 ==========

/// 应用程序结果类型
pub type Result<T> = std::result::Result<T, ExportError>;
