//! 错误记录 - 业务能力层
//!
//! 单元处理失败时不中断任务，把失败写成压缩包里的一个纯文本条目。
//! 条目按出现顺序编号，内容是固定的说明、错误信息和完整的原因链。

use std::fmt::Write as _;
use std::io::{Seek, Write};

use tracing::warn;

use crate::error::ArchiveError;
use crate::services::archive::ArchivePackager;

/// 错误条目开头的固定说明
const ERROR_PREAMBLE: &str = "An internal error occurred. The archive is probably incomplete. \
Please contact the developers of the essay download exporter and send them the details below:";

/// 错误记录器
#[derive(Debug, Default)]
pub struct ErrorSink {
    count: usize,
}

impl ErrorSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// 把一次单元失败写成 `error-<n>.txt` 条目
    pub fn record<W: Write + Seek>(
        &mut self,
        archive: &mut ArchivePackager<W>,
        error: &anyhow::Error,
    ) -> Result<(), ArchiveError> {
        self.count += 1;
        let name = format!("error-{}.txt", self.count);

        let mut body = String::new();
        let _ = writeln!(body, "{}", ERROR_PREAMBLE);
        let _ = writeln!(body);
        let _ = writeln!(body, "{}", error);
        let _ = writeln!(body);
        for (depth, cause) in error.chain().skip(1).enumerate() {
            let _ = writeln!(body, "#{}: {}", depth, cause);
        }

        warn!("⚠️ 已写入错误记录 {}: {}", name, error);
        archive.add_entry(&name, body.as_bytes())
    }

    /// 已记录的错误数量
    pub fn count(&self) -> usize {
        self.count
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{Cursor, Read};

    use anyhow::Context;

    #[test]
    fn test_errors_are_numbered_sequentially() {
        let mut packager = ArchivePackager::new(Cursor::new(Vec::new()));
        let mut sink = ErrorSink::new();

        let first: anyhow::Result<()> = Err(anyhow::anyhow!("底层失败")).context("渲染失败");
        sink.record(&mut packager, &first.unwrap_err()).unwrap();
        sink.record(&mut packager, &anyhow::anyhow!("另一个失败"))
            .unwrap();
        assert_eq!(sink.count(), 2);

        let cursor = packager.finish().unwrap();
        let mut archive = zip::ZipArchive::new(cursor).unwrap();
        let names: Vec<String> = archive.file_names().map(|n| n.to_string()).collect();
        assert!(names.contains(&"error-1.txt".to_string()));
        assert!(names.contains(&"error-2.txt".to_string()));

        let mut body = String::new();
        archive
            .by_name("error-1.txt")
            .unwrap()
            .read_to_string(&mut body)
            .unwrap();
        // 说明、错误信息和原因链都在
        assert!(body.starts_with("An internal error occurred."));
        assert!(body.contains("渲染失败"));
        assert!(body.contains("#0: 底层失败"));
    }
}
