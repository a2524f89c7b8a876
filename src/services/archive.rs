//! 压缩包打包 - 业务能力层
//!
//! 把文档、附件和错误记录按给定路径追加写入一个 ZIP 输出流。
//! 写入是顺序敏感的，整个任务共用一个打包器。路径唯一性由命名
//! 规则保证，这里不做查重。

use std::io::{self, Seek, Write};

use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

use crate::error::ArchiveError;
use crate::models::question::Attachment;

/// 压缩包打包器
pub struct ArchivePackager<W: Write + Seek> {
    zip: ZipWriter<W>,
    entries: usize,
}

impl<W: Write + Seek> ArchivePackager<W> {
    pub fn new(writer: W) -> Self {
        Self {
            zip: ZipWriter::new(writer),
            entries: 0,
        }
    }

    fn options() -> SimpleFileOptions {
        SimpleFileOptions::default().compression_method(CompressionMethod::Deflated)
    }

    /// 写入一个字节内容条目
    pub fn add_entry(&mut self, path: &str, content: &[u8]) -> Result<(), ArchiveError> {
        self.zip
            .start_file(path, Self::options())
            .map_err(|e| ArchiveError::Entry {
                path: path.to_string(),
                source: e,
            })?;
        self.zip
            .write_all(content)
            .map_err(|e| ArchiveError::Attachment {
                path: path.to_string(),
                source: e,
            })?;

        self.entries += 1;
        Ok(())
    }

    /// 以流式拷贝写入一个附件
    pub fn add_attachment(&mut self, path: &str, attachment: &Attachment) -> Result<(), ArchiveError> {
        let mut reader = attachment.reader().map_err(|e| ArchiveError::Attachment {
            path: path.to_string(),
            source: e,
        })?;

        self.zip
            .start_file(path, Self::options())
            .map_err(|e| ArchiveError::Entry {
                path: path.to_string(),
                source: e,
            })?;
        io::copy(&mut reader, &mut self.zip).map_err(|e| ArchiveError::Attachment {
            path: path.to_string(),
            source: e,
        })?;

        self.entries += 1;
        Ok(())
    }

    /// 已写入的条目数
    pub fn entry_count(&self) -> usize {
        self.entries
    }

    /// 写出中央目录并返回底层输出流
    pub fn finish(self) -> Result<W, ArchiveError> {
        self.zip
            .finish()
            .map_err(|e| ArchiveError::Finish { source: e })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{Cursor, Read};

    use crate::models::question::AttachmentData;

    #[test]
    fn test_entries_round_trip() {
        let mut packager = ArchivePackager::new(Cursor::new(Vec::new()));
        packager.add_entry("a/b.txt", b"hello").unwrap();
        packager
            .add_attachment(
                "a/c.bin",
                &Attachment {
                    filename: "c.bin".to_string(),
                    data: AttachmentData::Bytes(vec![1, 2, 3]),
                },
            )
            .unwrap();
        assert_eq!(packager.entry_count(), 2);

        let cursor = packager.finish().unwrap();
        let mut archive = zip::ZipArchive::new(cursor).unwrap();
        assert_eq!(archive.len(), 2);

        let mut content = String::new();
        archive
            .by_name("a/b.txt")
            .unwrap()
            .read_to_string(&mut content)
            .unwrap();
        assert_eq!(content, "hello");
    }

    #[test]
    fn test_missing_attachment_file_is_an_error() {
        let mut packager = ArchivePackager::new(Cursor::new(Vec::new()));
        let attachment = Attachment {
            filename: "gone.txt".to_string(),
            data: AttachmentData::File("/nonexistent/gone.txt".into()),
        };

        let result = packager.add_attachment("x/gone.txt", &attachment);
        assert!(matches!(result, Err(ArchiveError::Attachment { .. })));
    }
}
