//! 题目单元模型
//!
//! 一个单元是一份答卷里的一道论述题，连同题干、作答文本和附件。
//! 单元在处理完所在答卷后即被消费，不会跨任务存活。

use std::fs::File;
use std::io::{self, Cursor, Read};
use std::path::PathBuf;

use serde::Deserialize;

/// 论述题的题型标识
pub const ESSAY_QUESTION_TYPE: &str = "essay";

/// 随机题槽位的题型标识，在部分答卷中可能落为论述题
pub const RANDOM_QUESTION_TYPE: &str = "random";

/// 文本格式
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TextFormat {
    Html,
    Plain,
}

/// 附件内容，既可以直接持有字节，也可以指向磁盘文件
#[derive(Debug, Clone)]
pub enum AttachmentData {
    Bytes(Vec<u8>),
    File(PathBuf),
}

/// 学生上传的一个附件
#[derive(Debug, Clone)]
pub struct Attachment {
    /// 原始文件名
    pub filename: String,
    pub data: AttachmentData,
}

impl Attachment {
    /// 打开附件的可读字节流
    pub fn reader(&self) -> io::Result<Box<dyn Read + '_>> {
        match &self.data {
            AttachmentData::Bytes(bytes) => Ok(Box::new(Cursor::new(bytes))),
            AttachmentData::File(path) => Ok(Box::new(File::open(path)?)),
        }
    }
}

/// 数据来源针对一个题目槽位返回的原始内容
///
/// 摘要字段由上游框架从格式化文本生成，只在没有原始文本
/// 或用户强制使用摘要时才会被采用。
#[derive(Debug, Clone)]
pub struct SlotContent {
    /// 题型（只有论述题会被导出）
    pub question_type: String,
    /// 题目标题
    pub title: String,
    /// 题干的格式化原文
    pub question_html: String,
    /// 题干的纯文本摘要
    pub question_summary: String,
    /// 学生作答的格式化原文
    pub response_html: String,
    /// 学生作答的纯文本摘要
    pub response_summary: String,
    /// 作答原文的格式
    pub response_format: TextFormat,
    /// 学生上传的附件
    pub attachments: Vec<Attachment>,
}

/// 一个待导出的题目单元
#[derive(Debug, Clone)]
pub struct QuestionUnit {
    /// 目录标签，形如 `Question_3_-_Summer_Essay`
    pub folder: String,
    /// 题干文本（内嵌资源已重写为本地路径）
    pub question_text: String,
    pub question_format: TextFormat,
    /// 作答文本
    pub response_text: String,
    pub response_format: TextFormat,
    pub attachments: Vec<Attachment>,
}
