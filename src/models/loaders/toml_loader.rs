//! 从 TOML 文件加载答卷与测验数据
//!
//! 导出任务的输入是一个数据目录：`quiz.toml` 描述测验上下文和导出
//! 选项，`attempts/` 下每个 TOML 文件是一份答卷，`files/` 存放题干
//! 引用的内嵌资源与附件。

use std::path::{Path, PathBuf};

use serde::Deserialize;
use tracing::{info, warn};

use crate::error::SourceError;
use crate::models::attempt::AttemptRecord;
use crate::models::options::ExportOptions;
use crate::models::question::{Attachment, AttachmentData, SlotContent, TextFormat};
use crate::models::quiz::QuizContext;

/// 一份答卷的 TOML 表示
#[derive(Debug, Clone, Deserialize)]
pub struct AttemptFixture {
    #[serde(flatten)]
    pub attempt: AttemptRecord,
    /// 学生所属分组
    #[serde(default)]
    pub group_id: Option<u64>,
    /// 按槽位顺序排列的题目
    #[serde(default)]
    pub slots: Vec<SlotFixture>,
}

/// 一个题目槽位的 TOML 表示
#[derive(Debug, Clone, Deserialize)]
pub struct SlotFixture {
    pub question_type: String,
    pub title: String,
    #[serde(default)]
    pub question_html: String,
    #[serde(default)]
    pub question_summary: String,
    #[serde(default)]
    pub response_html: String,
    #[serde(default)]
    pub response_summary: String,
    #[serde(default = "default_response_format")]
    pub response_format: TextFormat,
    #[serde(default)]
    pub attachments: Vec<AttachmentFixture>,
}

/// 附件的 TOML 表示，内容要么内联、要么指向数据目录下的文件
#[derive(Debug, Clone, Deserialize)]
pub struct AttachmentFixture {
    pub filename: String,
    #[serde(default)]
    pub content: Option<String>,
    #[serde(default)]
    pub path: Option<PathBuf>,
}

/// 测验描述文件（quiz.toml）
#[derive(Debug, Clone, Deserialize)]
pub struct QuizFixture {
    pub quiz: QuizContext,
    #[serde(default)]
    pub options: ExportOptions,
    /// 测验包含的题型列表，用于判断是否存在论述题
    #[serde(default)]
    pub question_types: Vec<String>,
}

fn default_response_format() -> TextFormat {
    TextFormat::Html
}

impl SlotFixture {
    /// 转换为数据来源的槽位内容，附件路径相对于数据目录解析
    pub fn into_slot(self, base_dir: &Path) -> SlotContent {
        let attachments = self
            .attachments
            .into_iter()
            .map(|fixture| {
                let data = match (fixture.content, fixture.path) {
                    (Some(content), _) => AttachmentData::Bytes(content.into_bytes()),
                    (None, Some(path)) => AttachmentData::File(base_dir.join(path)),
                    (None, None) => AttachmentData::Bytes(Vec::new()),
                };
                Attachment {
                    filename: fixture.filename,
                    data,
                }
            })
            .collect();

        SlotContent {
            question_type: self.question_type,
            title: self.title,
            question_html: self.question_html,
            question_summary: self.question_summary,
            response_html: self.response_html,
            response_summary: self.response_summary,
            response_format: self.response_format,
            attachments,
        }
    }
}

/// 从 TOML 文件加载一份答卷
pub fn load_attempt_fixture(path: &Path) -> Result<AttemptFixture, SourceError> {
    let content =
        std::fs::read_to_string(path).map_err(|e| SourceError::read(path, e))?;

    toml::from_str(&content).map_err(|e| SourceError::parse(path, e))
}

/// 加载目录下的所有答卷文件
///
/// 单个文件解析失败只记录警告并跳过，不影响其他答卷。
pub fn load_all_attempt_fixtures(folder: &Path) -> Result<Vec<AttemptFixture>, SourceError> {
    let entries =
        std::fs::read_dir(folder).map_err(|e| SourceError::read(folder, e))?;

    let mut fixtures = Vec::new();
    let mut paths: Vec<PathBuf> = entries
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|path| path.extension().and_then(|s| s.to_str()) == Some("toml"))
        .collect();
    paths.sort();

    for path in paths {
        info!(
            "正在加载: {}",
            path.file_name().unwrap_or_default().to_string_lossy()
        );

        match load_attempt_fixture(&path) {
            Ok(fixture) => {
                info!("成功加载 {} 个题目槽位", fixture.slots.len());
                fixtures.push(fixture);
            }
            Err(e) => {
                warn!("加载文件失败 {}: {}", path.display(), e);
            }
        }
    }

    Ok(fixtures)
}

/// 加载测验描述文件
pub fn load_quiz_fixture(path: &Path) -> Result<QuizFixture, SourceError> {
    let content =
        std::fs::read_to_string(path).map_err(|e| SourceError::read(path, e))?;

    toml::from_str(&content).map_err(|e| SourceError::parse(path, e))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_attempt_fixture() {
        let fixture: AttemptFixture = toml::from_str(
            r#"
            id = 42
            first_name = "Ann"
            last_name = "Lee"
            username = "alee"
            finished_at = 1717243200

            [[slots]]
            question_type = "essay"
            title = "Summer Essay"
            response_html = "<p>My answer.</p>"
            response_summary = "My answer."

            [[slots.attachments]]
            filename = "notes.txt"
            content = "some notes"
            "#,
        )
        .unwrap();

        assert_eq!(fixture.attempt.id, 42);
        assert_eq!(fixture.attempt.username, "alee");
        assert_eq!(fixture.slots.len(), 1);
        assert_eq!(fixture.slots[0].attachments.len(), 1);

        let slot = fixture.slots[0].clone().into_slot(Path::new("/data"));
        assert_eq!(slot.response_format, TextFormat::Html);
        match &slot.attachments[0].data {
            AttachmentData::Bytes(bytes) => assert_eq!(bytes, b"some notes"),
            other => panic!("附件应为内联内容: {:?}", other),
        }
    }

    #[test]
    fn test_attachment_path_is_resolved_relative_to_base_dir() {
        let fixture: SlotFixture = toml::from_str(
            r#"
            question_type = "essay"
            title = "T"

            [[attachments]]
            filename = "a.bin"
            path = "files/a.bin"
            "#,
        )
        .unwrap();

        let slot = fixture.into_slot(Path::new("/data/export"));
        match &slot.attachments[0].data {
            AttachmentData::File(path) => {
                assert_eq!(path, Path::new("/data/export/files/a.bin"));
            }
            other => panic!("附件应指向文件: {:?}", other),
        }
    }

    #[test]
    fn test_parse_quiz_fixture() {
        let fixture: QuizFixture = toml::from_str(
            r#"
            question_types = ["essay", "multichoice"]

            [quiz]
            course_short_name = "CS101"
            quiz_name = "Final Essay"
            course_module_id = 17
            base_url = "https://moodle.example.edu"

            [options]
            all_in_one = true
            "#,
        )
        .unwrap();

        assert_eq!(fixture.quiz.course_module_id, 17);
        assert!(fixture.options.all_in_one);
        assert_eq!(fixture.question_types.len(), 2);
    }
}
