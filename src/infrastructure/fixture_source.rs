//! 基于 TOML 数据目录的数据来源实现
//!
//! 命令行入口和测试用它把一个数据目录变成 `AttemptSource` /
//! `ResourceResolver` 能力。生产部署可以换成任何实现了这两个
//! 接口的后端。

use std::path::{Path, PathBuf};

use crate::error::SourceError;
use crate::infrastructure::content_source::{AttemptSource, ResourceRef, ResourceResolver};
use crate::models::attempt::{AttemptFilter, AttemptRecord};
use crate::models::loaders;
use crate::models::options::ExportOptions;
use crate::models::question::{SlotContent, ESSAY_QUESTION_TYPE, RANDOM_QUESTION_TYPE};
use crate::models::quiz::QuizContext;

/// 数据目录下存放答卷文件的子目录
const ATTEMPTS_SUBDIR: &str = "attempts";

/// 数据目录下存放内嵌资源的子目录
const FILES_SUBDIR: &str = "files";

struct FixtureAttempt {
    record: AttemptRecord,
    group_id: Option<u64>,
    slots: Vec<SlotContent>,
}

/// 从数据目录加载的答卷来源
pub struct FixtureSource {
    question_types: Vec<String>,
    attempts: Vec<FixtureAttempt>,
}

impl FixtureSource {
    /// 直接从内存数据构造，主要供测试使用
    pub fn new(
        question_types: Vec<String>,
        attempts: Vec<(AttemptRecord, Option<u64>, Vec<SlotContent>)>,
    ) -> Self {
        Self {
            question_types,
            attempts: attempts
                .into_iter()
                .map(|(record, group_id, slots)| FixtureAttempt {
                    record,
                    group_id,
                    slots,
                })
                .collect(),
        }
    }

    /// 从数据目录加载：`quiz.toml` + `attempts/*.toml`
    ///
    /// 返回来源本身以及测验上下文和导出选项。
    pub fn load(data_dir: &Path) -> Result<(Self, QuizContext, ExportOptions), SourceError> {
        let quiz_fixture = loaders::load_quiz_fixture(&data_dir.join("quiz.toml"))?;
        let attempt_fixtures = loaders::load_all_attempt_fixtures(&data_dir.join(ATTEMPTS_SUBDIR))?;

        let attempts = attempt_fixtures
            .into_iter()
            .map(|fixture| FixtureAttempt {
                record: fixture.attempt,
                group_id: fixture.group_id,
                slots: fixture
                    .slots
                    .into_iter()
                    .map(|slot| slot.into_slot(data_dir))
                    .collect(),
            })
            .collect();

        let source = Self {
            question_types: quiz_fixture.question_types,
            attempts,
        };
        Ok((source, quiz_fixture.quiz, quiz_fixture.options))
    }
}

impl AttemptSource for FixtureSource {
    fn has_essay_questions(&self) -> Result<bool, SourceError> {
        // 优先看测验声明的题型列表，缺省时退回到扫描答卷里的槽位
        if !self.question_types.is_empty() {
            return Ok(self
                .question_types
                .iter()
                .any(|t| t == ESSAY_QUESTION_TYPE || t == RANDOM_QUESTION_TYPE));
        }

        Ok(self.attempts.iter().any(|attempt| {
            attempt
                .slots
                .iter()
                .any(|slot| slot.question_type == ESSAY_QUESTION_TYPE)
        }))
    }

    fn finished_attempts(
        &self,
        filter: &AttemptFilter,
    ) -> Result<Vec<AttemptRecord>, SourceError> {
        let mut selected: Vec<&FixtureAttempt> = self
            .attempts
            .iter()
            .filter(|attempt| match filter.group_id {
                Some(group) => attempt.group_id == Some(group),
                None => true,
            })
            .collect();

        if filter.only_one_per_user {
            // 本来源的评分规则是"最后一次作答"：同一用户保留完成时间
            // 最晚的答卷，时间相同时保留 ID 较大的
            let mut kept: Vec<&FixtureAttempt> = Vec::new();
            for attempt in selected {
                match kept
                    .iter()
                    .position(|k| k.record.username == attempt.record.username)
                {
                    Some(index) => {
                        let current = &kept[index].record;
                        if (attempt.record.finished_at, attempt.record.id)
                            > (current.finished_at, current.id)
                        {
                            kept[index] = attempt;
                        }
                    }
                    None => kept.push(attempt),
                }
            }
            selected = kept;
        }

        let mut records: Vec<AttemptRecord> =
            selected.into_iter().map(|a| a.record.clone()).collect();
        records.sort_by_key(|record| record.id);
        Ok(records)
    }

    fn slots(&self, attempt_id: u64) -> Result<Vec<SlotContent>, SourceError> {
        self.attempts
            .iter()
            .find(|attempt| attempt.record.id == attempt_id)
            .map(|attempt| attempt.slots.clone())
            .ok_or(SourceError::AttemptNotFound { id: attempt_id })
    }
}

/// 按目录约定解析内嵌资源：`<root>/<context>/<questionid>/<filename>`
pub struct DirectoryResolver {
    root: PathBuf,
}

impl DirectoryResolver {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// 数据目录下的默认资源位置
    pub fn for_data_dir(data_dir: &Path) -> Self {
        Self::new(data_dir.join(FILES_SUBDIR))
    }
}

impl ResourceResolver for DirectoryResolver {
    fn resolve(&self, reference: &ResourceRef) -> Result<PathBuf, SourceError> {
        let path = self
            .root
            .join(reference.context_id.to_string())
            .join(reference.question_id.to_string())
            .join(&reference.filename);

        if path.is_file() {
            Ok(path)
        } else {
            Err(SourceError::Resource {
                filename: reference.filename.clone(),
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::question::TextFormat;

    fn record(id: u64, username: &str, finished_at: i64) -> AttemptRecord {
        AttemptRecord {
            id,
            first_name: "Ann".to_string(),
            last_name: "Lee".to_string(),
            username: username.to_string(),
            finished_at,
        }
    }

    fn essay_slot() -> SlotContent {
        SlotContent {
            question_type: ESSAY_QUESTION_TYPE.to_string(),
            title: "T".to_string(),
            question_html: String::new(),
            question_summary: String::new(),
            response_html: "<p>x</p>".to_string(),
            response_summary: "x".to_string(),
            response_format: TextFormat::Html,
            attachments: Vec::new(),
        }
    }

    #[test]
    fn test_only_one_per_user_keeps_latest_attempt() {
        let source = FixtureSource::new(
            vec![ESSAY_QUESTION_TYPE.to_string()],
            vec![
                (record(1, "alee", 100), None, vec![essay_slot()]),
                (record(2, "alee", 200), None, vec![essay_slot()]),
                (record(3, "bkim", 150), None, vec![essay_slot()]),
            ],
        );

        let filter = AttemptFilter {
            group_id: None,
            only_one_per_user: true,
        };
        let attempts = source.finished_attempts(&filter).unwrap();
        let ids: Vec<u64> = attempts.iter().map(|a| a.id).collect();
        assert_eq!(ids, vec![2, 3]);
    }

    #[test]
    fn test_group_filter() {
        let source = FixtureSource::new(
            vec![ESSAY_QUESTION_TYPE.to_string()],
            vec![
                (record(1, "alee", 100), Some(7), vec![essay_slot()]),
                (record(2, "bkim", 100), Some(8), vec![essay_slot()]),
            ],
        );

        let filter = AttemptFilter {
            group_id: Some(7),
            only_one_per_user: false,
        };
        let attempts = source.finished_attempts(&filter).unwrap();
        assert_eq!(attempts.len(), 1);
        assert_eq!(attempts[0].id, 1);
    }

    #[test]
    fn test_unknown_attempt_id_is_an_error() {
        let source = FixtureSource::new(vec![], vec![]);
        assert!(matches!(
            source.slots(99),
            Err(SourceError::AttemptNotFound { id: 99 })
        ));
    }

    #[test]
    fn test_has_essay_questions_from_declared_types() {
        let source = FixtureSource::new(vec!["multichoice".to_string()], vec![]);
        assert!(!source.has_essay_questions().unwrap());

        let source = FixtureSource::new(vec!["random".to_string()], vec![]);
        assert!(source.has_essay_questions().unwrap());
    }
}
