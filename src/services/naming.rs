//! 命名与路径构造 - 业务能力层
//!
//! 压缩包里所有条目的路径都由这里决定。路径不做运行期查重，
//! 唯一性靠构造保证：答卷标识 + 题目目录 + 固定后缀。

use chrono::{DateTime, Utc};

use crate::models::attempt::AttemptRecord;
use crate::models::options::{ExportOptions, NameOrdering};
use crate::models::quiz::QuizContext;

/// 缩短姓名时每个部分保留的最大字符数
const NAME_COMPONENT_MAX: usize = 40;

/// 缩短名称时测验名保留的最大字符数
const QUIZ_NAME_MAX: usize = 15;

/// 清理文件或路径名：空格替换为下划线，去掉文件系统里的非法字符
pub fn clean_file_name(name: &str) -> String {
    name.replace(' ', "_")
        .chars()
        .filter(|c| !matches!(c, '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|') && !c.is_control())
        .collect()
}

/// 按字符数截断，保持 UTF-8 完整
fn shorten(text: &str, max_len: usize) -> String {
    text.chars().take(max_len).collect()
}

/// 答卷标识：`<按选项排序的姓名>_<答卷ID>_<完成时间>`，整体清理后返回
pub fn attempt_slug(attempt: &AttemptRecord, options: &ExportOptions) -> String {
    let mut first = attempt.first_name.clone();
    let mut last = attempt.last_name.clone();
    let mut username = attempt.username.clone();

    if options.shorten_names {
        first = shorten(&first, NAME_COMPONENT_MAX);
        last = shorten(&last, NAME_COMPONENT_MAX);
        username = shorten(&username, NAME_COMPONENT_MAX);
    }

    let name = match options.name_ordering {
        NameOrdering::FirstLast => format!("{}_{}", first, last),
        NameOrdering::LastFirstUser => format!("{}_{}_{}", last, first, username),
        NameOrdering::LastFirst => format!("{}_{}", last, first),
    };

    let path = format!(
        "{}_{}_{}",
        name,
        attempt.id,
        format_finish_time(attempt.finished_at)
    );
    clean_file_name(&path)
}

/// 文档页眉里显示的姓名，不做缩短
pub fn display_name(attempt: &AttemptRecord, options: &ExportOptions) -> String {
    match options.name_ordering {
        NameOrdering::FirstLast => format!("{} {}", attempt.first_name, attempt.last_name),
        NameOrdering::LastFirstUser => format!(
            "{} {} ({})",
            attempt.last_name, attempt.first_name, attempt.username
        ),
        NameOrdering::LastFirst => format!("{} {}", attempt.last_name, attempt.first_name),
    }
}

/// 题目目录标签：`Question_<序号>_-_<标题>`，缩短名称时前缀换成 `Q_`
pub fn question_folder(number: usize, title: &str, options: &ExportOptions) -> String {
    let prefix = if options.shorten_names { "Q_" } else { "Question_" };
    clean_file_name(&format!("{}{}_-_{}", prefix, number, title))
}

/// 压缩包名称：`<课程短名> - <测验名> - <课程模块ID>.zip`
pub fn archive_name(quiz: &QuizContext, options: &ExportOptions) -> String {
    let mut quiz_name = quiz.quiz_name.clone();
    if options.shorten_names {
        quiz_name = shorten(&quiz_name, QUIZ_NAME_MAX);
    }

    clean_file_name(&format!(
        "{} - {} - {}.zip",
        quiz.course_short_name, quiz_name, quiz.course_module_id
    ))
}

/// 完成时间格式化为 `YYYYMMDD_HHMMSS`（UTC）
fn format_finish_time(timestamp: i64) -> String {
    match DateTime::<Utc>::from_timestamp(timestamp, 0) {
        Some(time) => time.format("%Y%m%d_%H%M%S").to_string(),
        None => "00000000_000000".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn attempt() -> AttemptRecord {
        AttemptRecord {
            id: 12,
            first_name: "Ann".to_string(),
            last_name: "Lee".to_string(),
            username: "alee".to_string(),
            // 2024-06-01 12:00:00 UTC
            finished_at: 1_717_243_200,
        }
    }

    #[test]
    fn test_attempt_slug_orderings() {
        let mut options = ExportOptions::default();

        assert_eq!(attempt_slug(&attempt(), &options), "Lee_Ann_12_20240601_120000");

        options.name_ordering = NameOrdering::FirstLast;
        assert_eq!(attempt_slug(&attempt(), &options), "Ann_Lee_12_20240601_120000");

        options.name_ordering = NameOrdering::LastFirstUser;
        assert_eq!(
            attempt_slug(&attempt(), &options),
            "Lee_Ann_alee_12_20240601_120000"
        );
    }

    #[test]
    fn test_attempt_slug_shortens_name_components() {
        let mut record = attempt();
        record.last_name = "L".repeat(60);

        let mut options = ExportOptions::default();
        options.shorten_names = true;

        let slug = attempt_slug(&record, &options);
        assert!(slug.starts_with(&"L".repeat(40)));
        assert!(!slug.starts_with(&"L".repeat(41)));
    }

    #[test]
    fn test_display_name_keeps_full_names() {
        let mut options = ExportOptions::default();
        options.shorten_names = true;

        assert_eq!(display_name(&attempt(), &options), "Lee Ann");

        options.name_ordering = NameOrdering::LastFirstUser;
        assert_eq!(display_name(&attempt(), &options), "Lee Ann (alee)");
    }

    #[test]
    fn test_clean_file_name() {
        assert_eq!(clean_file_name("a b:c*d?.txt"), "a_bcd.txt");
        assert_eq!(clean_file_name("x/y\\z"), "xyz");
    }

    #[test]
    fn test_question_folder() {
        let mut options = ExportOptions::default();
        assert_eq!(
            question_folder(3, "Summer Essay", &options),
            "Question_3_-_Summer_Essay"
        );

        options.shorten_names = true;
        assert_eq!(question_folder(3, "Summer Essay", &options), "Q_3_-_Summer_Essay");
    }

    #[test]
    fn test_archive_name() {
        let quiz = QuizContext {
            course_short_name: "CS101".to_string(),
            quiz_name: "Final Essay Examination".to_string(),
            course_module_id: 17,
            base_url: "https://moodle.example.edu".to_string(),
            document_root: None,
            group_id: None,
        };

        let mut options = ExportOptions::default();
        assert_eq!(
            archive_name(&quiz, &options),
            "CS101_-_Final_Essay_Examination_-_17.zip"
        );

        options.shorten_names = true;
        // 测验名截断到 15 个字符
        assert_eq!(archive_name(&quiz, &options), "CS101_-_Final_Essay_Exa_-_17.zip");
    }
}
