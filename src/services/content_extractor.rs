//! 内容抽取 - 业务能力层
//!
//! 把一份答卷的原始槽位内容整理成有序的题目单元列表：只保留论述题，
//! 为每个单元生成确定的目录标签，选好题干与作答的文本来源，并把题干
//! 里的内嵌图片链接重写为本地路径。抽取从不失败，遇到问题时降级为
//! 占位内容。

use crate::infrastructure::content_source::ResourceResolver;
use crate::models::options::ExportOptions;
use crate::models::question::{QuestionUnit, SlotContent, TextFormat, ESSAY_QUESTION_TYPE};
use crate::models::quiz::QuizContext;
use crate::services::image_rewrite::ImageRewriter;
use crate::services::naming;

/// 内容抽取器
pub struct ContentExtractor<'a> {
    options: &'a ExportOptions,
    rewriter: ImageRewriter<'a>,
}

impl<'a> ContentExtractor<'a> {
    pub fn new(
        options: &'a ExportOptions,
        quiz: &'a QuizContext,
        resolver: &'a dyn ResourceResolver,
    ) -> Self {
        Self {
            options,
            rewriter: ImageRewriter::new(quiz, resolver),
        }
    }

    /// 把槽位内容抽取为题目单元，顺序与槽位一致
    ///
    /// 序号按槽位从 1 开始计数，非论述题静默跳过但仍占用序号，
    /// 保证目录标签与测验里的题号一致。
    pub fn extract(&self, slots: Vec<SlotContent>) -> Vec<QuestionUnit> {
        let mut units = Vec::new();

        for (index, slot) in slots.into_iter().enumerate() {
            let number = index + 1;
            if slot.question_type != ESSAY_QUESTION_TYPE {
                continue;
            }

            let folder = naming::question_folder(number, &slot.title, self.options);

            // 作答永远优先用原始的格式化文本，只有没有原文时才退回
            // 框架生成的纯文本摘要
            let (response_text, response_format) = if slot.response_html.trim().is_empty() {
                (slot.response_summary, TextFormat::Plain)
            } else {
                (slot.response_html, slot.response_format)
            };

            let (question_text, question_format) = if self.options.force_question_text_summary
                || slot.question_html.trim().is_empty()
            {
                (slot.question_summary, TextFormat::Plain)
            } else {
                (self.rewriter.rewrite(&slot.question_html), TextFormat::Html)
            };

            units.push(QuestionUnit {
                folder,
                question_text,
                question_format,
                response_text,
                response_format,
                attachments: slot.attachments,
            });
        }

        units
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::SourceError;
    use crate::infrastructure::content_source::ResourceRef;
    use std::path::PathBuf;

    struct NoResolver;

    impl ResourceResolver for NoResolver {
        fn resolve(&self, reference: &ResourceRef) -> Result<PathBuf, SourceError> {
            Err(SourceError::Resource {
                filename: reference.filename.clone(),
            })
        }
    }

    fn quiz() -> QuizContext {
        QuizContext {
            course_short_name: "CS101".to_string(),
            quiz_name: "Quiz".to_string(),
            course_module_id: 1,
            base_url: "https://moodle.example.edu".to_string(),
            document_root: None,
            group_id: None,
        }
    }

    fn slot(question_type: &str, title: &str) -> SlotContent {
        SlotContent {
            question_type: question_type.to_string(),
            title: title.to_string(),
            question_html: "<p>Question?</p>".to_string(),
            question_summary: "Question?".to_string(),
            response_html: "<p>Answer.</p>".to_string(),
            response_summary: "Answer.".to_string(),
            response_format: TextFormat::Html,
            attachments: Vec::new(),
        }
    }

    #[test]
    fn test_extract_skips_other_question_types_but_keeps_numbering() {
        let options = ExportOptions::default();
        let quiz = quiz();
        let resolver = NoResolver;
        let extractor = ContentExtractor::new(&options, &quiz, &resolver);

        let units = extractor.extract(vec![
            slot("essay", "First"),
            slot("multichoice", "Choice"),
            slot("essay", "Second"),
        ]);

        assert_eq!(units.len(), 2);
        assert_eq!(units[0].folder, "Question_1_-_First");
        assert_eq!(units[1].folder, "Question_3_-_Second");
    }

    #[test]
    fn test_extract_falls_back_to_summary_without_formatted_response() {
        let options = ExportOptions::default();
        let quiz = quiz();
        let resolver = NoResolver;
        let extractor = ContentExtractor::new(&options, &quiz, &resolver);

        let mut empty_response = slot("essay", "T");
        empty_response.response_html = "   ".to_string();

        let units = extractor.extract(vec![empty_response]);
        assert_eq!(units[0].response_text, "Answer.");
        assert_eq!(units[0].response_format, TextFormat::Plain);
    }

    #[test]
    fn test_extract_honors_forced_question_summary() {
        let mut options = ExportOptions::default();
        options.force_question_text_summary = true;
        let quiz = quiz();
        let resolver = NoResolver;
        let extractor = ContentExtractor::new(&options, &quiz, &resolver);

        let units = extractor.extract(vec![slot("essay", "T")]);
        assert_eq!(units[0].question_text, "Question?");
        assert_eq!(units[0].question_format, TextFormat::Plain);
    }

    #[test]
    fn test_extract_rewrites_unreadable_images_to_placeholders() {
        let options = ExportOptions::default();
        let quiz = quiz();
        let resolver = NoResolver;
        let extractor = ContentExtractor::new(&options, &quiz, &resolver);

        let mut with_image = slot("essay", "T");
        with_image.question_html = concat!(
            "<p><img src=\"https://moodle.example.edu/pluginfile.php",
            "/131/question/questiontext/55/1/202/d.png\"></p>"
        )
        .to_string();

        let units = extractor.extract(vec![with_image]);
        assert_eq!(units[0].question_text, "<p>[d.png]</p>");
    }
}
