//! 题干内嵌图片的路径重写 - 业务能力层
//!
//! 题干 HTML 里的图片用站点 URL 引用，排版器却只会读本地文件。
//! 这里把匹配站点资源模板的 `<img>` 链接改写为本地路径；解析不了
//! 或本地不可读的图片整个替换成 `[文件名]` 占位文本，绝不让一张
//! 坏图拖垮整个单元。

use std::ops::Range;

use tracing::debug;

use crate::infrastructure::content_source::{ResourceRef, ResourceResolver};
use crate::models::quiz::QuizContext;
use crate::utils::html;

/// 站点资源链接里固定的路径模板段
const PLUGINFILE_PREFIX: &str = "/pluginfile.php/";
const COMPONENT_SEGMENT: &str = "question";
const FILEAREA_SEGMENT: &str = "questiontext";

/// 图片路径重写器
pub struct ImageRewriter<'a> {
    quiz: &'a QuizContext,
    resolver: &'a dyn ResourceResolver,
}

impl<'a> ImageRewriter<'a> {
    pub fn new(quiz: &'a QuizContext, resolver: &'a dyn ResourceResolver) -> Self {
        Self { quiz, resolver }
    }

    /// 重写一段题干 HTML 里的所有内嵌图片链接
    pub fn rewrite(&self, html_text: &str) -> String {
        let mut edits: Vec<(Range<usize>, String)> = Vec::new();
        let mut pos = 0;

        while let Some(tag) = html::next_tag(html_text, pos) {
            pos = tag.range.end;
            if tag.closing || tag.name != "img" {
                continue;
            }

            let tag_src = &html_text[tag.range.clone()];
            let Some(src) = html::attr_value_range(tag_src, "src") else {
                continue;
            };

            let Some(reference) = parse_resource_url(&tag_src[src.clone()], &self.quiz.base_url)
            else {
                continue;
            };

            match self.local_path_for(&reference) {
                Some(local_path) => {
                    let start = tag.range.start + src.start;
                    let end = tag.range.start + src.end;
                    edits.push((start..end, local_path));
                }
                None => {
                    // 整个 <img> 标签替换成占位文本
                    debug!("内嵌图片不可读，使用占位符: {}", reference.filename);
                    edits.push((tag.range.clone(), format!("[{}]", reference.filename)));
                }
            }
        }

        html::apply_edits(html_text, edits)
    }

    /// 解析并校验资源的本地路径，失败返回 None
    fn local_path_for(&self, reference: &ResourceRef) -> Option<String> {
        let path = self.resolver.resolve(reference).ok()?;
        // 现在就确认可读，出错宁可早发现
        std::fs::File::open(&path).ok()?;

        let path = path.to_str()?.to_string();
        Some(match &self.quiz.document_root {
            Some(root) => compensate_document_root(&path, root),
            None => path,
        })
    }
}

/// 把站点资源 URL 解析为资源引用
///
/// 与站点根地址的比较容忍 http 与 https 的差别。模板为
/// `<base>/pluginfile.php/<context>/question/questiontext/<usage>/<slot>/<questionid>/<filename>`。
fn parse_resource_url(url: &str, base_url: &str) -> Option<ResourceRef> {
    let url_rest = strip_scheme(url)?;
    let base_rest = strip_scheme(base_url)?.trim_end_matches('/');

    let path = url_rest.strip_prefix(base_rest)?;
    let path = path.strip_prefix(PLUGINFILE_PREFIX)?;

    let mut segments = path.splitn(7, '/');
    let context_id: u64 = segments.next()?.parse().ok()?;
    if segments.next()? != COMPONENT_SEGMENT {
        return None;
    }
    if segments.next()? != FILEAREA_SEGMENT {
        return None;
    }
    let usage_id: u64 = segments.next()?.parse().ok()?;
    let slot: u64 = segments.next()?.parse().ok()?;
    let question_id: u64 = segments.next()?.parse().ok()?;
    let filename = segments.next()?;
    if filename.is_empty() {
        return None;
    }

    Some(ResourceRef {
        context_id,
        usage_id,
        slot,
        question_id,
        filename: filename.to_string(),
    })
}

fn strip_scheme(url: &str) -> Option<&str> {
    url.strip_prefix("https://")
        .or_else(|| url.strip_prefix("http://"))
}

/// 文档根目录补偿
///
/// 排版器会把绝对路径"修正"为相对于 Web 文档根目录的路径。当本地
/// 路径不在文档根之下时，这个修正是错的，需要按文档根的目录深度
/// 预先补上相应数量的上级目录段。
pub fn compensate_document_root(local_path: &str, document_root: &str) -> String {
    let root = document_root.trim_end_matches('/');
    if root.is_empty() {
        return local_path.to_string();
    }

    // 路径已经从文档根开始（或紧随一个前导分隔符）时不需要补偿
    if let Some(position) = local_path.find(root) {
        if position <= 1 {
            return local_path.to_string();
        }
    }

    let levels = root
        .split('/')
        .filter(|segment| !segment.is_empty())
        .count();

    let mut compensated = String::new();
    for _ in 0..levels {
        compensated.push_str("/..");
    }
    compensated.push_str(local_path);
    compensated
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    use crate::error::SourceError;
    use std::path::PathBuf;

    const BASE: &str = "https://moodle.example.edu";

    fn quiz(document_root: Option<&str>) -> QuizContext {
        QuizContext {
            course_short_name: "CS101".to_string(),
            quiz_name: "Quiz".to_string(),
            course_module_id: 1,
            base_url: BASE.to_string(),
            document_root: document_root.map(|s| s.to_string()),
            group_id: None,
        }
    }

    /// 固定返回同一个路径的解析器
    struct FixedResolver {
        path: PathBuf,
    }

    impl ResourceResolver for FixedResolver {
        fn resolve(&self, _reference: &ResourceRef) -> Result<PathBuf, SourceError> {
            Ok(self.path.clone())
        }
    }

    /// 永远失败的解析器
    struct FailingResolver;

    impl ResourceResolver for FailingResolver {
        fn resolve(&self, reference: &ResourceRef) -> Result<PathBuf, SourceError> {
            Err(SourceError::Resource {
                filename: reference.filename.clone(),
            })
        }
    }

    fn image_html(scheme: &str) -> String {
        format!(
            r#"<p>Look: <img class="pic" src="{}://moodle.example.edu/pluginfile.php/131/question/questiontext/55/1/202/diagram.png" alt="d"> here.</p>"#,
            scheme
        )
    }

    #[test]
    fn test_parse_resource_url() {
        let reference = parse_resource_url(
            "https://moodle.example.edu/pluginfile.php/131/question/questiontext/55/1/202/diagram.png",
            BASE,
        )
        .unwrap();

        assert_eq!(reference.context_id, 131);
        assert_eq!(reference.usage_id, 55);
        assert_eq!(reference.slot, 1);
        assert_eq!(reference.question_id, 202);
        assert_eq!(reference.filename, "diagram.png");
    }

    #[test]
    fn test_parse_resource_url_rejects_other_hosts_and_areas() {
        assert!(parse_resource_url(
            "https://other.example.edu/pluginfile.php/131/question/questiontext/55/1/202/d.png",
            BASE,
        )
        .is_none());

        assert!(parse_resource_url(
            "https://moodle.example.edu/pluginfile.php/131/question/answer/55/1/202/d.png",
            BASE,
        )
        .is_none());
    }

    #[test]
    fn test_rewrite_replaces_src_with_local_path() {
        let dir = tempfile::tempdir().unwrap();
        let file_path = dir.path().join("diagram.png");
        let mut file = std::fs::File::create(&file_path).unwrap();
        file.write_all(b"png-bytes").unwrap();

        let quiz = quiz(None);
        let resolver = FixedResolver {
            path: file_path.clone(),
        };
        let rewriter = ImageRewriter::new(&quiz, &resolver);

        // http 和 https 都要能匹配站点
        for scheme in ["http", "https"] {
            let result = rewriter.rewrite(&image_html(scheme));
            assert!(result.contains(&format!(r#"src="{}""#, file_path.display())));
            assert!(result.starts_with("<p>Look: <img class=\"pic\" src=\""));
        }
    }

    #[test]
    fn test_rewrite_unresolvable_image_becomes_placeholder() {
        let quiz = quiz(None);
        let resolver = FailingResolver;
        let rewriter = ImageRewriter::new(&quiz, &resolver);

        let result = rewriter.rewrite(&image_html("https"));
        assert_eq!(result, "<p>Look: [diagram.png] here.</p>");
    }

    #[test]
    fn test_rewrite_leaves_foreign_images_alone() {
        let quiz = quiz(None);
        let resolver = FailingResolver;
        let rewriter = ImageRewriter::new(&quiz, &resolver);

        let html_text = r#"<img src="https://elsewhere.example.com/x.png">"#;
        assert_eq!(rewriter.rewrite(html_text), html_text);
    }

    #[test]
    fn test_compensate_document_root() {
        // 本地路径不在文档根之下：按文档根深度补上上级目录段
        assert_eq!(
            compensate_document_root("/data/moodledata/files/a.png", "/var/www"),
            "/../../data/moodledata/files/a.png"
        );

        // 已经在文档根之下则不动
        assert_eq!(
            compensate_document_root("/var/www/files/a.png", "/var/www"),
            "/var/www/files/a.png"
        );

        // 文档根是 "/" 或空时不动
        assert_eq!(compensate_document_root("/data/a.png", "/"), "/data/a.png");
        assert_eq!(compensate_document_root("/data/a.png", ""), "/data/a.png");
    }
}
