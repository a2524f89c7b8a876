//! 导出任务 - 编排层
//!
//! ## 职责
//!
//! 本模块是导出管线的入口，驱动一次完整的导出。
//!
//! ## 核心功能
//!
//! 1. **前置校验**：选项不合法时任务不开始
//! 2. **空结果判断**：没有论述题 / 没有符合条件的答卷时不产出压缩包
//! 3. **顺序处理**：逐份答卷、逐个单元，严格串行
//! 4. **空包丢弃**：一个条目都没写成时丢弃压缩包，返回"无可下载"
//! 5. **全局统计**：汇总所有答卷的处理结果
//!
//! ## 设计特点
//!
//! - **能力注入**：答卷来源与资源解析都是注入的接口，不继承任何框架
//! - **失败隔离**：单元循环内的失败永远不会让任务中断，只有循环外
//!   的失败（比如输出流写不进去）才是致命的

use std::io::{Seek, Write};

use anyhow::{Context, Result};
use tracing::info;

use crate::error::ExportError;
use crate::infrastructure::content_source::{AttemptSource, ResourceResolver};
use crate::models::attempt::AttemptFilter;
use crate::models::options::ExportOptions;
use crate::models::quiz::QuizContext;
use crate::orchestrator::attempt_processor::{self, AttemptStats};
use crate::services::archive::ArchivePackager;
use crate::services::content_extractor::ContentExtractor;
use crate::services::document_renderer::DocumentRenderer;
use crate::services::error_sink::ErrorSink;
use crate::services::naming;

/// 一次导出的结果
#[derive(Debug)]
pub enum ExportOutcome {
    /// 压缩包已写入输出流
    Written {
        archive_name: String,
        entries: usize,
        stats: ExportStats,
    },
    /// 测验里没有论述题
    NoEssayQuestions,
    /// 没有符合条件的答卷，或者什么都没产出
    NothingToDownload,
}

/// 全局处理统计
#[derive(Debug, Default, Clone, Copy)]
pub struct ExportStats {
    pub attempts: usize,
    pub processed_units: usize,
    pub failed_units: usize,
    pub documents: usize,
    pub attachments: usize,
}

impl ExportStats {
    fn absorb(&mut self, attempt: &AttemptStats) {
        self.processed_units += attempt.processed;
        self.failed_units += attempt.failed;
        self.documents += attempt.documents;
        self.attachments += attempt.attachments;
    }
}

/// 导出任务
pub struct ExportJob<'a> {
    options: &'a ExportOptions,
    quiz: &'a QuizContext,
    source: &'a dyn AttemptSource,
    resolver: &'a dyn ResourceResolver,
}

impl<'a> ExportJob<'a> {
    pub fn new(
        options: &'a ExportOptions,
        quiz: &'a QuizContext,
        source: &'a dyn AttemptSource,
        resolver: &'a dyn ResourceResolver,
    ) -> Self {
        Self {
            options,
            quiz,
            source,
            resolver,
        }
    }

    /// 压缩包名称
    pub fn archive_name(&self) -> String {
        naming::archive_name(self.quiz, self.options)
    }

    /// 执行导出，把压缩包写入 `out`
    ///
    /// 返回空结果时 `out` 里没有可用内容，调用方不应投递它。
    pub fn run<W: Write + Seek>(&self, out: W) -> Result<ExportOutcome> {
        // 选项不合法时任务不开始
        self.options
            .validate()
            .map_err(ExportError::from)
            .context("导出选项校验失败")?;

        if !self
            .source
            .has_essay_questions()
            .context("无法确认测验题型")?
        {
            return Ok(ExportOutcome::NoEssayQuestions);
        }

        let filter = AttemptFilter {
            group_id: self.quiz.group_id,
            only_one_per_user: self.options.only_one_per_user,
        };
        let attempts = self
            .source
            .finished_attempts(&filter)
            .context("无法选取答卷")?;

        if attempts.is_empty() {
            return Ok(ExportOutcome::NothingToDownload);
        }

        log_run_start(self.quiz, attempts.len());

        let extractor = ContentExtractor::new(self.options, self.quiz, self.resolver);
        let mut renderer = DocumentRenderer::new(self.options);
        let mut archive = ArchivePackager::new(out);
        let mut errors = ErrorSink::new();
        let mut stats = ExportStats {
            attempts: attempts.len(),
            ..Default::default()
        };

        // ========== 逐份答卷，严格串行 ==========
        for (index, attempt) in attempts.iter().enumerate() {
            let attempt_index = index + 1;

            // 答卷级的读取失败也按单元失败的方式隔离：记录、继续
            let slots = match self.source.slots(attempt.id) {
                Ok(slots) => slots,
                Err(e) => {
                    let wrapped = anyhow::Error::from(ExportError::from(e))
                        .context(format!("[答卷 {}] 无法读取题目内容", attempt_index));
                    errors
                        .record(&mut archive, &wrapped)
                        .context("无法把错误记录写入压缩包")?;
                    continue;
                }
            };

            let units = extractor.extract(slots);
            if units.is_empty() {
                info!("[答卷 {}] 没有论述题作答，跳过", attempt_index);
                continue;
            }

            let attempt_stats = attempt_processor::process_attempt(
                attempt,
                attempt_index,
                &units,
                self.options,
                &mut renderer,
                &mut archive,
                &mut errors,
            )?;
            stats.absorb(&attempt_stats);
        }

        // 一个条目都没写成就不值得给用户一个空压缩包
        if archive.entry_count() == 0 {
            return Ok(ExportOutcome::NothingToDownload);
        }

        let entries = archive.entry_count();
        archive
            .finish()
            .map_err(ExportError::from)
            .context("无法完成压缩包")?;

        log_run_complete(entries, errors.count(), &stats);

        Ok(ExportOutcome::Written {
            archive_name: self.archive_name(),
            entries,
            stats,
        })
    }
}

// ========== 日志辅助函数 ==========

fn log_run_start(quiz: &QuizContext, attempt_count: usize) {
    info!("{}", "=".repeat(60));
    info!("🚀 开始导出论述题作答");
    info!("📋 测验: {} / {}", quiz.course_short_name, quiz.quiz_name);
    info!("📄 符合条件的答卷: {} 份", attempt_count);
    info!("{}", "=".repeat(60));
}

fn log_run_complete(entries: usize, error_count: usize, stats: &ExportStats) {
    info!("\n{}", "=".repeat(60));
    info!("📊 导出完成统计");
    info!(
        "完成时间: {}",
        chrono::Local::now().format("%Y-%m-%d %H:%M:%S")
    );
    info!("{}", "=".repeat(60));
    info!("✅ 成功单元: {}", stats.processed_units);
    info!("❌ 失败单元: {}", stats.failed_units);
    info!(
        "📦 压缩包条目: {} (文档 {}, 附件 {}, 错误记录 {})",
        entries, stats.documents, stats.attachments, error_count
    );
    info!("{}", "=".repeat(60));
}
