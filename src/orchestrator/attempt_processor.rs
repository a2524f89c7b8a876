//! 单份答卷处理器 - 编排层
//!
//! ## 职责
//!
//! 本模块负责处理单份答卷的所有题目单元，是答卷级别的编排器。
//!
//! ## 核心功能
//!
//! 1. **遍历单元**：按顺序处理 `Vec<QuestionUnit>`
//! 2. **流程调度**：创建并复用 `UnitFlow`
//! 3. **失败隔离**：任何单元失败都转成压缩包里的错误记录，继续下一个
//! 4. **缓冲清理**：答卷结束时丢弃未出件的渲染缓冲
//! 5. **统计输出**：记录成功 / 失败数量

use std::io::{Seek, Write};

use anyhow::{Context, Result};
use tracing::{error, info};

use crate::models::attempt::AttemptRecord;
use crate::models::options::ExportOptions;
use crate::models::question::QuestionUnit;
use crate::services::archive::ArchivePackager;
use crate::services::document_renderer::DocumentRenderer;
use crate::services::error_sink::ErrorSink;
use crate::services::naming;
use crate::workflow::{UnitCtx, UnitFlow};

/// 单元处理统计
#[derive(Debug, Default, Clone, Copy)]
pub struct AttemptStats {
    /// 成功处理的单元数
    pub processed: usize,
    /// 转成错误记录的单元数
    pub failed: usize,
    /// 写入的文档数
    pub documents: usize,
    /// 写入的附件数
    pub attachments: usize,
}

/// 处理单份答卷
///
/// # 参数
/// - `attempt`: 答卷记录
/// - `attempt_index`: 答卷序号（用于日志）
/// - `units`: 抽取好的题目单元
/// - `options`: 导出选项
/// - `renderer`: 渲染状态机（整个任务共用）
/// - `archive`: 压缩包打包器（整个任务共用）
/// - `errors`: 错误记录器（整个任务共用）
///
/// # 返回
/// 返回本答卷的处理统计；只有错误记录本身写不进压缩包时才失败
pub fn process_attempt<W: Write + Seek>(
    attempt: &AttemptRecord,
    attempt_index: usize,
    units: &[QuestionUnit],
    options: &ExportOptions,
    renderer: &mut DocumentRenderer,
    archive: &mut ArchivePackager<W>,
    errors: &mut ErrorSink,
) -> Result<AttemptStats> {
    let attempt_slug = naming::attempt_slug(attempt, options);
    let display_name = naming::display_name(attempt, options);

    log_attempt_start(attempt_index, &display_name, attempt.id, units.len());

    // 流程对象只创建一次，逐单元复用
    let flow = UnitFlow::new(options);
    let mut stats = AttemptStats::default();

    // ========== 遍历所有题目单元 ==========
    for (index, unit) in units.iter().enumerate() {
        let ctx = UnitCtx {
            attempt_index,
            question_no: index + 1,
            question_total: units.len(),
            folder: unit.folder.clone(),
            attempt_slug: attempt_slug.clone(),
            display_name: display_name.clone(),
        };

        log_unit_start(attempt_index, ctx.question_no, units.len());

        match flow.run(renderer, archive, unit, &ctx) {
            Ok(output) => {
                stats.processed += 1;
                stats.documents += output.documents;
                stats.attachments += output.attachments;
            }
            Err(e) => {
                error!("{} 处理失败: {:#}", ctx, e);
                errors
                    .record(archive, &e)
                    .context("无法把错误记录写入压缩包")?;
                stats.failed += 1;
            }
        }
    }

    // 失败的末尾单元可能留下未出件的缓冲，这里一并丢弃，
    // 不能让残页泄漏进下一份答卷的文档
    renderer.discard_open();

    log_attempt_complete(attempt_index, &stats);
    Ok(stats)
}

// ========== 日志辅助函数 ==========

fn log_attempt_start(attempt_index: usize, name: &str, attempt_id: u64, unit_count: usize) {
    info!("\n[答卷 {}] {}", attempt_index, "─".repeat(30));
    info!("[答卷 {}] 开始处理", attempt_index);
    info!("[答卷 {}] 学生: {}", attempt_index, name);
    info!("[答卷 {}] 答卷 ID: {}", attempt_index, attempt_id);
    info!("[答卷 {}] 论述题单元数: {}", attempt_index, unit_count);
}

fn log_unit_start(attempt_index: usize, question_no: usize, total: usize) {
    info!(
        "[答卷 {}] 处理第 {}/{} 个单元",
        attempt_index, question_no, total
    );
}

fn log_attempt_complete(attempt_index: usize, stats: &AttemptStats) {
    info!(
        "[答卷 {}] ✓ 处理完成: 成功 {}, 失败 {}, 文档 {}, 附件 {}",
        attempt_index, stats.processed, stats.failed, stats.documents, stats.attachments
    );
}
