//! 单元处理流程 - 流程层
//!
//! 核心职责：定义"一个题目单元"的完整处理流程
//!
//! 流程顺序：
//! 1. 作答文本（可选统计）→ 渲染作答文档 → 入包
//! 2. 题干文本 → 渲染题干文档 → 入包（可选）
//! 3. 附件逐个入包（可选）
//!
//! 是否出件由这里决定：合并模式只在答卷最后一个单元出件，
//! 其余情况每个单元出件。

use std::io::{Seek, Write};

use anyhow::{Context, Result};
use tracing::debug;

use crate::models::options::ExportOptions;
use crate::models::question::QuestionUnit;
use crate::services::archive::ArchivePackager;
use crate::services::document_renderer::{DocumentRenderer, OutputKind, RenderRequest};
use crate::services::text_normalizer;
use crate::utils::logging;
use crate::workflow::unit_ctx::UnitCtx;

/// 作答文档的页眉
const RESPONSE_HEADER: &str = "Response";

/// 题干文档的页眉
const QUESTION_TEXT_HEADER: &str = "Question text";

/// 单元处理产出统计
#[derive(Debug, Default, Clone, Copy)]
pub struct UnitOutput {
    /// 写入压缩包的文档数
    pub documents: usize,
    /// 写入压缩包的附件数
    pub attachments: usize,
}

/// 单元处理流程
///
/// - 编排单个单元的渲染与打包
/// - 不持有渲染缓冲与输出流，只借用
/// - 任何一步失败都原样上抛，由编排层转成错误记录
pub struct UnitFlow<'a> {
    options: &'a ExportOptions,
}

impl<'a> UnitFlow<'a> {
    pub fn new(options: &'a ExportOptions) -> Self {
        Self { options }
    }

    pub fn run<W: Write + Seek>(
        &self,
        renderer: &mut DocumentRenderer,
        archive: &mut ArchivePackager<W>,
        unit: &QuestionUnit,
        ctx: &UnitCtx,
    ) -> Result<UnitOutput> {
        let mut output = UnitOutput::default();

        debug!(
            "{} 作答预览: {}",
            ctx,
            logging::truncate_text(&unit.response_text, 80)
        );

        // 合并模式下只有答卷的最后一个单元出件
        let shipout = !self.options.all_in_one || ctx.question_no == ctx.question_total;

        let base_path = format!("{}/{}", ctx.folder, ctx.attempt_slug);
        // 合并文档跨越多个题目目录，放到压缩包根部，用答卷标识保证唯一
        let prefix = if self.options.all_in_one {
            format!("{}_allquestions_", ctx.attempt_slug)
        } else {
            format!("{}_", base_path)
        };

        // ========== 作答文档 ==========
        let header = if self.options.all_in_one {
            format!("Response to Question {}", ctx.question_no)
        } else {
            RESPONSE_HEADER.to_string()
        };

        let mut response_text = unit.response_text.clone();
        if self.options.include_statistics {
            response_text =
                text_normalizer::append_statistics(&response_text, unit.response_format);
        }

        let document = renderer
            .render(&RenderRequest {
                kind: OutputKind::Response,
                text: &response_text,
                format: unit.response_format,
                header: &header,
                subheader: &ctx.display_name,
                author: &ctx.display_name,
                shipout,
            })
            .with_context(|| format!("{} 渲染作答文档失败", ctx))?;

        if let Some(bytes) = document {
            let path = format!("{}response.pdf", prefix);
            archive
                .add_entry(&path, &bytes)
                .with_context(|| format!("{} 写入作答文档失败", ctx))?;
            output.documents += 1;
        }

        // ========== 题干文档 ==========
        if self.options.include_question_text {
            let document = renderer
                .render(&RenderRequest {
                    kind: OutputKind::QuestionText,
                    text: &unit.question_text,
                    format: unit.question_format,
                    header: QUESTION_TEXT_HEADER,
                    subheader: &format!("Presented to: {}", ctx.display_name),
                    author: "",
                    shipout,
                })
                .with_context(|| format!("{} 渲染题干文档失败", ctx))?;

            if let Some(bytes) = document {
                let path = format!("{}questiontext.pdf", prefix);
                archive
                    .add_entry(&path, &bytes)
                    .with_context(|| format!("{} 写入题干文档失败", ctx))?;
                output.documents += 1;
            }
        }

        // ========== 附件 ==========
        if self.options.include_attachments {
            for attachment in &unit.attachments {
                // 附件名里的路径分隔符不能带进压缩包
                let filename = attachment.filename.replace(['/', '\\'], "_");
                let path = format!("{}_attachments/{}", base_path, filename);
                debug!("{} 打包附件: {}", ctx, filename);
                archive
                    .add_attachment(&path, attachment)
                    .with_context(|| format!("{} 打包附件 {} 失败", ctx, filename))?;
                output.attachments += 1;
            }
        }

        Ok(output)
    }
}
