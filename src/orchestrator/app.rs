//! 应用生命周期 - 编排层
//!
//! ## 职责
//!
//! 本模块是命令行程序的入口，负责资源装配和结果投递。
//!
//! ## 核心功能
//!
//! 1. **应用初始化**：加载数据目录（quiz.toml + attempts/ + files/）
//! 2. **任务执行**：把导出任务写进内存缓冲
//! 3. **结果投递**：有内容时落盘为 ZIP 文件，否则输出提示
//!
//! 压缩包先写进内存再落盘：空结果必须丢弃而不是留下一个空文件。

use std::fs;
use std::io::Cursor;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tracing::{info, warn};

use crate::config::Config;
use crate::infrastructure::fixture_source::{DirectoryResolver, FixtureSource};
use crate::models::options::ExportOptions;
use crate::models::quiz::QuizContext;
use crate::orchestrator::export_job::{ExportJob, ExportOutcome};

/// 应用主结构
pub struct App {
    config: Config,
    quiz: QuizContext,
    options: ExportOptions,
    source: FixtureSource,
    resolver: DirectoryResolver,
}

impl App {
    /// 初始化应用
    pub fn initialize(config: Config) -> Result<Self> {
        log_startup(&config);

        let data_dir = Path::new(&config.data_dir);
        let (source, quiz, options) = FixtureSource::load(data_dir)
            .with_context(|| format!("无法加载数据目录: {}", data_dir.display()))?;
        let resolver = DirectoryResolver::for_data_dir(data_dir);

        Ok(Self {
            config,
            quiz,
            options,
            source,
            resolver,
        })
    }

    /// 运行导出任务
    pub fn run(&self) -> Result<()> {
        let job = ExportJob::new(&self.options, &self.quiz, &self.source, &self.resolver);

        let mut buffer = Cursor::new(Vec::new());
        match job.run(&mut buffer)? {
            ExportOutcome::Written {
                archive_name,
                entries,
                ..
            } => {
                let path = self.output_path(&archive_name);
                fs::write(&path, buffer.get_ref())
                    .with_context(|| format!("无法写出压缩包: {}", path.display()))?;
                info!("✅ 共 {} 个条目，压缩包已保存至: {}", entries, path.display());
            }
            ExportOutcome::NoEssayQuestions => {
                warn!("⚠️ 测验中没有论述题，没有可导出的内容");
            }
            ExportOutcome::NothingToDownload => {
                warn!("⚠️ 没有符合条件的答卷，没有可下载的内容");
            }
        }

        Ok(())
    }

    fn output_path(&self, archive_name: &str) -> PathBuf {
        Path::new(&self.config.output_dir).join(archive_name)
    }
}

// ========== 日志辅助函数 ==========

fn log_startup(config: &Config) {
    info!("{}", "=".repeat(60));
    info!("🚀 程序启动 - 论述题作答导出");
    info!("📁 数据目录: {}", config.data_dir);
    info!("📦 输出目录: {}", config.output_dir);
    info!("{}", "=".repeat(60));
}
