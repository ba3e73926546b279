//! 应用入口
//!
//! 负责把配置、内容服务、批次控制器和结果文件串起来：
//! 加载批次文件 → 启动批次 → 边收事件边写结果 → 输出统计。
//! Ctrl-C 会取消当前批次，已经写入的结果保留。

use anyhow::Result;
use std::path::Path;
use std::sync::Arc;
use tracing::{info, warn};

use crate::config::Config;
use crate::models::load_batch_file;
use crate::orchestrator::{BatchController, BatchEvent, BatchReport};
use crate::services::{build_provider, ResultWriter};
use crate::utils::logging;

/// 应用主结构
pub struct App {
    config: Config,
    controller: Arc<BatchController>,
    writer: ResultWriter,
}

impl App {
    /// 初始化应用
    pub fn initialize(config: Config) -> Result<Self> {
        logging::init_log_file(&config.output_log_file)?;

        let settings = config.controller_settings();
        logging::log_startup(&config.provider.to_string(), settings.default_concurrency);

        let provider = build_provider(&config);
        let controller = Arc::new(BatchController::new(provider, settings));
        let writer = ResultWriter::with_path(config.output_file.clone());

        Ok(Self {
            config,
            controller,
            writer,
        })
    }

    /// 运行一个批次
    ///
    /// `batch_file` 为空时使用配置中的路径
    pub async fn run(&self, batch_file: Option<&str>) -> Result<BatchReport> {
        let path = batch_file.unwrap_or(self.config.batch_file.as_str());
        info!("\n📁 正在加载批次文件: {}", path);
        let batch = load_batch_file(Path::new(path)).await?;

        let mut handle = self.controller.start(batch)?;

        // Ctrl-C 取消当前批次
        let controller = self.controller.clone();
        let cancel_watch = handle.cancellation_token();
        let ctrl_c = tokio::spawn(async move {
            tokio::select! {
                _ = cancel_watch.cancelled() => {}
                result = tokio::signal::ctrl_c() => {
                    if result.is_ok() {
                        warn!("⚠️ 收到 Ctrl-C，正在取消批次（进行中的请求结束后退出）");
                        controller.cancel();
                    }
                }
            }
        });

        while let Some(event) = handle.next_event().await {
            match event {
                BatchEvent::Started { total, concurrency } => {
                    info!("📋 共 {} 个题目，{} 个 worker", total, concurrency);
                }
                BatchEvent::Progress(progress) => {
                    if self.config.verbose_logging {
                        logging::log_progress(&progress);
                    }
                }
                BatchEvent::Result(result) => {
                    logging::log_result(&result);
                    if let Err(e) = self.writer.write(&result).await {
                        warn!("⚠️ 写入结果失败: {:#}", e);
                    }
                }
                BatchEvent::Finished(_) => break,
            }
        }

        let report = handle.wait().await;
        ctrl_c.abort();

        logging::print_final_stats(&report.summary, self.writer.path());
        Ok(report)
    }
}
