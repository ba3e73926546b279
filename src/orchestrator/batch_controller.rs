//! 批次控制器 - 编排层
//!
//! ## 职责
//!
//! 本模块是批量生成的唯一入口，负责一个批次从开始到结束的全部调度。
//!
//! ## 核心功能
//!
//! 1. **输入校验**：题目列表为空等结构性错误直接返回 `InvalidInput`
//! 2. **并发策略**：按策略表确定 worker 数量和任务间隔
//! 3. **预取研究**：用第一个题目预取品牌分析和站内链接
//! 4. **启动 worker 池**：worker 共享同一个队列
//! 5. **进度汇总**：每个题目开始 / 结束时发出进度事件
//! 6. **取消**：每次开始都创建新的取消标记，取消只影响当前批次
//!
//! ## 设计特点
//!
//! - **不持有全局状态**：服务和设置在构造时显式传入
//! - **部分失败**：单个题目的错误只会变成一条失败结果，批次不会整体失败

use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};
use tokio::sync::mpsc::{self, UnboundedReceiver};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{error, info};

use crate::error::BatchError;
use crate::models::{BatchConfig, BatchResult, BatchSummary, Progress};
use crate::orchestrator::policy::{self, ExecutionPlan};
use crate::orchestrator::task_queue::TaskQueue;
use crate::orchestrator::tracker::{BatchEvent, ProgressTracker};
use crate::orchestrator::worker_pool::{WorkerPool, WorkerShared};
use crate::services::{ContentProvider, ResearchCache};
use crate::utils::logging;
use crate::workflow::TopicFlow;

/// 编排层设置
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ControllerSettings {
    /// 未命中串行规则时的默认并发数
    pub default_concurrency: usize,
    /// 串行策略下任务之间的间隔
    pub serial_delay: Duration,
}

impl Default for ControllerSettings {
    fn default() -> Self {
        Self {
            default_concurrency: 5,
            serial_delay: Duration::from_secs(2),
        }
    }
}

/// 批次最终结果
#[derive(Debug, Clone)]
pub struct BatchReport {
    /// 按完成顺序排列
    pub results: Vec<BatchResult>,
    pub progress: Progress,
    pub summary: BatchSummary,
}

impl BatchReport {
    pub fn completed(&self) -> impl Iterator<Item = &BatchResult> {
        self.results.iter().filter(|r| r.is_completed())
    }

    pub fn failed(&self) -> impl Iterator<Item = &BatchResult> {
        self.results.iter().filter(|r| !r.is_completed())
    }
}

/// 批次控制器
pub struct BatchController {
    provider: Arc<dyn ContentProvider>,
    settings: ControllerSettings,
    /// 最近一次启动的批次的取消标记
    current: Mutex<Option<CancellationToken>>,
}

impl BatchController {
    pub fn new(provider: Arc<dyn ContentProvider>, settings: ControllerSettings) -> Self {
        Self {
            provider,
            settings,
            current: Mutex::new(None),
        }
    }

    pub fn settings(&self) -> &ControllerSettings {
        &self.settings
    }

    /// 计算批次执行计划（不启动批次）
    pub fn plan(&self, config: &BatchConfig) -> ExecutionPlan {
        policy::resolve(
            config.concurrency,
            &self.provider.profile(),
            &config.article.features,
            &self.settings,
            config.topics.len(),
        )
    }

    /// 启动批次
    ///
    /// 输入校验同步完成；批次本身在后台运行，需要在 tokio 运行时内调用。
    pub fn start(&self, config: BatchConfig) -> Result<BatchHandle, BatchError> {
        config.validate()?;

        let cancel = CancellationToken::new();
        *self
            .current
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner()) = Some(cancel.clone());

        let plan = self.plan(&config);
        let total = config.topics.len();
        let (events_tx, events_rx) = mpsc::unbounded_channel();
        let tracker = Arc::new(ProgressTracker::new(total, events_tx));

        let join = tokio::spawn(drive_batch(
            self.provider.clone(),
            config,
            plan,
            cancel.clone(),
            tracker.clone(),
        ));

        Ok(BatchHandle {
            events: events_rx,
            cancel,
            tracker,
            join,
            total,
            started_at: Instant::now(),
        })
    }

    /// 运行批次直到结束
    pub async fn run_batch(&self, config: BatchConfig) -> Result<BatchReport, BatchError> {
        let handle = self.start(config)?;
        Ok(handle.wait().await)
    }

    /// 取消最近一次启动的批次
    pub fn cancel(&self) {
        let current = self
            .current
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        if let Some(token) = current.as_ref() {
            info!("🛑 收到取消请求");
            token.cancel();
        }
    }
}

/// 运行中的批次
pub struct BatchHandle {
    events: UnboundedReceiver<BatchEvent>,
    cancel: CancellationToken,
    tracker: Arc<ProgressTracker>,
    join: JoinHandle<BatchSummary>,
    total: usize,
    started_at: Instant,
}

impl BatchHandle {
    /// 下一个事件；批次结束且事件读完后返回 None
    pub async fn next_event(&mut self) -> Option<BatchEvent> {
        self.events.recv().await
    }

    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    pub fn progress(&self) -> Progress {
        self.tracker.progress()
    }

    /// 等待批次结束，未读取的事件直接丢弃
    pub async fn wait(self) -> BatchReport {
        let BatchHandle {
            events,
            cancel,
            tracker,
            join,
            total,
            started_at,
        } = self;
        drop(events);

        let summary = match join.await {
            Ok(summary) => summary,
            Err(e) => {
                error!("批次任务异常结束: {}", e);
                let progress = tracker.progress();
                BatchSummary {
                    total,
                    completed: progress.completed,
                    failed: progress.failed,
                    abandoned: total - progress.completed,
                    cancelled: cancel.is_cancelled(),
                    elapsed: started_at.elapsed(),
                }
            }
        };

        BatchReport {
            results: tracker.results(),
            progress: tracker.progress(),
            summary,
        }
    }
}

/// 批次主流程
async fn drive_batch(
    provider: Arc<dyn ContentProvider>,
    config: BatchConfig,
    plan: ExecutionPlan,
    cancel: CancellationToken,
    tracker: Arc<ProgressTracker>,
) -> BatchSummary {
    let started_at = Instant::now();
    let total = config.topics.len();

    logging::log_batch_start(total, plan.concurrency, plan.is_serial());
    if let Some(reason) = plan.serial_reason {
        info!("串行原因: {}，任务间隔 {:?}", reason, plan.inter_task_delay);
    }
    tracker.emit(BatchEvent::Started {
        total,
        concurrency: plan.concurrency,
    });

    // 预取研究结果，内链用第一个题目扫描
    let cache = Arc::new(ResearchCache::new());
    if !cancel.is_cancelled() {
        cache
            .prefetch(provider.as_ref(), &config.article, &config.topics[0], &cancel)
            .await;
    }

    let queue = Arc::new(TaskQueue::new(config.topics));
    let flow = Arc::new(TopicFlow::new(
        provider,
        cache.clone(),
        config.article,
        cancel.clone(),
    ));

    let shared = Arc::new(WorkerShared {
        queue,
        flow,
        tracker: tracker.clone(),
        cancel: cancel.clone(),
        inter_task_delay: plan.inter_task_delay,
        total,
    });

    let pool = WorkerPool::spawn(plan.concurrency, shared);
    info!("👷 已启动 {} 个 worker", pool.size());
    pool.join().await;

    let progress = tracker.progress();
    let stats = cache.stats();
    info!(
        "研究缓存: 品牌分析请求 {} 次, 内链扫描 {} 次",
        stats.brand_fetches, stats.link_fetches
    );

    let summary = BatchSummary {
        total,
        completed: progress.completed,
        failed: progress.failed,
        abandoned: total - progress.completed,
        cancelled: cancel.is_cancelled(),
        elapsed: started_at.elapsed(),
    };
    tracker.emit(BatchEvent::Finished(summary));
    summary
}
