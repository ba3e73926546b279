//! Worker 池
//!
//! 固定数量的 worker 从同一个队列取题目，直到队列为空或批次被取消。
//! 单个题目内的意外错误（panic）在循环边界被捕获并记为失败，不影响 worker 继续工作。

use futures::FutureExt;
use std::any::Any;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error};

use crate::models::{BatchResult, StrategyMeta};
use crate::orchestrator::task_queue::TaskQueue;
use crate::orchestrator::tracker::ProgressTracker;
use crate::workflow::{TopicCtx, TopicFlow, TopicOutcome};

/// 所有 worker 共享的资源
pub struct WorkerShared {
    pub queue: Arc<TaskQueue>,
    pub flow: Arc<TopicFlow>,
    pub tracker: Arc<ProgressTracker>,
    pub cancel: CancellationToken,
    /// 串行策略下任务之间的间隔
    pub inter_task_delay: Duration,
    pub total: usize,
}

/// Worker 池
pub struct WorkerPool {
    handles: Vec<(usize, JoinHandle<()>)>,
}

impl WorkerPool {
    /// 启动 `size` 个 worker，批次内数量不变
    pub fn spawn(size: usize, shared: Arc<WorkerShared>) -> Self {
        let handles = (1..=size)
            .map(|worker_id| {
                let shared = shared.clone();
                (worker_id, tokio::spawn(worker_loop(worker_id, shared)))
            })
            .collect();
        Self { handles }
    }

    pub fn size(&self) -> usize {
        self.handles.len()
    }

    /// 等待所有 worker 退出
    pub async fn join(self) {
        for (worker_id, handle) in self.handles {
            if let Err(e) = handle.await {
                error!("[worker#{}] 任务执行失败: {}", worker_id, e);
            }
        }
    }
}

async fn worker_loop(worker_id: usize, shared: Arc<WorkerShared>) {
    debug!("[worker#{}] 启动", worker_id);

    loop {
        if shared.cancel.is_cancelled() {
            debug!("[worker#{}] 批次已取消，退出", worker_id);
            break;
        }
        let Some(topic) = shared.queue.pop() else {
            break;
        };

        shared.tracker.task_started();
        let ctx = TopicCtx::new(topic, shared.total, worker_id);

        let outcome = AssertUnwindSafe(shared.flow.run(&ctx)).catch_unwind().await;
        match outcome {
            Ok(TopicOutcome::Finished(result)) => shared.tracker.task_finished(result),
            Ok(TopicOutcome::Cancelled) => shared.tracker.task_abandoned(),
            Err(panic) if shared.cancel.is_cancelled() => {
                error!("{} 取消过程中出现意外错误: {}", ctx, panic_message(panic.as_ref()));
                shared.tracker.task_abandoned();
            }
            Err(panic) => {
                let message = format!("unexpected worker error: {}", panic_message(panic.as_ref()));
                error!("{} ❌ {}", ctx, message);
                shared.tracker.task_finished(BatchResult::failed(
                    &ctx.topic,
                    message,
                    StrategyMeta::default(),
                ));
            }
        }

        if !shared.inter_task_delay.is_zero() && !shared.queue.is_empty() {
            debug!(
                "[worker#{}] 等待 {:?} 后处理下一个题目",
                worker_id, shared.inter_task_delay
            );
            tokio::select! {
                _ = shared.cancel.cancelled() => break,
                _ = tokio::time::sleep(shared.inter_task_delay) => {}
            }
        }
    }

    debug!("[worker#{}] 退出", worker_id);
}

fn panic_message(panic: &(dyn Any + Send)) -> String {
    if let Some(msg) = panic.downcast_ref::<&str>() {
        msg.to_string()
    } else if let Some(msg) = panic.downcast_ref::<String>() {
        msg.clone()
    } else {
        "unknown panic".to_string()
    }
}
