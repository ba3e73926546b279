//! 进度与结果汇总
//!
//! 进度计数和结果列表在同一把锁内修改，事件也在锁内发出，
//! 因此单个观察者看到的 `completed` 一定是非递减的。

use std::sync::{Mutex, MutexGuard};
use tokio::sync::mpsc::UnboundedSender;

use crate::models::{BatchResult, BatchSummary, Progress};

/// 批次事件
#[derive(Debug, Clone)]
pub enum BatchEvent {
    /// 批次开始
    Started { total: usize, concurrency: usize },
    /// 进度变化（任务开始、完成或因取消放弃时）
    Progress(Progress),
    /// 新的结果
    Result(BatchResult),
    /// 批次结束
    Finished(BatchSummary),
}

#[derive(Debug, Default)]
struct TrackerState {
    progress: Progress,
    results: Vec<BatchResult>,
}

/// 进度跟踪器
pub struct ProgressTracker {
    state: Mutex<TrackerState>,
    events: UnboundedSender<BatchEvent>,
}

impl ProgressTracker {
    pub fn new(total: usize, events: UnboundedSender<BatchEvent>) -> Self {
        Self {
            state: Mutex::new(TrackerState {
                progress: Progress {
                    total,
                    ..Default::default()
                },
                results: Vec::new(),
            }),
            events,
        }
    }

    /// 发送事件；观察者已经离开时忽略
    pub fn emit(&self, event: BatchEvent) {
        let _ = self.events.send(event);
    }

    /// worker 领取了一个题目
    pub fn task_started(&self) {
        let mut state = self.lock();
        state.progress.active += 1;
        self.emit(BatchEvent::Progress(state.progress));
    }

    /// 题目结束（成功或失败），记录结果
    pub fn task_finished(&self, result: BatchResult) {
        let mut state = self.lock();
        state.progress.active = state.progress.active.saturating_sub(1);
        state.progress.completed += 1;
        if !result.is_completed() {
            state.progress.failed += 1;
        }
        state.results.push(result.clone());

        self.emit(BatchEvent::Result(result));
        self.emit(BatchEvent::Progress(state.progress));
    }

    /// 题目因取消被放弃，不记录结果
    pub fn task_abandoned(&self) {
        let mut state = self.lock();
        state.progress.active = state.progress.active.saturating_sub(1);
        self.emit(BatchEvent::Progress(state.progress));
    }

    pub fn progress(&self) -> Progress {
        self.lock().progress
    }

    /// 已记录的结果（按完成顺序）
    pub fn results(&self) -> Vec<BatchResult> {
        self.lock().results.clone()
    }

    fn lock(&self) -> MutexGuard<'_, TrackerState> {
        self.state
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}
