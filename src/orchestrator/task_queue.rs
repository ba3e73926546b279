//! 题目队列
//!
//! 所有 worker 共享一个队列，空闲的 worker 直接取下一个题目。
//! 出队在锁内同步完成，不跨 await，保证同一题目不会被两个 worker 领取。

use std::collections::VecDeque;
use std::sync::{Mutex, MutexGuard};

use crate::models::QueuedTopic;

/// 题目队列
#[derive(Debug)]
pub struct TaskQueue {
    pending: Mutex<VecDeque<QueuedTopic>>,
}

impl TaskQueue {
    /// 按输入顺序入队
    pub fn new(topics: Vec<String>) -> Self {
        let pending = topics
            .into_iter()
            .enumerate()
            .map(|(index, topic)| QueuedTopic { index, topic })
            .collect();
        Self {
            pending: Mutex::new(pending),
        }
    }

    /// 取出下一个题目，队列为空时返回 None
    pub fn pop(&self) -> Option<QueuedTopic> {
        self.lock().pop_front()
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    // 持锁期间不会 panic，中毒时直接沿用内部数据
    fn lock(&self) -> MutexGuard<'_, VecDeque<QueuedTopic>> {
        self.pending
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}
