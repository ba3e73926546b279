//! 题目处理上下文
//!
//! 封装"哪个 worker 正在处理第几个题目"这一信息

use std::fmt::Display;

use crate::models::QueuedTopic;

/// 题目处理上下文
#[derive(Debug, Clone)]
pub struct TopicCtx {
    pub topic: QueuedTopic,

    /// 批次题目总数（仅用于日志显示）
    pub total: usize,

    /// 处理该题目的 worker 编号（从1开始）
    pub worker_id: usize,
}

impl TopicCtx {
    /// 创建新的题目上下文
    pub fn new(topic: QueuedTopic, total: usize, worker_id: usize) -> Self {
        Self {
            topic,
            total,
            worker_id,
        }
    }

    pub fn topic(&self) -> &str {
        &self.topic.topic
    }
}

impl Display for TopicCtx {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "[题目 {}/{} worker#{}]",
            self.topic.index + 1,
            self.total,
            self.worker_id
        )
    }
}
