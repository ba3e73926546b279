//! 批次数据模型

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

use crate::error::BatchError;
use crate::models::article::ArticleConfig;

/// 并发策略
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ConcurrencyPolicy {
    /// 由策略表根据服务和功能组合决定
    #[default]
    Auto,
    /// 指定并发数（必须 ≥ 1），限流敏感组合下仍会被强制串行
    Fixed(usize),
}

/// 批次配置
///
/// 每次"开始"创建一份，批次运行期间不可变
#[derive(Debug, Clone)]
pub struct BatchConfig {
    pub topics: Vec<String>,
    pub article: ArticleConfig,
    pub concurrency: ConcurrencyPolicy,
}

impl BatchConfig {
    pub fn new(topics: Vec<String>, article: ArticleConfig) -> Self {
        Self {
            topics,
            article,
            concurrency: ConcurrencyPolicy::Auto,
        }
    }

    pub fn with_concurrency(mut self, concurrency: ConcurrencyPolicy) -> Self {
        self.concurrency = concurrency;
        self
    }

    /// 校验批次配置
    pub fn validate(&self) -> Result<(), BatchError> {
        if self.topics.is_empty() {
            return Err(BatchError::invalid_input("题目列表不能为空"));
        }
        if let Some(pos) = self.topics.iter().position(|t| t.trim().is_empty()) {
            return Err(BatchError::invalid_input(format!(
                "第 {} 个题目为空",
                pos + 1
            )));
        }
        if self.concurrency == ConcurrencyPolicy::Fixed(0) {
            return Err(BatchError::invalid_input("并发数必须大于等于 1"));
        }
        if self.article.word_count == 0 {
            return Err(BatchError::invalid_input("目标字数必须大于 0"));
        }
        if matches!(self.article.website.as_deref(), Some(site) if site.trim().is_empty()) {
            return Err(BatchError::invalid_input("网站地址不能为空白"));
        }
        Ok(())
    }
}

/// 队列中的题目
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueuedTopic {
    /// 在输入列表中的位置（从 0 开始）
    pub index: usize,
    pub topic: String,
}

/// 结果状态
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResultStatus {
    Completed,
    Failed,
}

impl fmt::Display for ResultStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ResultStatus::Completed => f.write_str("completed"),
            ResultStatus::Failed => f.write_str("failed"),
        }
    }
}

/// 实际应用的优化策略
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StrategyMeta {
    pub keyword_count: usize,
    pub link_count: usize,
    /// 内链是否来自批次缓存
    pub links_from_cache: bool,
    /// 是否带上了品牌分析
    pub brand_applied: bool,
}

/// 单个题目的结果
///
/// 任务结束时创建一次，之后不再修改
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BatchResult {
    pub topic: String,
    pub topic_index: usize,
    /// 文章内容；失败时为错误信息
    pub content: String,
    #[serde(default)]
    pub sources: Vec<String>,
    pub status: ResultStatus,
    pub generated_at: DateTime<Utc>,
    pub strategy: StrategyMeta,
}

impl BatchResult {
    pub fn completed(
        topic: &QueuedTopic,
        content: String,
        sources: Vec<String>,
        strategy: StrategyMeta,
    ) -> Self {
        Self {
            topic: topic.topic.clone(),
            topic_index: topic.index,
            content,
            sources,
            status: ResultStatus::Completed,
            generated_at: Utc::now(),
            strategy,
        }
    }

    pub fn failed(topic: &QueuedTopic, message: String, strategy: StrategyMeta) -> Self {
        Self {
            topic: topic.topic.clone(),
            topic_index: topic.index,
            content: message,
            sources: Vec::new(),
            status: ResultStatus::Failed,
            generated_at: Utc::now(),
            strategy,
        }
    }

    pub fn is_completed(&self) -> bool {
        self.status == ResultStatus::Completed
    }
}

/// 批次进度
///
/// `completed` 包含成功和失败，`failed` 是其中失败的部分
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Progress {
    pub completed: usize,
    pub failed: usize,
    pub total: usize,
    pub active: usize,
}

/// 批次汇总
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BatchSummary {
    pub total: usize,
    pub completed: usize,
    pub failed: usize,
    /// 因取消而放弃的题目数
    pub abandoned: usize,
    pub cancelled: bool,
    pub elapsed: Duration,
}

impl BatchSummary {
    pub fn succeeded(&self) -> usize {
        self.completed - self.failed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(topics: &[&str]) -> BatchConfig {
        BatchConfig::new(
            topics.iter().map(|t| t.to_string()).collect(),
            ArticleConfig::default(),
        )
    }

    #[test]
    fn empty_topic_list_is_invalid() {
        let err = config(&[]).validate().unwrap_err();
        assert!(matches!(err, BatchError::InvalidInput(_)));
    }

    #[test]
    fn blank_topic_is_invalid() {
        let err = config(&["rust", "  "]).validate().unwrap_err();
        assert_eq!(err, BatchError::invalid_input("第 2 个题目为空"));
    }

    #[test]
    fn zero_concurrency_is_invalid() {
        let cfg = config(&["rust"]).with_concurrency(ConcurrencyPolicy::Fixed(0));
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn duplicate_topics_are_allowed() {
        assert!(config(&["rust", "rust"]).validate().is_ok());
    }

    #[test]
    fn failed_result_carries_error_as_content() {
        let topic = QueuedTopic {
            index: 3,
            topic: "B".to_string(),
        };
        let result = BatchResult::failed(&topic, "boom".to_string(), StrategyMeta::default());
        assert_eq!(result.status, ResultStatus::Failed);
        assert_eq!(result.content, "boom");
        assert_eq!(result.topic_index, 3);
        assert!(!result.is_completed());
    }
}
