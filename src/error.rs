//! 错误类型
//!
//! - `BatchError`：批次级别的结构性错误，唯一会从 `start` / `run_batch` 抛出的错误
//! - `ProviderError`：单个题目在调用内容服务时产生的错误，最终都会转换为结果条目

use thiserror::Error;
use tracing::warn;

/// 批次级错误
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum BatchError {
    /// 输入不合法（空题目列表、空白题目、并发数为 0 等）
    #[error("无效输入: {0}")]
    InvalidInput(String),
}

impl BatchError {
    pub fn invalid_input(msg: impl Into<String>) -> Self {
        BatchError::InvalidInput(msg.into())
    }
}

/// 内容服务错误
///
/// 需要区分"可重试"（额度/过载）和"致命"（认证/配置）两类，
/// 编排层据此决定吞掉还是上报；`Cancelled` 不算失败。
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ProviderError {
    /// 额度不足、服务过载、超时等暂时性错误
    #[error("服务暂时不可用: {message}")]
    Transient { message: String },

    /// 认证失败、模型不存在等配置类错误
    #[error("服务调用失败: {message}")]
    Fatal { message: String },

    /// 调用被取消
    #[error("请求已取消")]
    Cancelled,
}

impl ProviderError {
    pub fn transient(message: impl Into<String>) -> Self {
        ProviderError::Transient {
            message: message.into(),
        }
    }

    pub fn fatal(message: impl Into<String>) -> Self {
        ProviderError::Fatal {
            message: message.into(),
        }
    }

    /// 是否属于可重试的错误
    pub fn is_retriable(&self) -> bool {
        matches!(self, ProviderError::Transient { .. })
    }

    pub fn is_cancelled(&self) -> bool {
        matches!(self, ProviderError::Cancelled)
    }
}

const TRANSIENT_MARKERS: &[&str] = &[
    "429",
    "rate limit",
    "rate_limit",
    "quota",
    "overloaded",
    "resource_exhausted",
    "timeout",
    "timed out",
    "500",
    "502",
    "503",
    "504",
    "unavailable",
];

const FATAL_MARKERS: &[&str] = &[
    "401",
    "403",
    "unauthorized",
    "invalid api key",
    "invalid_api_key",
    "incorrect api key",
    "permission",
    "model_not_found",
    "does not exist",
];

/// 根据 API 返回的错误文本判断错误类别
///
/// 致命标记优先于暂时性标记；无法识别的错误按暂时性处理。
pub fn classify_llm_error(text: &str) -> ProviderError {
    let lower = text.to_lowercase();

    if FATAL_MARKERS.iter().any(|m| lower.contains(m)) {
        return ProviderError::fatal(text);
    }
    if !TRANSIENT_MARKERS.iter().any(|m| lower.contains(m)) {
        warn!("未识别的 LLM 错误，按暂时性处理: {}", text);
    }
    ProviderError::transient(text)
}

/// 内容服务结果类型
pub type ProviderResult<T> = Result<T, ProviderError>;
