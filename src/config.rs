use std::time::Duration;

use crate::orchestrator::ControllerSettings;
use crate::services::ProviderKind;

/// 程序配置
#[derive(Clone, Debug)]
pub struct Config {
    /// 默认同时处理的题目数量
    pub max_concurrent_topics: usize,
    /// 串行策略下两个任务之间的间隔（毫秒）
    pub serial_delay_ms: u64,
    /// 使用的内容服务
    pub provider: ProviderKind,
    /// 批次文件路径
    pub batch_file: String,
    /// 结果输出文件（JSON Lines）
    pub output_file: String,
    /// 运行日志文件
    pub output_log_file: String,
    /// 是否显示详细日志
    pub verbose_logging: bool,
    /// 内链发现最多保留的链接数
    pub max_internal_links: usize,
    // --- LLM 配置 ---
    pub llm_api_key: String,
    pub llm_api_base_url: String,
    pub llm_model_name: String,
    pub reasoning_model_name: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            max_concurrent_topics: 5,
            serial_delay_ms: 2000,
            provider: ProviderKind::Chat,
            batch_file: "batch.toml".to_string(),
            output_file: "results.jsonl".to_string(),
            output_log_file: "output.txt".to_string(),
            verbose_logging: false,
            max_internal_links: 10,
            llm_api_key: String::new(),
            llm_api_base_url: "https://api.openai.com/v1".to_string(),
            llm_model_name: "gpt-4o-mini".to_string(),
            reasoning_model_name: "o3-mini".to_string(),
        }
    }
}

impl Config {
    pub fn from_env() -> Self {
        let default = Self::default();
        Self {
            max_concurrent_topics: std::env::var("MAX_CONCURRENT_TOPICS").ok().and_then(|v| v.parse::<usize>().ok()).filter(|n| *n > 0).unwrap_or(default.max_concurrent_topics),
            serial_delay_ms: std::env::var("SERIAL_DELAY_MS").ok().and_then(|v| v.parse().ok()).unwrap_or(default.serial_delay_ms),
            provider: std::env::var("PROVIDER").ok().and_then(|v| v.parse().ok()).unwrap_or(default.provider),
            batch_file: std::env::var("BATCH_FILE").unwrap_or(default.batch_file),
            output_file: std::env::var("OUTPUT_FILE").unwrap_or(default.output_file),
            output_log_file: std::env::var("OUTPUT_LOG_FILE").unwrap_or(default.output_log_file),
            verbose_logging: std::env::var("VERBOSE_LOGGING").ok().and_then(|v| v.parse().ok()).unwrap_or(default.verbose_logging),
            max_internal_links: std::env::var("MAX_INTERNAL_LINKS").ok().and_then(|v| v.parse().ok()).unwrap_or(default.max_internal_links),
            llm_api_key: std::env::var("LLM_API_KEY").unwrap_or(default.llm_api_key),
            llm_api_base_url: std::env::var("LLM_API_BASE_URL").unwrap_or(default.llm_api_base_url),
            llm_model_name: std::env::var("LLM_MODEL_NAME").unwrap_or(default.llm_model_name),
            reasoning_model_name: std::env::var("REASONING_MODEL_NAME").unwrap_or(default.reasoning_model_name),
        }
    }

    /// 编排层设置，显式传入 `BatchController`
    pub fn controller_settings(&self) -> ControllerSettings {
        ControllerSettings {
            default_concurrency: self.max_concurrent_topics.max(1),
            serial_delay: Duration::from_millis(self.serial_delay_ms),
        }
    }
}
