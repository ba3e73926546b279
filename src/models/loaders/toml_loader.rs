use crate::models::article::ArticleConfig;
use crate::models::batch::{BatchConfig, ConcurrencyPolicy};
use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::Path;
use tokio::fs;

/// 批次文件的原始结构
#[derive(Debug, Deserialize)]
struct BatchFile {
    #[serde(default)]
    topics: Vec<String>,
    /// 每行一个题目的文本文件，相对批次文件所在目录
    topics_file: Option<String>,
    /// 省略时按策略表自动决定
    concurrency: Option<usize>,
    #[serde(default)]
    article: ArticleConfig,
}

/// 解析批次 TOML 内容
///
/// 只负责格式转换，题目为空等校验留给 `BatchConfig::validate`
pub fn parse_batch_toml(content: &str) -> Result<BatchConfig> {
    let file: BatchFile = toml::from_str(content).context("无法解析批次文件")?;
    if file.topics_file.is_some() {
        anyhow::bail!("topics_file 需要通过 load_batch_file 加载");
    }
    Ok(into_batch_config(file, Vec::new()))
}

/// 从 TOML 文件加载批次配置
pub async fn load_batch_file(path: &Path) -> Result<BatchConfig> {
    let content = fs::read_to_string(path)
        .await
        .with_context(|| format!("无法读取批次文件: {}", path.display()))?;

    let mut file: BatchFile = toml::from_str(&content)
        .with_context(|| format!("无法解析批次文件: {}", path.display()))?;

    let mut extra_topics = Vec::new();
    if let Some(topics_file) = file.topics_file.take() {
        let topics_path = path
            .parent()
            .unwrap_or_else(|| Path::new("."))
            .join(&topics_file);
        let text = fs::read_to_string(&topics_path)
            .await
            .with_context(|| format!("无法读取题目文件: {}", topics_path.display()))?;
        extra_topics = parse_topic_lines(&text);
        tracing::info!(
            "从 {} 读取到 {} 个题目",
            topics_path.display(),
            extra_topics.len()
        );
    }

    let config = into_batch_config(file, extra_topics);
    tracing::info!("成功加载批次文件，共 {} 个题目", config.topics.len());
    Ok(config)
}

/// 每行一个题目，忽略空行和 `#` 开头的注释
pub fn parse_topic_lines(text: &str) -> Vec<String> {
    text.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .map(str::to_string)
        .collect()
}

fn into_batch_config(file: BatchFile, extra_topics: Vec<String>) -> BatchConfig {
    let mut topics = file.topics;
    topics.extend(extra_topics);

    let concurrency = match file.concurrency {
        Some(n) => ConcurrencyPolicy::Fixed(n),
        None => ConcurrencyPolicy::Auto,
    };

    BatchConfig::new(topics, file.article).with_concurrency(concurrency)
}
