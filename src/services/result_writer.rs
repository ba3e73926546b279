//! 结果写入服务 - 业务能力层
//!
//! 只负责"把结果追加写入文件"能力，不关心流程

use anyhow::{Context, Result};
use tokio::fs::OpenOptions;
use tokio::io::AsyncWriteExt;
use tracing::debug;

use crate::models::BatchResult;

/// 结果写入服务
///
/// 每条结果一行 JSON（JSON Lines），追加写入
pub struct ResultWriter {
    output_path: String,
}

impl ResultWriter {
    /// 使用自定义文件路径创建
    pub fn with_path(path: impl Into<String>) -> Self {
        Self {
            output_path: path.into(),
        }
    }

    pub fn path(&self) -> &str {
        &self.output_path
    }

    /// 追加写入一条结果
    pub async fn write(&self, result: &BatchResult) -> Result<()> {
        debug!(
            "写入结果: 题目 {} | 状态 {} | 内容长度: {}",
            result.topic_index + 1,
            result.status,
            result.content.len()
        );

        let mut line = serde_json::to_string(result).context("无法序列化结果")?;
        line.push('\n');

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.output_path)
            .await
            .with_context(|| format!("无法打开结果文件: {}", self.output_path))?;

        file.write_all(line.as_bytes())
            .await
            .with_context(|| format!("写入结果文件失败: {}", self.output_path))?;

        Ok(())
    }
}
