//! 内容服务抽象 - 业务能力层
//!
//! 编排层只依赖 `ContentProvider`，不关心背后是哪家模型

use async_trait::async_trait;
use serde::Serialize;
use std::fmt;
use std::str::FromStr;
use tokio_util::sync::CancellationToken;

use crate::error::ProviderResult;
use crate::models::{ArticleConfig, BrandResearch, LinkList};

/// 内容服务种类
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderKind {
    /// 快速、便宜的对话模型
    Chat,
    /// 推理型模型，支持联网检索
    Reasoning,
}

impl fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProviderKind::Chat => f.write_str("chat"),
            ProviderKind::Reasoning => f.write_str("reasoning"),
        }
    }
}

impl FromStr for ProviderKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "chat" => Ok(ProviderKind::Chat),
            "reasoning" => Ok(ProviderKind::Reasoning),
            other => Err(format!("未知的内容服务: {}", other)),
        }
    }
}

/// 服务画像：速率、延迟和功能特点
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProviderProfile {
    pub kind: ProviderKind,
    /// 推理型模型，单次调用慢且配额紧张
    pub reasoning_heavy: bool,
    /// 支持生成时联网检索
    pub supports_web_research: bool,
}

/// 生成请求
#[derive(Debug, Clone)]
pub struct GenerationRequest {
    pub topic: String,
    pub article: ArticleConfig,
    /// 预设关键词与分析出的关键词合并后的结果
    pub keywords: Vec<String>,
    pub links: LinkList,
    pub brand: Option<BrandResearch>,
}

/// 生成结果
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedArticle {
    pub content: String,
    pub sources: Vec<String>,
}

/// 内容服务
///
/// 每个方法只处理单个题目；错误需区分暂时性和致命两类。
/// 同一实例会被多个 worker 并发调用。
#[async_trait]
pub trait ContentProvider: Send + Sync {
    fn profile(&self) -> ProviderProfile;

    /// 关键词分析
    async fn generate_keywords(&self, topic: &str) -> ProviderResult<Vec<String>>;

    /// 内链发现
    async fn scan_links(&self, website: &str, topic: &str) -> ProviderResult<LinkList>;

    /// 品牌分析
    async fn analyze_brand(&self, website: &str) -> ProviderResult<BrandResearch>;

    /// 生成文章
    ///
    /// 实现可以自行监听 `cancel`；不监听时调用方也会在取消后丢弃结果。
    async fn generate(
        &self,
        request: &GenerationRequest,
        cancel: CancellationToken,
    ) -> ProviderResult<GeneratedArticle>;
}
