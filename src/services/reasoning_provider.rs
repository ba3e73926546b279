//! 推理型内容服务
//!
//! 推理型模型（可接联网检索的 OpenAI 兼容端点），单次调用慢、配额紧，
//! 与联网检索同时开启时编排层会强制串行。

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::config::Config;
use crate::error::{ProviderError, ProviderResult};
use crate::infrastructure::site_scanner::rank_links;
use crate::infrastructure::{LlmClient, SiteScanner};
use crate::models::{BrandResearch, LinkList};
use crate::services::content_provider::{
    ContentProvider, GeneratedArticle, GenerationRequest, ProviderKind, ProviderProfile,
};
use crate::services::prompts;

/// 推理型内容服务
pub struct ReasoningProvider {
    /// 写文章用的推理模型
    writer: LlmClient,
    /// 关键词、品牌分析这类轻任务用普通模型
    helper: LlmClient,
    scanner: SiteScanner,
    max_links: usize,
}

impl ReasoningProvider {
    pub fn new(config: &Config) -> Self {
        let writer = LlmClient::new(
            &config.llm_api_key,
            &config.llm_api_base_url,
            config.reasoning_model_name.clone(),
        )
        .with_temperature(None)
        .with_max_completion_tokens(16_384);

        let helper = LlmClient::new(
            &config.llm_api_key,
            &config.llm_api_base_url,
            config.llm_model_name.clone(),
        )
        .with_temperature(Some(0.3));

        Self {
            writer,
            helper,
            scanner: SiteScanner::new(),
            max_links: config.max_internal_links,
        }
    }
}

#[async_trait]
impl ContentProvider for ReasoningProvider {
    fn profile(&self) -> ProviderProfile {
        ProviderProfile {
            kind: ProviderKind::Reasoning,
            reasoning_heavy: true,
            supports_web_research: true,
        }
    }

    async fn generate_keywords(&self, topic: &str) -> ProviderResult<Vec<String>> {
        let response = self
            .helper
            .chat(&prompts::keyword_prompt(topic), Some(prompts::KEYWORD_SYSTEM))
            .await?;
        prompts::parse_string_list(&response)
    }

    async fn scan_links(&self, website: &str, topic: &str) -> ProviderResult<LinkList> {
        let pages = self.scanner.list_pages(website).await?;
        Ok(rank_links(&pages, topic, self.max_links))
    }

    async fn analyze_brand(&self, website: &str) -> ProviderResult<BrandResearch> {
        let response = self
            .helper
            .chat(&prompts::brand_prompt(website), Some(prompts::BRAND_SYSTEM))
            .await?;
        prompts::parse_brand(&response)
    }

    async fn generate(
        &self,
        request: &GenerationRequest,
        cancel: CancellationToken,
    ) -> ProviderResult<GeneratedArticle> {
        let web_research = request.article.features.web_research;
        let prompt = prompts::article_prompt(request, web_research);
        debug!(
            "[{}] 生成提示词长度: {} 字符, 联网检索: {}",
            self.writer.model_name(),
            prompt.len(),
            web_research
        );

        let content = tokio::select! {
            _ = cancel.cancelled() => return Err(ProviderError::Cancelled),
            result = self.writer.chat(&prompt, Some(prompts::WRITER_SYSTEM)) => result?,
        };

        let sources = if web_research {
            prompts::extract_sources(&content)
        } else {
            Vec::new()
        };
        Ok(GeneratedArticle { content, sources })
    }
}
