//! 对话模型内容服务
//!
//! 快速、便宜，不做联网检索；适合高并发

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

/// 对话模型内容服务
pub struct ChatProvider {
    llm: LlmClient,
    scanner: SiteScanner,
    max_links: usize,
}

impl ChatProvider {
    pub fn new(config: &Config) -> Self {
        let llm = LlmClient::new(
            &config.llm_api_key,
            &config.llm_api_base_url,
            config.llm_model_name.clone(),
        );
        Self {
            llm,
            scanner: SiteScanner::new(),
            max_links: config.max_internal_links,
        }
    }
}

#[async_trait]
impl ContentProvider for ChatProvider {
    fn profile(&self) -> ProviderProfile {
        ProviderProfile {
            kind: ProviderKind::Chat,
            reasoning_heavy: false,
            supports_web_research: false,
        }
    }

    async fn generate_keywords(&self, topic: &str) -> ProviderResult<Vec<String>> {
        let response = self
            .llm
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
            .llm
            .chat(&prompts::brand_prompt(website), Some(prompts::BRAND_SYSTEM))
            .await?;
        prompts::parse_brand(&response)
    }

    async fn generate(
        &self,
        request: &GenerationRequest,
        cancel: CancellationToken,
    ) -> ProviderResult<GeneratedArticle> {
        // 不支持联网检索，忽略 web_research 开关
        let prompt = prompts::article_prompt(request, false);
        debug!("[{}] 生成提示词长度: {} 字符", self.llm.model_name(), prompt.len());

        let content = tokio::select! {
            _ = cancel.cancelled() => return Err(ProviderError::Cancelled),
            result = self.llm.chat(&prompt, Some(prompts::WRITER_SYSTEM)) => result?,
        };

        let sources = prompts::extract_sources(&content);
        Ok(GeneratedArticle { content, sources })
    }
}
