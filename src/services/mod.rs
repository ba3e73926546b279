pub mod chat_provider;
pub mod content_provider;
pub mod prompts;
pub mod reasoning_provider;
pub mod research_cache;
pub mod result_writer;

pub use chat_provider::ChatProvider;
pub use content_provider::{
    ContentProvider, GeneratedArticle, GenerationRequest, ProviderKind, ProviderProfile,
};
pub use reasoning_provider::ReasoningProvider;
pub use research_cache::{CacheStats, Lookup, ResearchCache};
pub use result_writer::ResultWriter;

use std::sync::Arc;

use crate::config::Config;

/// 按配置创建内容服务
pub fn build_provider(config: &Config) -> Arc<dyn ContentProvider> {
    match config.provider {
        ProviderKind::Chat => Arc::new(ChatProvider::new(config)),
        ProviderKind::Reasoning => Arc::new(ReasoningProvider::new(config)),
    }
}
