//! 基础设施层：持有外部资源（HTTP / LLM 客户端），只暴露能力

pub mod llm_client;
pub mod site_scanner;

pub use llm_client::LlmClient;
pub use site_scanner::SiteScanner;
