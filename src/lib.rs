//! # SEO Bulk Writer
//!
//! 把一组题目批量生成 SEO 文章的 Rust 应用程序
//!
//! ## 架构设计
//!
//! 本系统采用严格的四层架构：
//!
//! ### ① 基础设施层（Infrastructure）
//! - `infrastructure/` - 持有外部资源，只暴露能力
//! - `LlmClient` - 唯一的 OpenAI 兼容客户端持有者，提供 chat() 能力
//! - `SiteScanner` - 读取 sitemap，列出站内页面
//!
//! ### ② 业务能力层（Services）
//! - `services/` - 描述"我能做什么"，只处理单个题目
//! - `ContentProvider` - 关键词分析 / 内链发现 / 品牌分析 / 生成文章
//! - `ResearchCache` - 批次内共享的调研结果（单飞）
//! - `ResultWriter` - 写结果文件能力
//!
//! ### ③ 流程层（Workflow）
//! - `workflow/` - 定义"一个题目"的完整处理流程
//! - `TopicCtx` - 上下文封装（题目 + worker）
//! - `TopicFlow` - 流程编排（关键词 → 内链 → 生成 → 结果）
//!
//! ### ④ 编排层（Orchestration）
//! - `orchestrator/batch_controller` - 批次入口，管理并发、取消和进度
//! - `orchestrator/worker_pool` - 固定数量的 worker 从共享队列领取题目
//!
//! ## 模块结构

pub mod app;
pub mod config;
pub mod error;
pub mod infrastructure;
pub mod logger;
pub mod models;
pub mod orchestrator;
pub mod services;
pub mod utils;
pub mod workflow;

// 重新导出常用类型
pub use config::Config;
pub use error::{BatchError, ProviderError, ProviderResult};
pub use models::{
    ArticleConfig, BatchConfig, BatchResult, BatchSummary, ConcurrencyPolicy, Progress,
    ResultStatus,
};
pub use orchestrator::{BatchController, BatchEvent, BatchHandle, BatchReport, ControllerSettings};
pub use services::{ContentProvider, GeneratedArticle, GenerationRequest, ResearchCache};
pub use workflow::{TopicCtx, TopicFlow, TopicOutcome};
