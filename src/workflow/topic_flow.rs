//! 题目处理流程 - 流程层
//!
//! 核心职责：定义"一个题目"的完整处理流程
//!
//! 流程顺序（每一步按配置开关决定是否执行）：
//! 1. 关键词分析：失败时沿用预设关键词
//! 2. 内链发现 / 品牌分析：先查批次缓存，未命中才请求；失败时为空
//! 3. 生成文章：可被取消，取消后不产生结果
//! 4. 返回结果：成功带内容和策略信息，失败把错误信息作为内容
//!
//! 每一步开始前都会检查取消标记。

use std::future::Future;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::error::{ProviderError, ProviderResult};
use crate::models::{ArticleConfig, BatchResult, BrandResearch, LinkList, StrategyMeta};
use crate::services::{ContentProvider, GenerationRequest, ResearchCache};
use crate::utils::truncate_text;
use crate::workflow::topic_ctx::TopicCtx;

/// 题目处理结果
#[derive(Debug, Clone, PartialEq)]
pub enum TopicOutcome {
    /// 生成完成或失败，需要上报
    Finished(BatchResult),
    /// 处理过程中被取消，不上报
    Cancelled,
}

/// 题目处理流程
///
/// - 编排单个题目的各个阶段
/// - 决定阶段失败时吞掉还是上报
/// - 批次内只创建一次，由所有 worker 共享
pub struct TopicFlow {
    provider: Arc<dyn ContentProvider>,
    cache: Arc<ResearchCache>,
    article: ArticleConfig,
    cancel: CancellationToken,
}

impl TopicFlow {
    /// 创建新的题目处理流程
    pub fn new(
        provider: Arc<dyn ContentProvider>,
        cache: Arc<ResearchCache>,
        article: ArticleConfig,
        cancel: CancellationToken,
    ) -> Self {
        Self {
            provider,
            cache,
            article,
            cancel,
        }
    }

    pub async fn run(&self, ctx: &TopicCtx) -> TopicOutcome {
        match self.run_stages(ctx).await {
            Ok(result) => TopicOutcome::Finished(result),
            Err(ProviderError::Cancelled) => {
                info!("{} 🛑 已取消，不记录结果", ctx);
                TopicOutcome::Cancelled
            }
            // run_stages 只会以 Cancelled 结束，其他错误已转换为失败结果
            Err(e) => TopicOutcome::Finished(BatchResult::failed(
                &ctx.topic,
                e.to_string(),
                StrategyMeta::default(),
            )),
        }
    }

    async fn run_stages(&self, ctx: &TopicCtx) -> ProviderResult<BatchResult> {
        info!("{} 开始处理: {}", ctx, truncate_text(ctx.topic(), 60));
        let mut strategy = StrategyMeta::default();

        // ========== 阶段 1: 关键词分析 ==========
        let keywords = self.keyword_stage(ctx).await?;
        strategy.keyword_count = keywords.len();

        // ========== 阶段 2: 内链发现 / 品牌分析 ==========
        let (links, links_from_cache) = self.link_stage(ctx).await?;
        strategy.link_count = links.len();
        strategy.links_from_cache = links_from_cache;

        let brand = self.brand_stage(ctx).await?;
        strategy.brand_applied = brand.is_some();

        // ========== 阶段 3: 生成文章 ==========
        let request = GenerationRequest {
            topic: ctx.topic().to_string(),
            article: self.article.clone(),
            keywords,
            links,
            brand,
        };

        info!("{} ✍️ 正在生成文章...", ctx);
        let generated = self
            .guarded(self.provider.generate(&request, self.cancel.clone()))
            .await;

        // ========== 阶段 4: 整理结果 ==========
        match generated {
            Ok(article) => Ok(BatchResult::completed(
                &ctx.topic,
                article.content,
                article.sources,
                strategy,
            )),
            Err(ProviderError::Cancelled) => Err(ProviderError::Cancelled),
            Err(e) => {
                warn!(
                    "{} ❌ 生成失败 ({}): {}",
                    ctx,
                    if e.is_retriable() { "暂时性" } else { "致命" },
                    e
                );
                Ok(BatchResult::failed(&ctx.topic, e.to_string(), strategy))
            }
        }
    }

    /// 关键词分析
    ///
    /// 只有取消会中断流程，其他失败沿用预设关键词
    async fn keyword_stage(&self, ctx: &TopicCtx) -> ProviderResult<Vec<String>> {
        if !self.article.features.auto_optimize {
            return Ok(self.article.keywords.clone());
        }

        debug!("{} 🔍 关键词分析...", ctx);
        match self
            .guarded(self.provider.generate_keywords(ctx.topic()))
            .await
        {
            Ok(found) => {
                let merged = merge_keywords(&self.article.keywords, found);
                debug!("{} ✓ 关键词 {} 个", ctx, merged.len());
                Ok(merged)
            }
            Err(ProviderError::Cancelled) => Err(ProviderError::Cancelled),
            Err(e) => {
                warn!("{} ⚠️ 关键词分析失败，使用预设关键词: {}", ctx, e);
                Ok(self.article.keywords.clone())
            }
        }
    }

    /// 内链发现
    ///
    /// 返回 (链接列表, 是否来自缓存)
    async fn link_stage(&self, ctx: &TopicCtx) -> ProviderResult<(LinkList, bool)> {
        if !self.article.wants_links() {
            return Ok((Vec::new(), false));
        }
        let Some(website) = self.article.website() else {
            return Ok((Vec::new(), false));
        };
        self.check_cancelled()?;

        match self
            .cache
            .get_or_fetch_internal_links(self.provider.as_ref(), website, ctx.topic(), &self.cancel)
            .await
        {
            Ok(lookup) => {
                debug!(
                    "{} ✓ 内链 {} 条{}",
                    ctx,
                    lookup.value.len(),
                    if lookup.from_cache { "（缓存）" } else { "" }
                );
                Ok((lookup.value, lookup.from_cache))
            }
            Err(ProviderError::Cancelled) => Err(ProviderError::Cancelled),
            Err(e) => {
                warn!("{} ⚠️ 内链发现失败，不插入内链: {}", ctx, e);
                Ok((Vec::new(), false))
            }
        }
    }

    /// 品牌分析
    async fn brand_stage(&self, ctx: &TopicCtx) -> ProviderResult<Option<BrandResearch>> {
        if !self.article.wants_brand() {
            return Ok(None);
        }
        let Some(website) = self.article.website() else {
            return Ok(None);
        };
        self.check_cancelled()?;

        match self
            .cache
            .get_or_fetch_brand_research(self.provider.as_ref(), website, &self.cancel)
            .await
        {
            Ok(lookup) => Ok(Some(lookup.value)),
            Err(ProviderError::Cancelled) => Err(ProviderError::Cancelled),
            Err(e) => {
                warn!("{} ⚠️ 品牌分析失败，按通用语气写作: {}", ctx, e);
                Ok(None)
            }
        }
    }

    fn check_cancelled(&self) -> ProviderResult<()> {
        if self.cancel.is_cancelled() {
            Err(ProviderError::Cancelled)
        } else {
            Ok(())
        }
    }

    /// 在取消标记下执行一次服务调用
    ///
    /// 已取消时不发起调用；调用期间取消则丢弃结果
    async fn guarded<T, F>(&self, call: F) -> ProviderResult<T>
    where
        F: Future<Output = ProviderResult<T>>,
    {
        self.check_cancelled()?;
        tokio::select! {
            biased;
            _ = self.cancel.cancelled() => Err(ProviderError::Cancelled),
            result = call => result,
        }
    }
}

/// 合并关键词：预设在前，去掉空白和大小写重复
pub fn merge_keywords(defaults: &[String], found: Vec<String>) -> Vec<String> {
    let mut merged: Vec<String> = Vec::with_capacity(defaults.len() + found.len());
    for keyword in defaults.iter().cloned().chain(found) {
        let keyword = keyword.trim().to_string();
        if keyword.is_empty() {
            continue;
        }
        if merged
            .iter()
            .any(|existing| existing.eq_ignore_ascii_case(&keyword))
        {
            continue;
        }
        merged.push(keyword);
    }
    merged
}
