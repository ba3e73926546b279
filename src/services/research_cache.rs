//! 批次研究缓存 - 业务能力层
//!
//! 每个批次一个实例，缓存与题目无关的调研结果（品牌分析、站内链接）。
//!
//! - 单飞：并发的首次调用只会触发一次请求，其余调用等待同一个结果
//! - 单飞请求失败后记下失败标记，之后的调用者不再排队，各自直接请求
//! - 回退请求成功时写入缓存，后续题目直接复用
//! - 批次内不失效：默认同一批次的题目属于同一个网站
//!
//! 站内链接用第一个请求者的题目扫描，之后所有题目原样复用这份列表，
//! 以牺牲单题相关度换取速度。

use std::future::Future;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use tokio::sync::OnceCell;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::error::{ProviderError, ProviderResult};
use crate::models::{ArticleConfig, BrandResearch, LinkList};
use crate::services::content_provider::ContentProvider;

/// 查询结果
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Lookup<T> {
    pub value: T,
    /// 是否直接命中缓存（而不是由本次调用请求得到）
    pub from_cache: bool,
}

/// 缓存统计
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CacheStats {
    pub brand_fetches: usize,
    pub link_fetches: usize,
}

/// 单项缓存：值、单飞失败标记和请求计数
#[derive(Default)]
struct Slot<T> {
    value: OnceCell<T>,
    single_flight_failed: AtomicBool,
    fetches: AtomicUsize,
}

/// 单飞初始化失败的原因
enum InitError {
    Provider(ProviderError),
    /// 前一次单飞请求已失败，改为各自请求
    Skipped,
}

impl<T: Clone> Slot<T> {
    async fn get_or_fetch<F, Fut>(
        &self,
        cancel: &CancellationToken,
        fetch: F,
    ) -> ProviderResult<Lookup<T>>
    where
        F: Fn() -> Fut,
        Fut: Future<Output = ProviderResult<T>>,
    {
        if let Some(value) = self.value.get() {
            return Ok(Lookup {
                value: value.clone(),
                from_cache: true,
            });
        }

        if !self.single_flight_failed.load(Ordering::SeqCst) {
            let fetched = AtomicBool::new(false);
            let fetched_ref = &fetched;
            let fetch_ref = &fetch;
            let init = self
                .value
                .get_or_try_init(|| async move {
                    // 排在失败请求后面的调用者直接放弃等待
                    if self.single_flight_failed.load(Ordering::SeqCst) {
                        return Err(InitError::Skipped);
                    }
                    fetched_ref.store(true, Ordering::SeqCst);
                    match self.fetch_once(cancel, fetch_ref).await {
                        Ok(value) => Ok(value),
                        Err(ProviderError::Cancelled) => {
                            Err(InitError::Provider(ProviderError::Cancelled))
                        }
                        Err(e) => {
                            // 在释放初始化锁之前标记失败
                            self.single_flight_failed.store(true, Ordering::SeqCst);
                            Err(InitError::Provider(e))
                        }
                    }
                })
                .await;

            match init {
                Ok(value) => {
                    return Ok(Lookup {
                        value: value.clone(),
                        from_cache: !fetched.load(Ordering::SeqCst),
                    })
                }
                Err(InitError::Provider(e)) => return Err(e),
                Err(InitError::Skipped) => {}
            }
        }

        // 回退：不持有初始化锁，worker 之间并发请求
        let value = self.fetch_once(cancel, &fetch).await?;
        if self.value.set(value.clone()).is_ok() {
            debug!("回退请求成功，已写入缓存");
        }
        Ok(Lookup {
            value,
            from_cache: false,
        })
    }

    async fn fetch_once<F, Fut>(&self, cancel: &CancellationToken, fetch: &F) -> ProviderResult<T>
    where
        F: Fn() -> Fut,
        Fut: Future<Output = ProviderResult<T>>,
    {
        if cancel.is_cancelled() {
            return Err(ProviderError::Cancelled);
        }
        self.fetches.fetch_add(1, Ordering::SeqCst);
        tokio::select! {
            biased;
            _ = cancel.cancelled() => Err(ProviderError::Cancelled),
            result = fetch() => result,
        }
    }
}

/// 批次研究缓存
#[derive(Default)]
pub struct ResearchCache {
    brand: Slot<BrandResearch>,
    links: Slot<LinkList>,
}

impl ResearchCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// 获取品牌分析，未缓存时请求
    pub async fn get_or_fetch_brand_research(
        &self,
        provider: &dyn ContentProvider,
        website: &str,
        cancel: &CancellationToken,
    ) -> ProviderResult<Lookup<BrandResearch>> {
        self.brand
            .get_or_fetch(cancel, || {
                debug!("品牌分析未缓存，开始请求: {}", website);
                provider.analyze_brand(website)
            })
            .await
    }

    /// 获取站内链接，未缓存时用 `seed_topic` 扫描
    pub async fn get_or_fetch_internal_links(
        &self,
        provider: &dyn ContentProvider,
        website: &str,
        seed_topic: &str,
        cancel: &CancellationToken,
    ) -> ProviderResult<Lookup<LinkList>> {
        self.links
            .get_or_fetch(cancel, || {
                debug!("站内链接未缓存，用题目「{}」扫描: {}", seed_topic, website);
                provider.scan_links(website, seed_topic)
            })
            .await
    }

    /// 批次开始前预取
    ///
    /// 两项请求并发进行；失败只记录日志，由 worker 各自回退
    pub async fn prefetch(
        &self,
        provider: &dyn ContentProvider,
        article: &ArticleConfig,
        seed_topic: &str,
        cancel: &CancellationToken,
    ) {
        let Some(website) = article.website() else {
            return;
        };

        let brand = async {
            if article.wants_brand() {
                Some(self.get_or_fetch_brand_research(provider, website, cancel).await)
            } else {
                None
            }
        };
        let links = async {
            if article.wants_links() {
                Some(
                    self.get_or_fetch_internal_links(provider, website, seed_topic, cancel)
                        .await,
                )
            } else {
                None
            }
        };

        let (brand, links) = tokio::join!(brand, links);

        match brand {
            Some(Ok(_)) => info!("✓ 品牌分析已缓存"),
            Some(Err(ProviderError::Cancelled)) | None => {}
            Some(Err(e)) => warn!("⚠️ 品牌分析预取失败，worker 将各自请求: {}", e),
        }
        match links {
            Some(Ok(lookup)) => info!("✓ 站内链接已缓存，共 {} 条", lookup.value.len()),
            Some(Err(ProviderError::Cancelled)) | None => {}
            Some(Err(e)) => warn!("⚠️ 站内链接预取失败，worker 将各自扫描: {}", e),
        }
    }

    pub fn internal_links(&self) -> Option<&LinkList> {
        self.links.value.get()
    }

    pub fn stats(&self) -> CacheStats {
        CacheStats {
            brand_fetches: self.brand.fetches.load(Ordering::SeqCst),
            link_fetches: self.links.fetches.load(Ordering::SeqCst),
        }
    }
}
