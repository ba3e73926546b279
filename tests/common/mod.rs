//! 测试用的内容服务
//!
//! 可以按题目配置生成失败、挂起（等待取消）、panic，
//! 并记录每类调用的次数和同时进行中的生成请求数。

#![allow(dead_code)]

use async_trait::async_trait;
use seo_bulk_writer::models::{ArticleConfig, BrandResearch, InternalLink, LinkList};
use seo_bulk_writer::services::{
    ContentProvider, GeneratedArticle, GenerationRequest, ProviderKind, ProviderProfile,
};
use seo_bulk_writer::{ControllerSettings, ProviderError, ProviderResult};
use std::collections::HashSet;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

pub struct MockProvider {
    profile: ProviderProfile,
    delay: Duration,
    fatal_topics: HashSet<String>,
    transient_topics: HashSet<String>,
    hanging_topics: HashSet<String>,
    slow_ignoring_cancel: Option<Duration>,
    panic_topics: HashSet<String>,
    fail_keywords: bool,
    fail_links: bool,
    fail_brand: bool,

    pub keyword_calls: AtomicUsize,
    pub link_calls: AtomicUsize,
    pub brand_calls: AtomicUsize,
    pub generate_calls: AtomicUsize,
    in_flight: AtomicUsize,
    pub max_in_flight: AtomicUsize,
    link_in_flight: AtomicUsize,
    pub max_link_in_flight: AtomicUsize,
    brand_in_flight: AtomicUsize,
    pub max_brand_in_flight: AtomicUsize,
    pub requests: Mutex<Vec<GenerationRequest>>,
}

impl MockProvider {
    pub fn new() -> Self {
        Self {
            profile: ProviderProfile {
                kind: ProviderKind::Chat,
                reasoning_heavy: false,
                supports_web_research: false,
            },
            delay: Duration::from_millis(5),
            fatal_topics: HashSet::new(),
            transient_topics: HashSet::new(),
            hanging_topics: HashSet::new(),
            slow_ignoring_cancel: None,
            panic_topics: HashSet::new(),
            fail_keywords: false,
            fail_links: false,
            fail_brand: false,
            keyword_calls: AtomicUsize::new(0),
            link_calls: AtomicUsize::new(0),
            brand_calls: AtomicUsize::new(0),
            generate_calls: AtomicUsize::new(0),
            in_flight: AtomicUsize::new(0),
            max_in_flight: AtomicUsize::new(0),
            link_in_flight: AtomicUsize::new(0),
            max_link_in_flight: AtomicUsize::new(0),
            brand_in_flight: AtomicUsize::new(0),
            max_brand_in_flight: AtomicUsize::new(0),
            requests: Mutex::new(Vec::new()),
        }
    }

    /// 推理型 + 支持联网检索
    pub fn reasoning(mut self) -> Self {
        self.profile = ProviderProfile {
            kind: ProviderKind::Reasoning,
            reasoning_heavy: true,
            supports_web_research: true,
        };
        self
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    pub fn failing_fatally_on(mut self, topic: &str) -> Self {
        self.fatal_topics.insert(topic.to_string());
        self
    }

    pub fn failing_transiently_on(mut self, topic: &str) -> Self {
        self.transient_topics.insert(topic.to_string());
        self
    }

    /// 生成请求一直挂起，直到取消
    pub fn hanging_on(mut self, topic: &str) -> Self {
        self.hanging_topics.insert(topic.to_string());
        self
    }

    /// 生成请求不理会取消标记，固定耗时后返回成功
    pub fn ignoring_cancel(mut self, duration: Duration) -> Self {
        self.slow_ignoring_cancel = Some(duration);
        self
    }

    pub fn panicking_on(mut self, topic: &str) -> Self {
        self.panic_topics.insert(topic.to_string());
        self
    }

    pub fn failing_keywords(mut self) -> Self {
        self.fail_keywords = true;
        self
    }

    pub fn failing_links(mut self) -> Self {
        self.fail_links = true;
        self
    }

    pub fn failing_brand(mut self) -> Self {
        self.fail_brand = true;
        self
    }

    pub fn count(counter: &AtomicUsize) -> usize {
        counter.load(Ordering::SeqCst)
    }

    pub fn recorded_requests(&self) -> Vec<GenerationRequest> {
        self.requests.lock().unwrap().clone()
    }
}

struct InFlight<'a>(&'a AtomicUsize);

impl<'a> InFlight<'a> {
    /// 进入一次调用并更新最大并发数
    fn enter(counter: &'a AtomicUsize, max: &AtomicUsize) -> Self {
        let now = counter.fetch_add(1, Ordering::SeqCst) + 1;
        max.fetch_max(now, Ordering::SeqCst);
        InFlight(counter)
    }
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}

#[async_trait]
impl ContentProvider for MockProvider {
    fn profile(&self) -> ProviderProfile {
        self.profile
    }

    async fn generate_keywords(&self, topic: &str) -> ProviderResult<Vec<String>> {
        self.keyword_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_keywords {
            return Err(ProviderError::transient("keyword quota exceeded"));
        }
        Ok(vec![format!("{} guide", topic), format!("best {}", topic)])
    }

    async fn scan_links(&self, website: &str, topic: &str) -> ProviderResult<LinkList> {
        self.link_calls.fetch_add(1, Ordering::SeqCst);
        let _guard = InFlight::enter(&self.link_in_flight, &self.max_link_in_flight);
        tokio::time::sleep(self.delay).await;
        if self.fail_links {
            return Err(ProviderError::transient("sitemap unavailable"));
        }
        Ok(vec![
            InternalLink::new(format!("{}/{}", website, topic), topic),
            InternalLink::new(format!("{}/about", website), "About"),
        ])
    }

    async fn analyze_brand(&self, website: &str) -> ProviderResult<BrandResearch> {
        self.brand_calls.fetch_add(1, Ordering::SeqCst);
        let _guard = InFlight::enter(&self.brand_in_flight, &self.max_brand_in_flight);
        tokio::time::sleep(self.delay).await;
        if self.fail_brand {
            return Err(ProviderError::fatal("401 Unauthorized"));
        }
        Ok(BrandResearch {
            summary: format!("brand of {}", website),
            voice: "warm".to_string(),
            audience: "developers".to_string(),
        })
    }

    async fn generate(
        &self,
        request: &GenerationRequest,
        cancel: CancellationToken,
    ) -> ProviderResult<GeneratedArticle> {
        self.generate_calls.fetch_add(1, Ordering::SeqCst);
        self.requests.lock().unwrap().push(request.clone());

        let _guard = InFlight::enter(&self.in_flight, &self.max_in_flight);

        let topic = request.topic.as_str();

        if self.hanging_topics.contains(topic) {
            cancel.cancelled().await;
            return Err(ProviderError::Cancelled);
        }
        if let Some(duration) = self.slow_ignoring_cancel {
            tokio::time::sleep(duration).await;
            return Ok(GeneratedArticle {
                content: format!("{} article", topic),
                sources: Vec::new(),
            });
        }

        tokio::time::sleep(self.delay).await;

        if self.panic_topics.contains(topic) {
            panic!("mock provider blew up on {}", topic);
        }
        if self.fatal_topics.contains(topic) {
            return Err(ProviderError::fatal("Incorrect API key provided"));
        }
        if self.transient_topics.contains(topic) {
            return Err(ProviderError::transient("429 model overloaded"));
        }

        Ok(GeneratedArticle {
            content: format!("{} article", topic),
            sources: vec![format!("https://source.test/{}", topic)],
        })
    }
}

pub fn topics(items: &[&str]) -> Vec<String> {
    items.iter().map(|t| t.to_string()).collect()
}

/// 不做关键词 / 内链优化的文章配置
pub fn plain_article() -> ArticleConfig {
    let mut article = ArticleConfig::default();
    article.features.auto_optimize = false;
    article
}

/// 带网站、开启自动优化和品牌调性的文章配置
pub fn optimized_article() -> ArticleConfig {
    let mut article = ArticleConfig {
        website: Some("https://site.test".to_string()),
        keywords: vec!["seo".to_string()],
        ..Default::default()
    };
    article.features.auto_optimize = true;
    article.features.brand_voice = true;
    article
}

pub fn settings() -> ControllerSettings {
    ControllerSettings {
        default_concurrency: 5,
        serial_delay: Duration::from_millis(10),
    }
}
