//! 站点扫描 - 基础设施层
//!
//! 读取网站的 sitemap.xml，列出站内页面地址

use regex::Regex;
use reqwest::StatusCode;
use std::sync::OnceLock;
use std::time::Duration;
use tracing::{debug, warn};

use crate::error::{ProviderError, ProviderResult};
use crate::models::{InternalLink, LinkList};

/// 嵌套 sitemap 最多展开的数量
const MAX_NESTED_SITEMAPS: usize = 5;

fn loc_regex() -> &'static Regex {
    static LOC: OnceLock<Regex> = OnceLock::new();
    LOC.get_or_init(|| Regex::new(r"<loc>\s*([^<\s]+)\s*</loc>").expect("valid loc regex"))
}

/// 站点扫描器
pub struct SiteScanner {
    http: reqwest::Client,
}

impl SiteScanner {
    pub fn new() -> Self {
        let http = match build_http_client() {
            Ok(client) => client,
            Err(e) => {
                warn!("⚠️ 创建 HTTP 客户端失败，改用默认设置（无超时）: {}", e);
                reqwest::Client::new()
            }
        };
        Self { http }
    }

    /// 列出站点所有页面地址
    ///
    /// 遇到 sitemap 索引时展开一层子 sitemap
    pub async fn list_pages(&self, website: &str) -> ProviderResult<Vec<String>> {
        let root = format!("{}/sitemap.xml", website.trim_end_matches('/'));
        let body = self.fetch(&root).await?;

        let mut pages = Vec::new();
        let mut nested = Vec::new();
        for url in extract_locs(&body) {
            if url.ends_with(".xml") {
                nested.push(url);
            } else {
                pages.push(url);
            }
        }

        for sitemap in nested.into_iter().take(MAX_NESTED_SITEMAPS) {
            match self.fetch(&sitemap).await {
                Ok(body) => pages.extend(extract_locs(&body)),
                Err(e) => warn!("读取子 sitemap 失败 {}: {}", sitemap, e),
            }
        }

        debug!("站点 {} 共发现 {} 个页面", website, pages.len());
        Ok(pages)
    }

    async fn fetch(&self, url: &str) -> ProviderResult<String> {
        let response = self.http.get(url).send().await.map_err(|e| {
            if e.is_timeout() || e.is_connect() {
                ProviderError::transient(format!("请求 {} 失败: {}", url, e))
            } else {
                ProviderError::fatal(format!("请求 {} 失败: {}", url, e))
            }
        })?;

        let status = response.status();
        if status == StatusCode::TOO_MANY_REQUESTS || status.is_server_error() {
            return Err(ProviderError::transient(format!("{} 返回 {}", url, status)));
        }
        if !status.is_success() {
            return Err(ProviderError::fatal(format!("{} 返回 {}", url, status)));
        }

        response
            .text()
            .await
            .map_err(|e| ProviderError::transient(format!("读取 {} 响应失败: {}", url, e)))
    }
}

impl Default for SiteScanner {
    fn default() -> Self {
        Self::new()
    }
}

fn build_http_client() -> reqwest::Result<reqwest::Client> {
    reqwest::Client::builder()
        .timeout(Duration::from_secs(20))
        .user_agent("seo_bulk_writer/0.1")
        .build()
}

/// 提取 sitemap 中的 `<loc>` 地址
pub fn extract_locs(xml: &str) -> Vec<String> {
    loc_regex()
        .captures_iter(xml)
        .map(|cap| cap[1].replace("&amp;", "&"))
        .collect()
}

/// 按与题目的相关度挑选内链
///
/// 相关度为题目中长度 ≥ 3 的词在 URL 路径里出现的次数；同分保持原顺序
pub fn rank_links(pages: &[String], topic: &str, max: usize) -> LinkList {
    let words: Vec<String> = topic
        .to_lowercase()
        .split(|c: char| !c.is_alphanumeric())
        .filter(|w| w.chars().count() >= 3)
        .map(str::to_string)
        .collect();

    let mut scored: Vec<(usize, &String)> = pages
        .iter()
        .map(|url| {
            let path = url_path(url).to_lowercase();
            let score = words.iter().filter(|w| path.contains(w.as_str())).count();
            (score, url)
        })
        .collect();
    scored.sort_by(|a, b| b.0.cmp(&a.0));

    scored
        .into_iter()
        .take(max)
        .map(|(_, url)| InternalLink::new(url.clone(), title_from_url(url)))
        .collect()
}

/// 去掉协议和主机名，只保留路径部分
fn url_path(url: &str) -> &str {
    let rest = url.split_once("://").map_or(url, |(_, rest)| rest);
    rest.find('/').map_or("", |pos| &rest[pos..])
}

/// 用最后一段路径生成链接标题
fn title_from_url(url: &str) -> String {
    let slug = url
        .trim_end_matches('/')
        .rsplit('/')
        .next()
        .unwrap_or_default();
    let slug = slug.split('.').next().unwrap_or_default();

    slug.split(['-', '_'])
        .filter(|part| !part.is_empty())
        .map(|part| {
            let mut chars = part.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    const SITEMAP: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<urlset xmlns="http://www.sitemaps.org/schemas/sitemap/0.9">
  <url><loc>https://example.com/</loc></url>
  <url><loc>https://example.com/blog/rust-async-basics</loc></url>
  <url><loc> https://example.com/blog/cooking-pasta.html </loc></url>
  <url><loc>https://example.com/search?q=a&amp;b=c</loc></url>
</urlset>"#;

    #[test]
    fn extracts_loc_entries() {
        let locs = extract_locs(SITEMAP);
        assert_eq!(locs.len(), 4);
        assert_eq!(locs[2], "https://example.com/blog/cooking-pasta.html");
        assert_eq!(locs[3], "https://example.com/search?q=a&b=c");
    }

    #[test]
    fn ranks_matching_pages_first() {
        let pages = extract_locs(SITEMAP);
        let links = rank_links(&pages, "Rust async runtimes", 2);
        assert_eq!(links.len(), 2);
        assert_eq!(links[0].url, "https://example.com/blog/rust-async-basics");
        assert_eq!(links[0].title, "Rust Async Basics");
    }

    #[test]
    fn host_name_does_not_count_towards_relevance() {
        let pages = vec![
            "https://rust.example.com/about".to_string(),
            "https://example.com/blog/tips".to_string(),
        ];
        let links = rank_links(&pages, "rust tips", 2);
        assert_eq!(links[0].url, "https://example.com/blog/tips");
        assert_eq!(url_path("https://rust.example.com"), "");
        assert_eq!(url_path("https://rust.example.com/a/b"), "/a/b");
    }

    #[test]
    fn http_client_builds_with_timeout_and_user_agent() {
        assert!(build_http_client().is_ok());
    }

    #[test]
    fn title_drops_extension() {
        assert_eq!(
            title_from_url("https://example.com/blog/cooking-pasta.html"),
            "Cooking Pasta"
        );
    }
}
