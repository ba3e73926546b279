//! 提示词与响应解析
//!
//! 提示词只保留最小可用版本；
//! 解析部分需要容忍模型在 JSON 外面包一层 ```json 代码块。

use regex::Regex;
use std::sync::OnceLock;

use crate::error::{ProviderError, ProviderResult};
use crate::models::BrandResearch;
use crate::services::content_provider::GenerationRequest;

pub const KEYWORD_SYSTEM: &str =
    "You are an SEO strategist. Answer with a JSON array of strings and nothing else.";

pub const BRAND_SYSTEM: &str = "You are a brand analyst. Answer with a JSON object with the keys \"summary\", \"voice\" and \"audience\" and nothing else.";

pub const WRITER_SYSTEM: &str =
    "You are an expert SEO content writer. Write well-structured Markdown articles.";

fn fence_regex() -> &'static Regex {
    static FENCE: OnceLock<Regex> = OnceLock::new();
    FENCE.get_or_init(|| {
        Regex::new(r"(?s)```(?:json)?\s*(.*?)\s*```").expect("valid fence regex")
    })
}

fn url_regex() -> &'static Regex {
    static URL: OnceLock<Regex> = OnceLock::new();
    URL.get_or_init(|| Regex::new(r#"https?://[^\s)\]>"'`]+"#).expect("valid url regex"))
}

pub fn keyword_prompt(topic: &str) -> String {
    format!(
        "List 8 high-intent SEO keywords (mix of short and long tail) for an article about: {}",
        topic
    )
}

pub fn brand_prompt(website: &str) -> String {
    format!(
        "Analyze the brand behind {} and describe what it offers, its tone of voice and its target audience.",
        website
    )
}

/// 构建文章生成提示词
pub fn article_prompt(request: &GenerationRequest, web_research: bool) -> String {
    let article = &request.article;
    let mut prompt = format!(
        "Write a {}-word SEO article in {} with a {} tone about: {}\n",
        article.word_count, article.language, article.tone, request.topic
    );

    if !request.keywords.is_empty() {
        prompt.push_str(&format!(
            "Target keywords: {}\n",
            request.keywords.join(", ")
        ));
    }

    if !request.links.is_empty() {
        prompt.push_str("Link naturally to some of these internal pages:\n");
        for link in &request.links {
            prompt.push_str(&format!("- [{}]({})\n", link.title, link.url));
        }
    }

    if let Some(brand) = &request.brand {
        prompt.push_str(&format!(
            "Brand: {}\nVoice: {}\nAudience: {}\n",
            brand.summary, brand.voice, brand.audience
        ));
    }

    if article.features.include_faq {
        prompt.push_str("End with an FAQ section of 3 to 5 questions.\n");
    }

    if web_research {
        prompt.push_str(
            "Research the topic on the live web first, and finish with a \"Sources\" section listing every URL you used.\n",
        );
    }

    prompt
}

/// 去掉代码块包裹
fn strip_fence(response: &str) -> &str {
    match fence_regex().captures(response).and_then(|cap| cap.get(1)) {
        Some(inner) => inner.as_str(),
        None => response.trim(),
    }
}

/// 解析字符串数组；不是 JSON 时按行 / 逗号拆分
pub fn parse_string_list(response: &str) -> ProviderResult<Vec<String>> {
    let body = strip_fence(response);

    let items: Vec<String> = match serde_json::from_str::<Vec<String>>(body) {
        Ok(list) => list,
        Err(_) => body
            .split(['\n', ','])
            .map(|item| {
                item.trim()
                    .trim_start_matches(|c: char| c == '-' || c == '*' || c.is_ascii_digit() || c == '.')
                    .trim()
                    .trim_matches('"')
                    .to_string()
            })
            .collect(),
    };

    let items: Vec<String> = items
        .into_iter()
        .map(|item| item.trim().to_string())
        .filter(|item| !item.is_empty())
        .collect();

    if items.is_empty() {
        return Err(ProviderError::transient("模型没有返回任何关键词"));
    }
    Ok(items)
}

/// 解析品牌分析 JSON
pub fn parse_brand(response: &str) -> ProviderResult<BrandResearch> {
    let body = strip_fence(response);
    serde_json::from_str::<BrandResearch>(body)
        .map_err(|e| ProviderError::transient(format!("无法解析品牌分析结果: {}", e)))
}

/// 提取正文里引用的链接，去重并保持出现顺序
pub fn extract_sources(content: &str) -> Vec<String> {
    let mut sources: Vec<String> = Vec::new();
    for m in url_regex().find_iter(content) {
        let url = m.as_str().trim_end_matches(['.', ',', ';']).to_string();
        if !sources.contains(&url) {
            sources.push(url);
        }
    }
    sources
}
