//! 文章配置
//!
//! 一个批次内所有题目共享同一份文章配置

use serde::{Deserialize, Serialize};
use std::fmt;

/// 写作语气
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Tone {
    #[default]
    Professional,
    Casual,
    Friendly,
    Authoritative,
    Conversational,
}

impl fmt::Display for Tone {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Tone::Professional => "professional",
            Tone::Casual => "casual",
            Tone::Friendly => "friendly",
            Tone::Authoritative => "authoritative",
            Tone::Conversational => "conversational",
        };
        f.write_str(name)
    }
}

/// 功能开关
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FeatureToggles {
    /// 自动优化：生成前先做关键词分析和内链发现
    pub auto_optimize: bool,
    /// 实时联网检索（推理型服务 + 联网检索时强制串行）
    pub web_research: bool,
    /// 按网站品牌调性写作
    pub brand_voice: bool,
    /// 文末附加 FAQ
    pub include_faq: bool,
}

impl Default for FeatureToggles {
    fn default() -> Self {
        Self {
            auto_optimize: true,
            web_research: false,
            brand_voice: false,
            include_faq: false,
        }
    }
}

/// 文章配置
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ArticleConfig {
    /// 目标字数
    pub word_count: u32,
    pub tone: Tone,
    pub language: String,
    /// 站点地址，用于内链发现和品牌分析
    pub website: Option<String>,
    /// 预设关键词，关键词分析失败时直接使用
    pub keywords: Vec<String>,
    pub features: FeatureToggles,
}

impl Default for ArticleConfig {
    fn default() -> Self {
        Self {
            word_count: 1500,
            tone: Tone::default(),
            language: "English".to_string(),
            website: None,
            keywords: Vec::new(),
            features: FeatureToggles::default(),
        }
    }
}

impl ArticleConfig {
    /// 去掉首尾空白后的站点地址；空字符串视为未配置
    pub fn website(&self) -> Option<&str> {
        self.website
            .as_deref()
            .map(str::trim)
            .filter(|site| !site.is_empty())
    }

    /// 是否需要内链阶段
    pub fn wants_links(&self) -> bool {
        self.features.auto_optimize && self.website().is_some()
    }

    /// 是否需要品牌分析阶段
    pub fn wants_brand(&self) -> bool {
        self.features.brand_voice && self.website().is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_website_counts_as_unset() {
        let config = ArticleConfig {
            website: Some("   ".to_string()),
            ..Default::default()
        };
        assert_eq!(config.website(), None);
        assert!(!config.wants_links());
    }

    #[test]
    fn link_stage_needs_auto_optimize_and_website() {
        let mut config = ArticleConfig {
            website: Some("https://example.com".to_string()),
            ..Default::default()
        };
        assert!(config.wants_links());

        config.features.auto_optimize = false;
        assert!(!config.wants_links());
    }

    #[test]
    fn tone_deserializes_from_lowercase() {
        let config: ArticleConfig = toml::from_str("tone = \"friendly\"\nword_count = 800").unwrap();
        assert_eq!(config.tone, Tone::Friendly);
        assert_eq!(config.word_count, 800);
        assert!(config.features.auto_optimize);
    }
}
