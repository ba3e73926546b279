//! 研究结果
//!
//! 与具体题目无关、整个批次共享的调研产物

use serde::{Deserialize, Serialize};

/// 品牌分析结果
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct BrandResearch {
    /// 品牌概述
    pub summary: String,
    /// 品牌调性
    pub voice: String,
    /// 目标读者
    pub audience: String,
}

/// 站内链接
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InternalLink {
    pub url: String,
    #[serde(default)]
    pub title: String,
}

impl InternalLink {
    pub fn new(url: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            title: title.into(),
        }
    }
}

/// 站内链接列表
pub type LinkList = Vec<InternalLink>;
