//! 并发策略表
//!
//! 默认高并发；已知容易触发服务端限流的服务 / 功能组合强制串行，
//! 并在任务之间插入固定间隔。策略表固定，批次内不可调整。

use std::time::Duration;

use crate::models::{ConcurrencyPolicy, FeatureToggles};
use crate::orchestrator::batch_controller::ControllerSettings;
use crate::services::ProviderProfile;

/// 强制串行规则
struct SerialRule {
    /// 只匹配推理型服务
    reasoning_heavy: bool,
    /// 只在开启联网检索（且服务支持）时匹配
    web_research: bool,
    reason: &'static str,
}

impl SerialRule {
    fn matches(&self, profile: &ProviderProfile, features: &FeatureToggles) -> bool {
        let reasoning_ok = !self.reasoning_heavy || profile.reasoning_heavy;
        let research_ok =
            !self.web_research || (features.web_research && profile.supports_web_research);
        reasoning_ok && research_ok
    }
}

const SERIAL_RULES: &[SerialRule] = &[SerialRule {
    reasoning_heavy: true,
    web_research: true,
    reason: "推理型服务 + 联网检索",
}];

/// 批次执行计划
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExecutionPlan {
    /// worker 数量
    pub concurrency: usize,
    /// 同一 worker 两个任务之间的间隔
    pub inter_task_delay: Duration,
    /// 命中的串行规则
    pub serial_reason: Option<&'static str>,
}

impl ExecutionPlan {
    pub fn is_serial(&self) -> bool {
        self.serial_reason.is_some()
    }
}

/// 返回命中的串行规则说明
pub fn serial_reason(profile: &ProviderProfile, features: &FeatureToggles) -> Option<&'static str> {
    SERIAL_RULES
        .iter()
        .find(|rule| rule.matches(profile, features))
        .map(|rule| rule.reason)
}

/// 计算批次执行计划
///
/// worker 数量不超过题目数量，且至少为 1
pub fn resolve(
    policy: ConcurrencyPolicy,
    profile: &ProviderProfile,
    features: &FeatureToggles,
    settings: &ControllerSettings,
    topic_count: usize,
) -> ExecutionPlan {
    if let Some(reason) = serial_reason(profile, features) {
        return ExecutionPlan {
            concurrency: 1,
            inter_task_delay: settings.serial_delay,
            serial_reason: Some(reason),
        };
    }

    let requested = match policy {
        ConcurrencyPolicy::Auto => settings.default_concurrency,
        ConcurrencyPolicy::Fixed(n) => n,
    };

    ExecutionPlan {
        concurrency: requested.min(topic_count).max(1),
        inter_task_delay: Duration::ZERO,
        serial_reason: None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::ProviderKind;

    fn chat() -> ProviderProfile {
        ProviderProfile {
            kind: ProviderKind::Chat,
            reasoning_heavy: false,
            supports_web_research: false,
        }
    }

    fn reasoning() -> ProviderProfile {
        ProviderProfile {
            kind: ProviderKind::Reasoning,
            reasoning_heavy: true,
            supports_web_research: true,
        }
    }

    fn settings() -> ControllerSettings {
        ControllerSettings {
            default_concurrency: 5,
            serial_delay: Duration::from_secs(2),
        }
    }

    fn web_research() -> FeatureToggles {
        FeatureToggles {
            web_research: true,
            ..Default::default()
        }
    }

    #[test]
    fn auto_uses_default_concurrency() {
        let plan = resolve(
            ConcurrencyPolicy::Auto,
            &chat(),
            &FeatureToggles::default(),
            &settings(),
            20,
        );
        assert_eq!(plan.concurrency, 5);
        assert_eq!(plan.inter_task_delay, Duration::ZERO);
        assert!(!plan.is_serial());
    }

    #[test]
    fn pool_never_exceeds_topic_count() {
        let plan = resolve(
            ConcurrencyPolicy::Fixed(8),
            &chat(),
            &FeatureToggles::default(),
            &settings(),
            3,
        );
        assert_eq!(plan.concurrency, 3);
    }

    #[test]
    fn reasoning_with_web_research_is_forced_serial() {
        let plan = resolve(
            ConcurrencyPolicy::Fixed(4),
            &reasoning(),
            &web_research(),
            &settings(),
            10,
        );
        assert_eq!(plan.concurrency, 1);
        assert_eq!(plan.inter_task_delay, Duration::from_secs(2));
        assert!(plan.is_serial());
    }

    #[test]
    fn reasoning_without_web_research_stays_parallel() {
        let plan = resolve(
            ConcurrencyPolicy::Auto,
            &reasoning(),
            &FeatureToggles::default(),
            &settings(),
            10,
        );
        assert_eq!(plan.concurrency, 5);
    }

    #[test]
    fn chat_with_web_research_toggle_stays_parallel() {
        assert_eq!(serial_reason(&chat(), &web_research()), None);
    }
}
