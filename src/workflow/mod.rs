pub mod topic_ctx;
pub mod topic_flow;

pub use topic_ctx::TopicCtx;
pub use topic_flow::{merge_keywords, TopicFlow, TopicOutcome};
