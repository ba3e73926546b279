pub mod article;
pub mod batch;
pub mod loaders;
pub mod research;

pub use article::{ArticleConfig, FeatureToggles, Tone};
pub use batch::{
    BatchConfig, BatchResult, BatchSummary, ConcurrencyPolicy, Progress, QueuedTopic,
    ResultStatus, StrategyMeta,
};
pub use loaders::load_batch_file;
pub use research::{BrandResearch, InternalLink, LinkList};
