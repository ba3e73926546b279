//! 编排层（Orchestration Layer）
//!
//! ## 模块划分
//!
//! ### `batch_controller` - 批次控制器
//! - 批次唯一入口：校验输入、启动、取消
//! - 预取研究缓存
//! - 汇总进度和结果
//!
//! ### `policy` - 并发策略表
//! - 默认高并发，限流敏感组合强制串行
//!
//! ### `task_queue` / `worker_pool` - 队列与 worker 池
//! - 固定数量的 worker 从共享队列领取题目
//! - 出队同步加锁，题目不会被重复领取
//!
//! ### `tracker` - 进度跟踪
//! - 进度计数、结果列表和事件通道
//!
//! ## 层次关系
//!
//! ```text
//! batch_controller (处理 Vec<Topic>)
//!     ↓
//! worker_pool (每个 worker 循环领取题目)
//!     ↓
//! workflow::TopicFlow (处理单个题目)
//!     ↓
//! services (能力层：ContentProvider / ResearchCache)
//!     ↓
//! infrastructure (基础设施：LlmClient / SiteScanner)
//! ```

pub mod batch_controller;
pub mod policy;
pub mod task_queue;
pub mod tracker;
pub mod worker_pool;

pub use batch_controller::{BatchController, BatchHandle, BatchReport, ControllerSettings};
pub use policy::ExecutionPlan;
pub use task_queue::TaskQueue;
pub use tracker::{BatchEvent, ProgressTracker};
pub use worker_pool::WorkerPool;
