//! 编排层（Orchestration Layer）
//!
//! ## 模块划分
//!
//! ### `batch_processor` - 并行抓取编排器
//! - 分块（`partition`）
//! - 每块启动一个工作者任务
//! - 隔离工作者失败，合并排序结果
//!
//! ### `worker_session` - 工作者会话
//! - 独占一个页面会话
//! - 页面准备只做一次
//! - 顺序处理分块中的课程代码
//!
//! ## 层次关系
//!
//! ```text
//! batch_processor (处理 Vec<WorkItem>)
//!     ↓
//! worker_session (处理一个分块)
//!     ↓
//! workflow::ItemFetcher (处理单个课程代码)
//!     ↓
//! services (能力层：retry / normalize / listing)
//!     ↓
//! infrastructure (基础设施：PageSession)
//! ```

pub mod batch_processor;
pub mod partition;
pub mod worker_session;

pub use batch_processor::{Orchestrator, WorkerStats};
pub use partition::partition_round_robin;
pub use worker_session::{ChunkStats, WorkerSession};
