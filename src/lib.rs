//! # OBS Schedule Scrape
//!
//! 从 OBS 课程表页面逐个课程代码抓取全部课程信息，合并为一个排好序的 CSV。
//!
//! ## 架构设计
//!
//! ### ① 基础设施层（Infrastructure）
//! - `infrastructure/` - 持有稀缺资源（浏览器会话），只暴露能力
//! - `PageSession` / `SessionFactory` - 页面能力抽象
//! - `ChromeSession` + `JsExecutor` - 基于 chromiumoxide 的实现
//!
//! ### ② 业务能力层（Services）
//! - `services/` - 描述"我能做什么"
//! - `retry` - 元素失效的有界重试
//! - `normalize` - 单元格规范化与记录构建
//! - `CodeDiscovery` - 课程代码发现
//! - `CsvSink` - 写 CSV
//!
//! ### ③ 流程层（Workflow）
//! - `ItemFetcher` - 单个课程代码：选择 → 显示 → 读表
//!
//! ### ④ 编排层（Orchestration）
//! - `orchestrator/batch_processor` - 分块、并行、合并排序
//! - `orchestrator/worker_session` - 单个工作者，独占一个会话

pub mod app;
pub mod browser;
pub mod config;
pub mod error;
pub mod infrastructure;

pub mod models;
pub mod orchestrator;
pub mod services;
pub mod utils;
pub mod workflow;

// 重新导出常用类型
pub use app::App;
pub use browser::ChromeLauncher;
pub use config::Config;
pub use error::{ConfigError, ScrapeError, SessionError, SessionResult};
pub use infrastructure::{PageSession, SelectOption, SessionFactory};
pub use models::{Record, ResultSet, WorkItem};
pub use orchestrator::{Orchestrator, WorkerSession};
pub use services::{CodeDiscovery, CsvSink, SinkOutcome};
pub use workflow::{ItemCtx, ItemFetcher, ItemOutcome};
