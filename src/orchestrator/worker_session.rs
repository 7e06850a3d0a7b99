//! 工作者会话 - 编排层
//!
//! ## 职责
//!
//! 一个工作者独占一个页面会话，顺序处理分配给它的全部课程代码。
//!
//! ## 核心功能
//!
//! 1. **打开会话**：每个工作者只打开一次
//! 2. **页面准备**：导航 + 学位层级过滤，只做一次
//! 3. **遍历课程代码**：委托 `ItemFetcher` 处理单个代码
//! 4. **释放会话**：无论成功、准备失败还是 panic，都关闭会话

use crate::config::Config;
use crate::error::ScrapeError;
use crate::infrastructure::{PageSession, SessionFactory};
use crate::models::{Record, WorkItem};
use crate::services::prepare_listing;
use crate::workflow::{ItemCtx, ItemFetcher, ItemOutcome};
use futures::FutureExt;
use std::any::Any;
use std::panic::AssertUnwindSafe;
use tracing::{error, info, warn};

/// 单个分块的处理统计
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct ChunkStats {
    pub fetched: usize,
    pub skipped: usize,
    pub records: usize,
}

/// 工作者会话
pub struct WorkerSession<'a> {
    worker_index: usize,
    chunk: Vec<WorkItem>,
    config: &'a Config,
}

impl<'a> WorkerSession<'a> {
    pub fn new(worker_index: usize, chunk: Vec<WorkItem>, config: &'a Config) -> Self {
        Self {
            worker_index,
            chunk,
            config,
        }
    }

    /// 处理整个分块
    ///
    /// 只有打开会话失败或处理过程中 panic 才返回错误；
    /// 页面准备失败时关闭会话并返回空结果。
    pub async fn run<F: SessionFactory>(self, factory: &F) -> Result<Vec<Record>, ScrapeError> {
        let session = factory.open().await?;

        let driven = AssertUnwindSafe(self.drive(&session)).catch_unwind().await;

        if let Err(e) = session.close().await {
            warn!("[worker-{}] 关闭会话失败: {}", self.worker_index, e);
        }

        driven.map_err(|payload| ScrapeError::WorkerPanicked {
            worker: self.worker_index,
            message: panic_message(payload.as_ref()),
        })
    }

    async fn drive<S>(&self, session: &S) -> Vec<Record>
    where
        S: PageSession + ?Sized,
    {
        let mut records = Vec::new();

        if let Err(e) = prepare_listing(session, self.config).await {
            error!("[worker-{}] ❌ 页面准备失败: {}", self.worker_index, e);
            return records;
        }

        // 创建流程对象（只创建一次，复用）
        let fetcher = ItemFetcher::new(self.config);
        let mut stats = ChunkStats::default();
        let total = self.chunk.len();

        for (index, item) in self.chunk.iter().enumerate() {
            let ctx = ItemCtx::new(self.worker_index, index + 1, total, item.clone());

            match fetcher.fetch(session, &ctx).await {
                ItemOutcome::Fetched(batch) => {
                    stats.fetched += 1;
                    stats.records += batch.len();
                    records.extend(batch);
                }
                ItemOutcome::Skipped { .. } => stats.skipped += 1,
            }
        }

        info!(
            "[worker-{}] 分块统计: 成功 {}, 跳过 {}, 记录 {}",
            self.worker_index, stats.fetched, stats.skipped, stats.records
        );
        records
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "未知 panic".to_string()
    }
}
