//! 并行抓取编排器 - 编排层
//!
//! ## 职责
//!
//! 把课程代码分块，交给固定数量的工作者并行抓取，最后合并排序。
//!
//! ## 核心功能
//!
//! 1. **空列表**：直接返回空结果
//! 2. **单工作者**：不分块，直接在当前任务中处理全部代码
//! 3. **分块**：按轮转方式分成 `min(worker_count, 代码数)` 块
//! 4. **并发**：每块一个 `tokio::spawn` 任务，各自独占一个会话
//! 5. **隔离**：单个工作者失败只记录日志，不影响其他工作者
//! 6. **合并**：按到达顺序收集，最后按 (code, identifier) 排序

use crate::config::Config;
use crate::infrastructure::SessionFactory;
use crate::models::{Record, ResultSet, WorkItem};
use crate::orchestrator::partition::partition_round_robin;
use crate::orchestrator::worker_session::WorkerSession;
use crate::utils::logging::{log_partition, log_worker_complete};
use futures::stream::{FuturesUnordered, StreamExt};
use std::sync::Arc;
use tracing::{error, info, warn};

/// 工作者统计
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct WorkerStats {
    pub succeeded: usize,
    pub failed: usize,
}

/// 并行抓取编排器
pub struct Orchestrator<F: SessionFactory> {
    factory: Arc<F>,
    config: Arc<Config>,
}

impl<F: SessionFactory> Orchestrator<F> {
    pub fn new(factory: Arc<F>, config: Arc<Config>) -> Self {
        Self { factory, config }
    }

    /// 抓取全部课程代码并返回排好序的结果
    pub async fn run(&self, items: &[WorkItem], worker_count: usize) -> ResultSet {
        self.run_with_stats(items, worker_count).await.0
    }

    /// 同 [`run`](Self::run)，另外返回工作者统计
    pub async fn run_with_stats(
        &self,
        items: &[WorkItem],
        worker_count: usize,
    ) -> (ResultSet, WorkerStats) {
        let mut stats = WorkerStats::default();

        if items.is_empty() {
            warn!("⚠️ 没有需要抓取的课程代码");
            return (ResultSet::empty(), stats);
        }

        if worker_count <= 1 {
            info!("📋 单工作者模式: {} 个课程代码", items.len());
            let session = WorkerSession::new(0, items.to_vec(), &self.config);
            let batch = match session.run(self.factory.as_ref()).await {
                Ok(batch) => {
                    stats.succeeded += 1;
                    log_worker_complete(0, batch.len(), batch.len());
                    batch
                }
                Err(e) => {
                    stats.failed += 1;
                    error!("[worker-0] ❌ 工作者失败: {}", e);
                    Vec::new()
                }
            };
            return (ResultSet::from_batches([batch]), stats);
        }

        let chunks = partition_round_robin(items, worker_count);
        log_partition(&chunks);

        let mut pending = FuturesUnordered::new();
        for (index, chunk) in chunks.into_iter().enumerate() {
            if chunk.is_empty() {
                continue;
            }
            let factory = Arc::clone(&self.factory);
            let config = Arc::clone(&self.config);

            let handle = tokio::spawn(async move {
                WorkerSession::new(index, chunk, &config)
                    .run(factory.as_ref())
                    .await
            });
            pending.push(async move { (index, handle.await) });
        }

        // 按完成顺序收集
        let mut batches: Vec<Vec<Record>> = Vec::new();
        let mut collected = 0;

        while let Some((index, joined)) = pending.next().await {
            match joined {
                Ok(Ok(batch)) => {
                    stats.succeeded += 1;
                    collected += batch.len();
                    log_worker_complete(index, batch.len(), collected);
                    batches.push(batch);
                }
                Ok(Err(e)) => {
                    stats.failed += 1;
                    error!("[worker-{}] ❌ 工作者失败: {}", index, e);
                }
                Err(e) => {
                    stats.failed += 1;
                    error!("[worker-{}] 任务执行失败: {}", index, e);
                }
            }
        }

        (ResultSet::from_batches(batches), stats)
    }
}
