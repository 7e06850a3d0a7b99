//! 单个课程代码的抓取流程 - 流程层
//!
//! 流程顺序：
//! 1. Selecting：在课程代码下拉框中选择该代码
//! 2. Submitting：点击"显示"按钮
//! 3. Reading：读取结果表格并构建记录
//!
//! 每一步遇到元素失效都原地重试（不回到第一步），重试耗尽则放弃该代码。
//! 任何失败都只影响当前代码，不会中断工作者。

use std::collections::HashSet;
use std::fmt::Display;
use std::time::Duration;

use thiserror::Error;
use tokio::time::sleep;
use tracing::{debug, error, info, warn};

use crate::config::{Config, Selectors};
use crate::infrastructure::PageSession;
use crate::models::{Record, TableSchema};
use crate::services::normalize::build_records;
use crate::services::{retry_on_stale, RetryError, RetryPolicy};
use crate::workflow::item_ctx::ItemCtx;

/// 抓取阶段
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchStage {
    Selecting,
    Submitting,
    Reading,
    Done,
}

impl Display for FetchStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            FetchStage::Selecting => "选择课程代码",
            FetchStage::Submitting => "点击显示按钮",
            FetchStage::Reading => "读取表格",
            FetchStage::Done => "完成",
        };
        f.write_str(name)
    }
}

/// 某个阶段失败
#[derive(Debug, Error)]
#[error("{stage}失败: {source}")]
pub struct ItemFetchError {
    pub stage: FetchStage,
    #[source]
    pub source: RetryError,
}

/// 单个课程代码的处理结果
#[derive(Debug)]
pub enum ItemOutcome {
    /// 抓取成功（可能没有记录）
    Fetched(Vec<Record>),
    /// 放弃该代码
    Skipped { stage: FetchStage, reason: String },
}

impl ItemOutcome {
    pub fn into_records(self) -> Vec<Record> {
        match self {
            ItemOutcome::Fetched(records) => records,
            ItemOutcome::Skipped { .. } => Vec::new(),
        }
    }
}

/// 单个课程代码的抓取流程
///
/// - 不持有会话，由调用方传入
/// - 只处理一个课程代码
/// - 创建一次，按顺序复用
pub struct ItemFetcher {
    selectors: Selectors,
    schema: TableSchema,
    excluded: HashSet<String>,
    select_policy: RetryPolicy,
    read_policy: RetryPolicy,
    wait_timeout: Duration,
    after_select: Duration,
    after_submit: Duration,
}

impl ItemFetcher {
    pub fn new(config: &Config) -> Self {
        Self {
            selectors: config.selectors.clone(),
            schema: config.schema.clone(),
            excluded: config.exclusion_set(),
            select_policy: config.retry.select_policy(),
            read_policy: config.retry.read_policy(),
            wait_timeout: config.wait_timeout(),
            after_select: config.delays.after_select(),
            after_submit: config.delays.after_submit(),
        }
    }

    /// 抓取一个课程代码，失败时记录日志并返回 `Skipped`
    pub async fn fetch<S>(&self, session: &S, ctx: &ItemCtx) -> ItemOutcome
    where
        S: PageSession + ?Sized,
    {
        match self.run(session, ctx).await {
            Ok(records) => {
                info!("{} ✓ 已抓取 {} 条记录", ctx, records.len());
                ItemOutcome::Fetched(records)
            }
            Err(e) => {
                if e.source.is_exhausted() {
                    warn!("{} ⚠️ 元素失效，跳过: {}", ctx, e);
                } else {
                    error!("{} ❌ 处理失败，跳过: {}", ctx, e);
                }
                ItemOutcome::Skipped {
                    stage: e.stage,
                    reason: e.to_string(),
                }
            }
        }
    }

    /// 状态机主循环
    pub async fn run<S>(&self, session: &S, ctx: &ItemCtx) -> Result<Vec<Record>, ItemFetchError>
    where
        S: PageSession + ?Sized,
    {
        let mut stage = FetchStage::Selecting;
        let mut records = Vec::new();

        while stage != FetchStage::Done {
            debug!("{} {}", ctx, stage);
            let step = match stage {
                FetchStage::Selecting => self.select(session, ctx).await.map(|_| FetchStage::Submitting),
                FetchStage::Submitting => self.submit(session).await.map(|_| FetchStage::Reading),
                FetchStage::Reading => self.read(session).await.map(|rows| {
                    records = rows;
                    FetchStage::Done
                }),
                FetchStage::Done => Ok(FetchStage::Done),
            };
            stage = step.map_err(|source| ItemFetchError { stage, source })?;
        }

        Ok(records)
    }

    async fn select<S>(&self, session: &S, ctx: &ItemCtx) -> Result<(), RetryError>
    where
        S: PageSession + ?Sized,
    {
        let field = self.selectors.course_code_field.as_str();
        let field_selector = format!("#{}", field);
        let field_selector = field_selector.as_str();
        let code = ctx.item.as_str();
        let timeout = self.wait_timeout;

        // 每次重试都重新定位下拉框
        retry_on_stale(self.select_policy, "选择课程代码", || async move {
            session.wait_for(field_selector, timeout).await?;
            session.select_option(field, code).await
        })
        .await?;

        sleep(self.after_select).await;
        Ok(())
    }

    async fn submit<S>(&self, session: &S) -> Result<(), RetryError>
    where
        S: PageSession + ?Sized,
    {
        let button = self.selectors.submit_button.as_str();

        retry_on_stale(self.select_policy, "点击显示按钮", || async move {
            session.click_control(button).await
        })
        .await?;

        sleep(self.after_submit).await;
        Ok(())
    }

    /// 失效时重新读取整张表格
    async fn read<S>(&self, session: &S) -> Result<Vec<Record>, RetryError>
    where
        S: PageSession + ?Sized,
    {
        let table = self.selectors.results_table.as_str();
        let timeout = self.wait_timeout;

        let rows = retry_on_stale(self.read_policy, "读取表格", || async move {
            session.wait_for(table, timeout).await?;
            session.read_table(table).await
        })
        .await?;

        Ok(build_records(&rows, &self.schema, &self.excluded))
    }
}
