//! 课程代码发现 - 业务能力层
//!
//! 用一个独立会话设置学位层级过滤，等待课程代码下拉框加载，
//! 返回全部课程代码（文档顺序）。

use crate::config::Config;
use crate::error::{ScrapeError, SessionError};
use crate::infrastructure::{PageSession, SelectOption, SessionFactory};
use crate::models::WorkItem;
use crate::services::listing::prepare_listing;
use std::time::Instant;
use tokio::time::sleep;
use tracing::{debug, info, warn};

/// 课程代码发现服务
pub struct CodeDiscovery<'a> {
    config: &'a Config,
}

impl<'a> CodeDiscovery<'a> {
    pub fn new(config: &'a Config) -> Self {
        Self { config }
    }

    /// 打开会话、读取全部课程代码，返回前关闭会话
    pub async fn discover<F: SessionFactory>(&self, factory: &F) -> Result<Vec<WorkItem>, ScrapeError> {
        info!("🔍 正在获取课程代码列表...");
        let session = factory.open().await.map_err(ScrapeError::Discovery)?;

        let result = self.discover_with(&session).await;

        if let Err(e) = session.close().await {
            warn!("关闭发现会话失败: {}", e);
        }
        result
    }

    /// 在已打开的会话上执行发现
    pub async fn discover_with<S>(&self, session: &S) -> Result<Vec<WorkItem>, ScrapeError>
    where
        S: PageSession + ?Sized,
    {
        prepare_listing(session, self.config)
            .await
            .map_err(|e| self.discovery_error(e))?;

        self.wait_for_codes(session).await
    }

    /// 等待课程代码下拉框出现，再轮询到出现有效选项为止
    ///
    /// - 下拉框在限定时间内没有出现：`DiscoveryTimeout`
    /// - 下拉框一直只有占位选项：返回空列表
    async fn wait_for_codes<S>(&self, session: &S) -> Result<Vec<WorkItem>, ScrapeError>
    where
        S: PageSession + ?Sized,
    {
        let field = &self.config.selectors.course_code_field;
        let deadline = Instant::now() + self.config.wait_timeout();

        session
            .wait_for(&format!("#{}", field), self.config.wait_timeout())
            .await
            .map_err(|e| self.discovery_error(e))?;

        let mut seen_options = false;
        loop {
            match session.read_options(field).await {
                Ok(options) => {
                    seen_options = true;
                    let codes = valued_codes(&options);
                    if !codes.is_empty() {
                        return Ok(codes);
                    }
                    debug!("#{} 尚未加载 ({} 个选项)", field, options.len());
                }
                Err(e) if e.is_stale() => debug!("#{} 正在重新渲染: {}", field, e),
                Err(e) => return Err(self.discovery_error(e)),
            }

            if Instant::now() >= deadline {
                if seen_options {
                    warn!("#{} 只有占位选项，没有课程代码", field);
                    return Ok(Vec::new());
                }
                return Err(ScrapeError::DiscoveryTimeout {
                    field: field.clone(),
                    timeout_secs: self.config.wait_timeout_secs,
                });
            }
            sleep(self.config.delays.poll_interval()).await;
        }
    }

    fn discovery_error(&self, err: SessionError) -> ScrapeError {
        match err {
            SessionError::Timeout { selector, .. } => ScrapeError::DiscoveryTimeout {
                field: selector.trim_start_matches('#').to_string(),
                timeout_secs: self.config.wait_timeout_secs,
            },
            other => ScrapeError::Discovery(other),
        }
    }
}

/// 有值选项的显示文本（去掉首尾空白），文档顺序
fn valued_codes(options: &[SelectOption]) -> Vec<WorkItem> {
    options
        .iter()
        .filter(|o| !o.value.is_empty())
        .map(|o| o.text.trim())
        .filter(|text| !text.is_empty())
        .map(WorkItem::from)
        .collect()
}
