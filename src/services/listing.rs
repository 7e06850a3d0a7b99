//! 课程表页面准备 - 业务能力层
//!
//! 打开页面并设置学位层级过滤，发现阶段和每个工作者都只做一次。

use crate::config::Config;
use crate::error::SessionResult;
use crate::infrastructure::PageSession;
use tokio::time::sleep;
use tracing::debug;

/// 导航到课程表页面并应用学位层级过滤
pub async fn prepare_listing<S>(session: &S, config: &Config) -> SessionResult<()>
where
    S: PageSession + ?Sized,
{
    let field = &config.selectors.program_level_field;

    session.navigate(&config.site_url).await?;
    sleep(config.delays.after_navigate()).await;

    session
        .wait_for(&format!("#{}", field), config.wait_timeout())
        .await?;
    session.set_field(field, &config.program_level).await?;
    session.notify_change(field).await?;
    debug!("已设置 #{} = {}", field, config.program_level);

    sleep(config.delays.after_filter()).await;
    Ok(())
}
