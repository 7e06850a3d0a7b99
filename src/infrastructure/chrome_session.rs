//! 基于 chromiumoxide 的页面会话
//!
//! 每个会话独占一个浏览器进程，`close()` 负责关闭浏览器、
//! 停止事件循环并清理临时用户目录。

use crate::browser::remove_profile_dir;
use crate::error::{SessionError, SessionResult};
use crate::infrastructure::js_executor::{classify_cdp_error, js_literal, JsExecutor};
use crate::infrastructure::page_session::{PageSession, SelectOption};
use async_trait::async_trait;
use chromiumoxide::Browser;
use serde::Deserialize;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tokio::time::sleep;
use tracing::{debug, warn};

const WAIT_POLL_INTERVAL: Duration = Duration::from_millis(200);

#[derive(Debug, Deserialize)]
struct RawOption {
    value: String,
    text: String,
}

/// Chrome 页面会话
pub struct ChromeSession {
    browser: Mutex<Browser>,
    handler: JoinHandle<()>,
    executor: JsExecutor,
    profile_dir: PathBuf,
    closed: AtomicBool,
}

impl ChromeSession {
    pub fn new(
        browser: Browser,
        handler: JoinHandle<()>,
        executor: JsExecutor,
        profile_dir: PathBuf,
    ) -> Self {
        Self {
            browser: Mutex::new(browser),
            handler,
            executor,
            profile_dir,
            closed: AtomicBool::new(false),
        }
    }

    /// 执行返回状态字符串的脚本
    async fn eval_status(&self, js_code: String) -> SessionResult<String> {
        self.executor.eval_as::<String>(js_code).await
    }
}

#[async_trait]
impl PageSession for ChromeSession {
    async fn navigate(&self, url: &str) -> SessionResult<()> {
        debug!("导航到: {}", url);
        self.executor
            .page()
            .goto(url)
            .await
            .map_err(classify_cdp_error)?;
        Ok(())
    }

    async fn wait_for(&self, selector: &str, timeout: Duration) -> SessionResult<()> {
        let js_code = format!("document.querySelector({}) !== null", js_literal(selector));
        let started = Instant::now();

        loop {
            match self.executor.eval_as::<bool>(js_code.clone()).await {
                Ok(true) => return Ok(()),
                Ok(false) => {}
                // 页面仍在切换，继续等待
                Err(e) if e.is_stale() => debug!("等待 {} 时页面失效: {}", selector, e),
                Err(e) => return Err(e),
            }

            if started.elapsed() >= timeout {
                return Err(SessionError::Timeout {
                    selector: selector.to_string(),
                    timeout,
                });
            }
            sleep(WAIT_POLL_INTERVAL).await;
        }
    }

    async fn set_field(&self, field_id: &str, value: &str) -> SessionResult<()> {
        let js_code = format!(
            r#"
            (() => {{
                const el = document.getElementById({id});
                if (!el) return 'missing';
                el.value = {value};
                return 'ok';
            }})()
            "#,
            id = js_literal(field_id),
            value = js_literal(value),
        );

        match self.eval_status(js_code).await?.as_str() {
            "ok" => Ok(()),
            _ => Err(SessionError::NotFound(format!("#{}", field_id))),
        }
    }

    async fn notify_change(&self, field_id: &str) -> SessionResult<()> {
        let js_code = format!(
            r#"
            (() => {{
                const el = document.getElementById({id});
                if (!el) return 'missing';
                el.dispatchEvent(new Event('change', {{ bubbles: true }}));
                return 'ok';
            }})()
            "#,
            id = js_literal(field_id),
        );

        match self.eval_status(js_code).await?.as_str() {
            "ok" => Ok(()),
            _ => Err(SessionError::NotFound(format!("#{}", field_id))),
        }
    }

    async fn select_option(&self, field_id: &str, visible_text: &str) -> SessionResult<()> {
        let js_code = format!(
            r#"
            (() => {{
                const el = document.getElementById({id});
                if (!el || !el.isConnected) return 'stale';
                const opt = Array.from(el.options).find(o => o.text.trim() === {text});
                if (!opt) return 'no-option';
                el.value = opt.value;
                el.dispatchEvent(new Event('change', {{ bubbles: true }}));
                return 'ok';
            }})()
            "#,
            id = js_literal(field_id),
            text = js_literal(visible_text),
        );

        match self.eval_status(js_code).await?.as_str() {
            "ok" => Ok(()),
            // wait_for 之后元素又消失，说明下拉框正在重新渲染
            "stale" => Err(SessionError::Stale(format!("#{} 已被重新渲染", field_id))),
            _ => Err(SessionError::NotFound(format!(
                "#{} 中没有选项 '{}'",
                field_id, visible_text
            ))),
        }
    }

    async fn read_options(&self, field_id: &str) -> SessionResult<Vec<SelectOption>> {
        let js_code = format!(
            r#"
            (() => {{
                const el = document.getElementById({id});
                if (!el) return [];
                return Array.from(el.options).map(o => ({{ value: o.value, text: o.text }}));
            }})()
            "#,
            id = js_literal(field_id),
        );

        let options: Vec<RawOption> = self.executor.eval_as(js_code).await?;
        Ok(options
            .into_iter()
            .map(|o| SelectOption::new(o.value, o.text))
            .collect())
    }

    async fn click_control(&self, selector: &str) -> SessionResult<()> {
        let element = self
            .executor
            .page()
            .find_element(selector)
            .await
            .map_err(classify_cdp_error)?;
        element.click().await.map_err(classify_cdp_error)?;
        Ok(())
    }

    async fn read_table(&self, selector: &str) -> SessionResult<Vec<Vec<String>>> {
        let js_code = format!(
            r#"
            (() => {{
                const table = document.querySelector({sel});
                if (!table) return null;
                return Array.from(table.querySelectorAll('tr')).map(
                    row => Array.from(row.querySelectorAll('td')).map(cell => cell.innerText)
                );
            }})()
            "#,
            sel = js_literal(selector),
        );

        let rows: Option<Vec<Vec<String>>> = self.executor.eval_as(js_code).await?;
        rows.ok_or_else(|| SessionError::Stale(format!("表格 {} 已被重新渲染", selector)))
    }

    async fn close(&self) -> SessionResult<()> {
        if self.closed.swap(true, Ordering::SeqCst) {
            return Ok(());
        }

        let mut browser = self.browser.lock().await;
        let result = browser.close().await.map(|_| ());
        if let Err(e) = browser.wait().await {
            warn!("等待浏览器进程退出失败: {}", e);
        }
        self.handler.abort();

        if let Err(e) = remove_profile_dir(&self.profile_dir).await {
            debug!("清理用户目录失败 {}: {}", self.profile_dir.display(), e);
        }

        result.map_err(SessionError::from)
    }
}
