use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use chromiumoxide::{Browser, BrowserConfig, Page};
use futures::StreamExt;
use tokio::task::JoinHandle;
use tokio::time::sleep;
use tracing::{debug, error, info, warn};

use crate::config::BrowserSettings;
use crate::error::{SessionError, SessionResult};
use crate::infrastructure::{ChromeSession, JsExecutor, SessionFactory};

/// 启动浏览器并创建空白页
///
/// 返回的 `JoinHandle` 是后台事件循环，关闭浏览器后需要终止它。
pub async fn launch_browser(
    settings: &BrowserSettings,
    profile_dir: &Path,
) -> SessionResult<(Browser, JoinHandle<()>, Page)> {
    debug!("用户目录: {}", profile_dir.display());

    let mut builder = BrowserConfig::builder()
        .user_data_dir(profile_dir)
        .window_size(settings.window_width, settings.window_height)
        .args(vec![
            "--disable-gpu",           // 无头模式必须禁用 GPU
            "--no-sandbox",            // CI 容器中没有沙盒权限
            "--disable-dev-shm-usage", // 防止共享内存不足
        ]);

    builder = if settings.headless {
        builder.new_headless_mode()
    } else {
        builder.with_head()
    };

    if let Some(executable) = &settings.chrome_executable {
        builder = builder.chrome_executable(Path::new(executable));
    }

    let config = builder.build().map_err(|e| {
        error!("配置浏览器失败: {}", e);
        SessionError::Launch(e)
    })?;

    let (browser, mut handler) = Browser::launch(config).await.map_err(|e| {
        error!("启动浏览器失败: {}", e);
        SessionError::Launch(e.to_string())
    })?;

    // 在后台处理浏览器事件
    let handle = tokio::spawn(async move {
        while let Some(h) = handler.next().await {
            if h.is_err() {
                break;
            }
        }
    });

    // 添加短暂延迟以等待浏览器状态同步
    sleep(tokio::time::Duration::from_millis(300)).await;

    let page = match browser.new_page("about:blank").await {
        Ok(page) => page,
        Err(e) => {
            error!("创建页面失败: {}", e);
            let mut browser = browser;
            if let Err(close_err) = browser.close().await {
                warn!("关闭浏览器失败: {}", close_err);
            }
            if let Err(wait_err) = browser.wait().await {
                warn!("等待浏览器进程退出失败: {}", wait_err);
            }
            handle.abort();
            if let Err(io_err) = remove_profile_dir(profile_dir).await {
                debug!("清理用户目录失败 {}: {}", profile_dir.display(), io_err);
            }
            return Err(SessionError::Launch(e.to_string()));
        }
    };

    Ok((browser, handle, page))
}

/// 删除浏览器用户目录，目录不存在视为成功
pub async fn remove_profile_dir(dir: &Path) -> std::io::Result<()> {
    match tokio::fs::remove_dir_all(dir).await {
        Err(e) if e.kind() != std::io::ErrorKind::NotFound => Err(e),
        _ => Ok(()),
    }
}

/// 每次 `open()` 启动一个独立的无头 Chrome
pub struct ChromeLauncher {
    settings: BrowserSettings,
    profile_root: PathBuf,
    launched: AtomicUsize,
}

impl ChromeLauncher {
    pub fn new(settings: BrowserSettings) -> Self {
        let profile_root =
            std::env::temp_dir().join(format!("obs-schedule-scrape-{}", std::process::id()));
        Self {
            settings,
            profile_root,
            launched: AtomicUsize::new(0),
        }
    }
}

#[async_trait]
impl SessionFactory for ChromeLauncher {
    type Session = ChromeSession;

    async fn open(&self) -> SessionResult<ChromeSession> {
        // 并行启动的浏览器不能共用用户目录
        let n = self.launched.fetch_add(1, Ordering::SeqCst);
        let profile_dir = self.profile_root.join(format!("session-{}", n));

        let (browser, handle, page) = launch_browser(&self.settings, &profile_dir).await?;
        info!("🚀 浏览器会话 #{} 已启动", n);

        Ok(ChromeSession::new(
            browser,
            handle,
            JsExecutor::new(page),
            profile_dir,
        ))
    }

    /// 删除本次运行的用户目录根
    async fn shutdown(&self) {
        if let Err(e) = remove_profile_dir(&self.profile_root).await {
            warn!("清理用户目录失败 {}: {}", self.profile_root.display(), e);
        }
    }
}
