//! 集成测试共用的假会话
//!
//! `FakeSession` 按 `Script` 模拟课程表页面：
//! - 选中某个课程代码并点击"显示"后，`read_table` 返回该代码的表格
//! - 可以为每个代码注入若干次元素失效、延迟或 panic

#![allow(dead_code)]

use async_trait::async_trait;
use obs_schedule_scrape::{Config, PageSession, SelectOption, SessionError, SessionFactory, SessionResult};
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// 测试配置：不等待、不退避
pub fn test_config() -> Config {
    let mut config = Config::default();
    config.wait_timeout_secs = 1;
    config.retry.select_backoff_ms = 0;
    config.retry.read_backoff_ms = 0;
    config.delays.after_navigate_ms = 0;
    config.delays.after_filter_ms = 0;
    config.delays.after_select_ms = 0;
    config.delays.after_submit_ms = 0;
    config.delays.poll_interval_ms = 10;
    config
}

/// 一行 14 列的原始单元格
pub fn row(crn: &str, code: &str) -> Vec<String> {
    vec![
        crn,
        code,
        "Ders Adı",
        "Fiziksel (Yüz yüze)",
        "Dr. Öğr. Üyesi",
        "EEB",
        "Pazartesi",
        "08:30/11:29",
        "5103",
        "40",
        "12",
        "-",
        "BLG, BLGE",
        "-",
    ]
    .into_iter()
    .map(str::to_string)
    .collect()
}

/// 表格：第一行为表头（没有 td），其余为数据行
pub fn table(rows: Vec<Vec<String>>) -> Vec<Vec<String>> {
    let mut all = vec![Vec::new()];
    all.extend(rows);
    all
}

/// 页面行为脚本
#[derive(Default)]
pub struct Script {
    /// 课程代码下拉框中的选项
    pub options: Vec<SelectOption>,
    /// 每个课程代码对应的表格
    pub tables: HashMap<String, Vec<Vec<String>>>,
    /// 选择某个代码时先失效的次数
    pub stale_selects: HashMap<String, usize>,
    /// 点击某个代码的"显示"按钮时先失效的次数
    pub stale_clicks: HashMap<String, usize>,
    /// 读取某个代码的表格时先失效的次数
    pub stale_reads: HashMap<String, usize>,
    /// 永远不会出现的选择器，`wait_for` 超时
    pub absent: Vec<String>,
    /// 点击"显示"后的额外延迟
    pub delays: HashMap<String, Duration>,
    /// 选择该代码时 panic
    pub panic_on: Option<String>,
    /// 导航失败
    pub fail_navigate: bool,
    /// 打开会话失败
    pub fail_open: bool,
}

impl Script {
    /// 每个 `(代码, 行)` 生成一个选项和一张表格
    pub fn with_tables(entries: Vec<(&str, Vec<Vec<String>>)>) -> Self {
        let mut script = Script::default();
        script.options.push(SelectOption::new("", "Seçiniz"));
        for (i, (code, rows)) in entries.into_iter().enumerate() {
            script
                .options
                .push(SelectOption::new((i + 1).to_string(), code));
            script.tables.insert(code.to_string(), table(rows));
        }
        script
    }
}

/// 所有会话共享的计数器与剩余失效次数
#[derive(Default)]
pub struct Probe {
    pub opened: AtomicUsize,
    pub closed: AtomicUsize,
    pub select_calls: AtomicUsize,
    pub click_calls: AtomicUsize,
    pub shutdowns: AtomicUsize,
    stale_selects: Mutex<HashMap<String, usize>>,
    stale_clicks: Mutex<HashMap<String, usize>>,
    stale_reads: Mutex<HashMap<String, usize>>,
}

impl Probe {
    pub fn opened(&self) -> usize {
        self.opened.load(Ordering::SeqCst)
    }

    pub fn closed(&self) -> usize {
        self.closed.load(Ordering::SeqCst)
    }

    pub fn select_calls(&self) -> usize {
        self.select_calls.load(Ordering::SeqCst)
    }

    pub fn click_calls(&self) -> usize {
        self.click_calls.load(Ordering::SeqCst)
    }

    pub fn shutdowns(&self) -> usize {
        self.shutdowns.load(Ordering::SeqCst)
    }
}

fn take_stale(counts: &Mutex<HashMap<String, usize>>, code: &str) -> bool {
    let mut counts = counts.lock().unwrap();
    match counts.get_mut(code) {
        Some(remaining) if *remaining > 0 => {
            *remaining -= 1;
            true
        }
        _ => false,
    }
}

pub struct FakeFactory {
    script: Arc<Script>,
    pub probe: Arc<Probe>,
}

impl FakeFactory {
    pub fn new(script: Script) -> Self {
        let probe = Probe {
            stale_selects: Mutex::new(script.stale_selects.clone()),
            stale_clicks: Mutex::new(script.stale_clicks.clone()),
            stale_reads: Mutex::new(script.stale_reads.clone()),
            ..Probe::default()
        };
        Self {
            script: Arc::new(script),
            probe: Arc::new(probe),
        }
    }
}

#[async_trait]
impl SessionFactory for FakeFactory {
    type Session = FakeSession;

    async fn open(&self) -> SessionResult<FakeSession> {
        if self.script.fail_open {
            return Err(SessionError::Launch("fake launch failure".to_string()));
        }
        self.probe.opened.fetch_add(1, Ordering::SeqCst);
        Ok(FakeSession {
            script: Arc::clone(&self.script),
            probe: Arc::clone(&self.probe),
            selected: Mutex::new(None),
            shown: Mutex::new(None),
        })
    }

    async fn shutdown(&self) {
        self.probe.shutdowns.fetch_add(1, Ordering::SeqCst);
    }
}

pub struct FakeSession {
    script: Arc<Script>,
    probe: Arc<Probe>,
    selected: Mutex<Option<String>>,
    shown: Mutex<Option<String>>,
}

#[async_trait]
impl PageSession for FakeSession {
    async fn navigate(&self, url: &str) -> SessionResult<()> {
        if self.script.fail_navigate {
            return Err(SessionError::Script(format!("cannot reach {}", url)));
        }
        Ok(())
    }

    async fn wait_for(&self, selector: &str, timeout: Duration) -> SessionResult<()> {
        if self.script.absent.iter().any(|s| s == selector) {
            return Err(SessionError::Timeout {
                selector: selector.to_string(),
                timeout,
            });
        }
        Ok(())
    }

    async fn set_field(&self, _field_id: &str, _value: &str) -> SessionResult<()> {
        Ok(())
    }

    async fn notify_change(&self, _field_id: &str) -> SessionResult<()> {
        Ok(())
    }

    async fn select_option(&self, _field_id: &str, visible_text: &str) -> SessionResult<()> {
        self.probe.select_calls.fetch_add(1, Ordering::SeqCst);

        if self.script.panic_on.as_deref() == Some(visible_text) {
            panic!("fake session panicked on {}", visible_text);
        }
        if take_stale(&self.probe.stale_selects, visible_text) {
            return Err(SessionError::Stale(format!("select {}", visible_text)));
        }
        if !self.script.tables.contains_key(visible_text) {
            return Err(SessionError::NotFound(visible_text.to_string()));
        }

        *self.selected.lock().unwrap() = Some(visible_text.to_string());
        Ok(())
    }

    async fn read_options(&self, _field_id: &str) -> SessionResult<Vec<SelectOption>> {
        Ok(self.script.options.clone())
    }

    async fn click_control(&self, _selector: &str) -> SessionResult<()> {
        self.probe.click_calls.fetch_add(1, Ordering::SeqCst);

        let selected = self.selected.lock().unwrap().clone();
        if let Some(code) = &selected {
            if take_stale(&self.probe.stale_clicks, code) {
                return Err(SessionError::Stale(format!("click for {}", code)));
            }
        }
        let delay = selected
            .as_ref()
            .and_then(|code| self.script.delays.get(code))
            .copied();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        *self.shown.lock().unwrap() = selected;
        Ok(())
    }

    async fn read_table(&self, _selector: &str) -> SessionResult<Vec<Vec<String>>> {
        let shown = self.shown.lock().unwrap().clone();
        let Some(code) = shown else {
            return Ok(Vec::new());
        };
        if take_stale(&self.probe.stale_reads, &code) {
            return Err(SessionError::Stale(format!("table for {}", code)));
        }
        Ok(self.script.tables.get(&code).cloned().unwrap_or_default())
    }

    async fn close(&self) -> SessionResult<()> {
        self.probe.closed.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}
