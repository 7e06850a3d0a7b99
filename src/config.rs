use crate::error::ConfigError;
use crate::models::TableSchema;
use crate::services::RetryPolicy;
use serde::Deserialize;
use std::collections::HashSet;
use std::path::Path;
use std::str::FromStr;
use std::time::Duration;

/// 未指定 `SCRAPE_CONFIG` 时尝试读取的配置文件
pub const DEFAULT_CONFIG_FILE: &str = "scrape.toml";

/// 程序配置
#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct Config {
    /// 并行浏览器会话数量
    pub worker_count: usize,
    /// 需要整体排除的课程代码
    pub excluded_codes: Vec<String>,
    /// 课程表页面地址
    pub site_url: String,
    /// 等待页面元素的超时时间（秒）
    pub wait_timeout_secs: u64,
    /// CSV 输出路径
    pub output_path: String,
    /// 学位层级下拉框要设置的值
    pub program_level: String,
    /// 是否显示详细日志
    pub verbose_logging: bool,
    pub selectors: Selectors,
    pub retry: RetryConfig,
    pub delays: Delays,
    pub browser: BrowserSettings,
    pub schema: TableSchema,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            worker_count: 5,
            excluded_codes: Vec::new(),
            site_url: "https://obs.itu.edu.tr/public/DersProgram".to_string(),
            wait_timeout_secs: 12,
            output_path: "data/program.csv".to_string(),
            program_level: "LS".to_string(),
            verbose_logging: false,
            selectors: Selectors::default(),
            retry: RetryConfig::default(),
            delays: Delays::default(),
            browser: BrowserSettings::default(),
            schema: TableSchema::default(),
        }
    }
}

/// 页面元素定位
#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct Selectors {
    /// 学位层级下拉框 id
    pub program_level_field: String,
    /// 课程代码下拉框 id
    pub course_code_field: String,
    /// "显示" 按钮
    pub submit_button: String,
    /// 结果表格
    pub results_table: String,
}

impl Default for Selectors {
    fn default() -> Self {
        Self {
            program_level_field: "programSeviyeTipiId".to_string(),
            course_code_field: "dersBransKoduId".to_string(),
            submit_button: "button.btn-primary".to_string(),
            results_table: "table".to_string(),
        }
    }
}

/// 失效重试预算
#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct RetryConfig {
    pub attempts: usize,
    /// 选择、点击失败后的等待
    pub select_backoff_ms: u64,
    /// 读表失败后的等待
    pub read_backoff_ms: u64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            attempts: 3,
            select_backoff_ms: 300,
            read_backoff_ms: 400,
        }
    }
}

impl RetryConfig {
    pub fn select_policy(&self) -> RetryPolicy {
        RetryPolicy::new(self.attempts, Duration::from_millis(self.select_backoff_ms))
    }

    pub fn read_policy(&self) -> RetryPolicy {
        RetryPolicy::new(self.attempts, Duration::from_millis(self.read_backoff_ms))
    }
}

/// 固定的页面稳定等待
#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct Delays {
    pub after_navigate_ms: u64,
    pub after_filter_ms: u64,
    pub after_select_ms: u64,
    pub after_submit_ms: u64,
    /// 等待下拉框填充时的轮询间隔
    pub poll_interval_ms: u64,
}

impl Default for Delays {
    fn default() -> Self {
        Self {
            after_navigate_ms: 2000,
            after_filter_ms: 1000,
            after_select_ms: 400,
            after_submit_ms: 400,
            poll_interval_ms: 200,
        }
    }
}

impl Delays {
    pub fn after_navigate(&self) -> Duration {
        Duration::from_millis(self.after_navigate_ms)
    }

    pub fn after_filter(&self) -> Duration {
        Duration::from_millis(self.after_filter_ms)
    }

    pub fn after_select(&self) -> Duration {
        Duration::from_millis(self.after_select_ms)
    }

    pub fn after_submit(&self) -> Duration {
        Duration::from_millis(self.after_submit_ms)
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }
}

/// 浏览器启动参数
#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct BrowserSettings {
    pub headless: bool,
    /// Chrome 可执行文件路径，为空时自动查找
    pub chrome_executable: Option<String>,
    pub window_width: u32,
    pub window_height: u32,
}

impl Default for BrowserSettings {
    fn default() -> Self {
        Self {
            headless: true,
            chrome_executable: None,
            window_width: 1920,
            window_height: 1080,
        }
    }
}

impl Config {
    /// 按 默认值 → 配置文件 → 环境变量 的顺序加载配置
    pub fn load() -> Result<Self, ConfigError> {
        let path = std::env::var("SCRAPE_CONFIG").unwrap_or_else(|_| DEFAULT_CONFIG_FILE.to_string());
        let mut config = if Path::new(&path).exists() {
            Self::from_toml_file(&path)?
        } else {
            Self::default()
        };
        config.apply_overrides(|name| std::env::var(name).ok())?;
        Ok(config)
    }

    /// 只使用默认值和环境变量
    pub fn from_env() -> Result<Self, ConfigError> {
        let mut config = Self::default();
        config.apply_overrides(|name| std::env::var(name).ok())?;
        Ok(config)
    }

    pub fn from_toml_file(path: &str) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::ReadFailed {
            path: path.to_string(),
            source,
        })?;
        Self::from_toml_str(&content, path)
    }

    pub fn from_toml_str(content: &str, path: &str) -> Result<Self, ConfigError> {
        toml::from_str(content).map_err(|source| ConfigError::TomlParseFailed {
            path: path.to_string(),
            source,
        })
    }

    /// 用 `lookup` 提供的变量覆盖当前配置
    pub fn apply_overrides<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(v) = parse_var(&lookup, "WORKER_COUNT", "usize")? {
            self.worker_count = v;
        }
        if let Some(v) = lookup("SITE_URL") {
            self.site_url = v;
        }
        if let Some(v) = parse_var(&lookup, "WAIT_TIMEOUT_SECONDS", "u64")? {
            self.wait_timeout_secs = v;
        }
        if let Some(v) = lookup("EXCLUDED_CODES") {
            self.excluded_codes = parse_code_list(&v);
        }
        if let Some(v) = lookup("OUTPUT_PATH") {
            self.output_path = v;
        }
        if let Some(v) = lookup("CHROME_EXECUTABLE") {
            self.browser.chrome_executable = Some(v).filter(|s| !s.trim().is_empty());
        }
        if let Some(v) = parse_var(&lookup, "HEADLESS", "bool")? {
            self.browser.headless = v;
        }
        if let Some(v) = parse_var(&lookup, "VERBOSE_LOGGING", "bool")? {
            self.verbose_logging = v;
        }
        Ok(())
    }

    /// 排除集合
    pub fn exclusion_set(&self) -> HashSet<String> {
        self.excluded_codes
            .iter()
            .map(|c| c.trim().to_string())
            .filter(|c| !c.is_empty())
            .collect()
    }

    pub fn wait_timeout(&self) -> Duration {
        Duration::from_secs(self.wait_timeout_secs)
    }
}

fn parse_var<F, T>(lookup: &F, var_name: &str, expected_type: &str) -> Result<Option<T>, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
{
    match lookup(var_name) {
        None => Ok(None),
        Some(value) => value
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| ConfigError::EnvVarParseFailed {
                var_name: var_name.to_string(),
                value,
                expected_type: expected_type.to_string(),
            }),
    }
}

/// 解析逗号分隔的课程代码列表
pub fn parse_code_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}
