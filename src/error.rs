//! 错误类型
//!
//! - `SessionError`：页面会话（浏览器）能力层的错误
//! - `ScrapeError`：抓取流程中需要向上汇报的错误
//! - `ConfigError`：配置加载错误

use std::time::Duration;
use thiserror::Error;

/// 页面会话错误
#[derive(Debug, Error)]
pub enum SessionError {
    /// 元素引用已失效（页面正在重新渲染）
    #[error("元素已失效: {0}")]
    Stale(String),

    /// 等待元素出现超时
    #[error("等待元素超时: {selector} ({timeout:?})")]
    Timeout { selector: String, timeout: Duration },

    /// 元素或选项不存在
    #[error("未找到元素: {0}")]
    NotFound(String),

    /// 脚本执行返回了无法识别的结果
    #[error("执行脚本失败: {0}")]
    Script(String),

    /// 浏览器启动或配置失败
    #[error("浏览器启动失败: {0}")]
    Launch(String),

    /// CDP 协议错误
    #[error("浏览器错误: {0}")]
    Browser(#[from] chromiumoxide::error::CdpError),
}

impl SessionError {
    /// 是否为可重试的失效错误
    pub fn is_stale(&self) -> bool {
        matches!(self, SessionError::Stale(_))
    }
}

impl From<serde_json::Error> for SessionError {
    fn from(err: serde_json::Error) -> Self {
        SessionError::Script(format!("无法解析脚本返回值: {}", err))
    }
}

/// 会话层结果类型
pub type SessionResult<T> = Result<T, SessionError>;

/// 抓取流程错误
#[derive(Debug, Error)]
pub enum ScrapeError {
    /// 课程代码下拉框在限定时间内没有加载出选项
    #[error("课程代码列表加载超时: #{field} ({timeout_secs} 秒)")]
    DiscoveryTimeout { field: String, timeout_secs: u64 },

    /// 课程代码发现阶段的其他失败
    #[error("课程代码发现失败: {0}")]
    Discovery(#[source] SessionError),

    /// 会话层错误
    #[error(transparent)]
    Session(#[from] SessionError),

    /// 工作者内部发生 panic
    #[error("工作者 {worker} 发生 panic: {message}")]
    WorkerPanicked { worker: usize, message: String },

    /// 写入结果文件失败
    #[error("写入文件失败 ({path}): {source}")]
    Output {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

/// 配置错误
#[derive(Debug, Error)]
pub enum ConfigError {
    /// 环境变量解析失败
    #[error("环境变量 {var_name} 解析失败: 值 '{value}' 无法转换为 {expected_type}")]
    EnvVarParseFailed {
        var_name: String,
        value: String,
        expected_type: String,
    },

    /// 配置文件读取失败
    #[error("读取配置文件失败 ({path}): {source}")]
    ReadFailed {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// 配置文件解析失败
    #[error("TOML解析失败 ({path}): {source}")]
    TomlParseFailed {
        path: String,
        #[source]
        source: toml::de::Error,
    },
}
