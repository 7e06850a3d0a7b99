//! 页面会话能力 - 基础设施层
//!
//! 上层只通过这两个 trait 使用浏览器：
//! - `PageSession`：一个有状态的页面上下文，只暴露"能做什么"
//! - `SessionFactory`：打开一个新的、独立的页面会话
//!
//! 任何操作都可能返回 `SessionError::Stale`，由调用方决定是否重试。

use crate::error::SessionResult;
use async_trait::async_trait;
use std::time::Duration;

/// 下拉框中的一个选项
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectOption {
    pub value: String,
    pub text: String,
}

impl SelectOption {
    pub fn new(value: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            text: text.into(),
        }
    }
}

/// 一个有状态的页面会话
///
/// 会话由打开它的工作者独占并顺序驱动，不在工作者之间共享。
#[async_trait]
pub trait PageSession: Send + Sync {
    /// 打开指定地址
    async fn navigate(&self, url: &str) -> SessionResult<()>;

    /// 等待元素出现，超时返回 `SessionError::Timeout`
    async fn wait_for(&self, selector: &str, timeout: Duration) -> SessionResult<()>;

    /// 直接设置字段的值（不触发事件）
    async fn set_field(&self, field_id: &str, value: &str) -> SessionResult<()>;

    /// 触发字段的 change 事件
    async fn notify_change(&self, field_id: &str) -> SessionResult<()>;

    /// 按显示文本选择下拉框选项
    async fn select_option(&self, field_id: &str, visible_text: &str) -> SessionResult<()>;

    /// 读取下拉框的全部选项（文档顺序）
    async fn read_options(&self, field_id: &str) -> SessionResult<Vec<SelectOption>>;

    /// 点击控件
    async fn click_control(&self, selector: &str) -> SessionResult<()>;

    /// 读取表格：每行的 `td` 文本，按文档顺序
    async fn read_table(&self, selector: &str) -> SessionResult<Vec<Vec<String>>>;

    /// 释放会话。每个会话只应调用一次。
    async fn close(&self) -> SessionResult<()>;
}

/// 页面会话工厂
#[async_trait]
pub trait SessionFactory: Send + Sync + 'static {
    type Session: PageSession + 'static;

    /// 打开一个新的独立会话
    async fn open(&self) -> SessionResult<Self::Session>;

    /// 所有会话关闭后释放工厂自身的资源
    async fn shutdown(&self) {}
}
