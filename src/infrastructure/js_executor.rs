//! JS 执行器 - 基础设施层
//!
//! 持有唯一的 page 资源，只暴露"执行 JS"的能力，
//! 并把 CDP 错误归类为失效 / 其他错误。

use crate::error::{SessionError, SessionResult};
use chromiumoxide::error::CdpError;
use chromiumoxide::Page;
use serde::de::DeserializeOwned;
use serde_json::Value as JsonValue;

/// 页面重新渲染时 CDP 返回的错误信息片段
const STALE_MARKERS: &[&str] = &[
    "detached",
    "No node with given id",
    "Could not find node with given id",
    "Cannot find context with specified id",
    "Execution context was destroyed",
    "Inspected target navigated or closed",
];

/// 将 CDP 错误归类，节点失效、上下文销毁视为 `Stale`
pub fn classify_cdp_error(err: CdpError) -> SessionError {
    let message = err.to_string();
    if STALE_MARKERS.iter().any(|marker| message.contains(marker)) {
        SessionError::Stale(message)
    } else {
        SessionError::Browser(err)
    }
}

/// JS 执行器
///
/// 职责：
/// - 持有唯一的 Page 资源
/// - 暴露 eval() 能力
/// - 不认识课程代码 / 记录
pub struct JsExecutor {
    page: Page,
}

impl JsExecutor {
    pub fn new(page: Page) -> Self {
        Self { page }
    }

    /// 获取 page 的引用（用于导航、点击等非脚本操作）
    pub fn page(&self) -> &Page {
        &self.page
    }

    /// 执行 JS 代码并返回 JSON 结果，`null` / `undefined` 返回 `JsonValue::Null`
    pub async fn eval(&self, js_code: impl Into<String>) -> SessionResult<JsonValue> {
        let result = self
            .page
            .evaluate(js_code.into())
            .await
            .map_err(classify_cdp_error)?;
        Ok(result.value().cloned().unwrap_or(JsonValue::Null))
    }

    /// 执行 JS 代码并反序列化为指定类型
    pub async fn eval_as<T: DeserializeOwned>(&self, js_code: impl Into<String>) -> SessionResult<T> {
        let json_value = self.eval(js_code).await?;
        let typed_value = serde_json::from_value(json_value)?;
        Ok(typed_value)
    }
}

/// 把字符串编码为 JS 字面量
pub fn js_literal(value: &str) -> String {
    // 字符串序列化不会失败
    serde_json::to_string(value).unwrap_or_else(|_| "\"\"".to_string())
}
