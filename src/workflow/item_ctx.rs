//! 课程代码处理上下文
//!
//! 封装"哪个工作者正在处理第几个课程代码"这一信息，只用于日志

use crate::models::WorkItem;
use std::fmt::Display;

/// 单个课程代码的处理上下文
#[derive(Debug, Clone)]
pub struct ItemCtx {
    /// 工作者编号（从 0 开始）
    pub worker_index: usize,

    /// 课程代码在本工作者分块中的序号（从 1 开始）
    pub item_index: usize,

    /// 分块大小
    pub chunk_len: usize,

    pub item: WorkItem,
}

impl ItemCtx {
    pub fn new(worker_index: usize, item_index: usize, chunk_len: usize, item: WorkItem) -> Self {
        Self {
            worker_index,
            item_index,
            chunk_len,
            item,
        }
    }
}

impl Display for ItemCtx {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "[worker-{} {}/{} {}]",
            self.worker_index, self.item_index, self.chunk_len, self.item
        )
    }
}
