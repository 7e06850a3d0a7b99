//! 课程代码分块

/// 按轮转方式把 `items` 分成 `min(worker_count, items.len())` 块
///
/// 第 `i` 个元素进入第 `i % n` 块，各块大小最多相差 1，块内保持原有顺序。
/// `worker_count` 为 0 时按 1 处理；`items` 为空时返回空列表。
pub fn partition_round_robin<T: Clone>(items: &[T], worker_count: usize) -> Vec<Vec<T>> {
    let n = worker_count.max(1).min(items.len());
    let mut chunks: Vec<Vec<T>> = (0..n)
        .map(|_| Vec::with_capacity(items.len() / n + 1))
        .collect();

    for (idx, item) in items.iter().enumerate() {
        chunks[idx % n].push(item.clone());
    }
    chunks
}
