//! 单元格规范化 - 业务能力层
//!
//! 把结果表格的一行原始单元格转换为 `Record`。

use crate::models::schema::canonical_delivery_mode;
use crate::models::{Record, TableSchema};
use regex::Regex;
use std::collections::HashSet;
use std::sync::LazyLock;

/// 多行单元格各行之间的分隔符
pub const LINE_SEPARATOR: &str = " / ";

static WHITESPACE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s+").expect("valid regex"));

/// 去掉首尾空白、合并连续空白，多行内容用 ` / ` 连接
///
/// 对已经规范化的文本再次调用不会改变结果。
pub fn clean_text(text: &str) -> String {
    text.lines()
        .map(|line| WHITESPACE.replace_all(line.trim(), " "))
        .filter(|line| !line.is_empty())
        .collect::<Vec<_>>()
        .join(LINE_SEPARATOR)
}

/// 由一行单元格构建记录
///
/// - 列数不足 `schema.min_cells` 的行返回 `None`
/// - 课程代码在 `excluded` 中的行返回 `None`
pub fn build_record(
    cells: &[String],
    schema: &TableSchema,
    excluded: &HashSet<String>,
) -> Option<Record> {
    if cells.len() < schema.min_cells {
        return None;
    }
    let cell = |index: usize| cells.get(index).map(|c| clean_text(c));

    let code = cell(schema.code)?;
    if excluded.contains(&code) {
        return None;
    }

    let delivery_mode = cell(schema.delivery_mode)?;
    let location = format!(
        "{}{}{}",
        cell(schema.building)?,
        LINE_SEPARATOR,
        cell(schema.room)?
    );

    Some(Record {
        code,
        title: cell(schema.title)?,
        delivery_mode: canonical_delivery_mode(&delivery_mode).to_string(),
        instructor: cell(schema.instructor)?,
        day: cell(schema.day)?,
        time: cell(schema.time)?,
        location,
        enrolled: cell(schema.enrolled)?,
        capacity: cell(schema.capacity)?,
        restriction: cell(schema.restriction)?,
        identifier: cell(schema.crn)?,
    })
}

/// 跳过表头，构建全部有效记录
pub fn build_records(
    rows: &[Vec<String>],
    schema: &TableSchema,
    excluded: &HashSet<String>,
) -> Vec<Record> {
    rows.iter()
        .skip(1)
        .filter_map(|cells| build_record(cells, schema, excluded))
        .collect()
}
