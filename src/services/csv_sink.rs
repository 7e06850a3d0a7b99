//! CSV 输出服务 - 业务能力层
//!
//! 只负责"把排好序的记录写成 CSV"，UTF-8 带 BOM，方便 Excel 直接打开。

use crate::error::ScrapeError;
use crate::models::{ResultSet, CSV_HEADERS};
use std::path::{Path, PathBuf};
use tracing::debug;

const BOM: &str = "\u{feff}";
const SEPARATOR: char = ',';
const LINE_END: &str = "\r\n";

/// 写入结果
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SinkOutcome {
    /// 已写入文件
    Written { path: PathBuf, rows: usize },
    /// 没有任何记录，未写文件
    NoData,
}

/// CSV 输出服务
pub struct CsvSink {
    path: PathBuf,
}

impl CsvSink {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// 写入全部记录；没有记录时不创建文件
    pub async fn write(&self, records: &ResultSet) -> Result<SinkOutcome, ScrapeError> {
        if records.is_empty() {
            return Ok(SinkOutcome::NoData);
        }

        let output_err = |source| ScrapeError::Output {
            path: self.path.display().to_string(),
            source,
        };

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent).await.map_err(output_err)?;
        }

        let content = encode(records);
        debug!("写入 {} 字节到 {}", content.len(), self.path.display());
        tokio::fs::write(&self.path, content).await.map_err(output_err)?;

        Ok(SinkOutcome::Written {
            path: self.path.clone(),
            rows: records.len(),
        })
    }
}

fn needs_quotes(field: &str) -> bool {
    field.contains(SEPARATOR) || field.contains('"') || field.contains('\n') || field.contains('\r')
}

fn push_row<'a>(out: &mut String, row: impl IntoIterator<Item = &'a str>) {
    let mut first = true;
    for cell in row {
        if !first {
            out.push(SEPARATOR);
        }
        first = false;
        if needs_quotes(cell) {
            out.push('"');
            out.push_str(&cell.replace('"', "\"\""));
            out.push('"');
        } else {
            out.push_str(cell);
        }
    }
    out.push_str(LINE_END);
}

/// 编码为 CSV 文本（含 BOM 与表头）
pub fn encode(records: &ResultSet) -> String {
    let mut out = String::from(BOM);
    push_row(&mut out, CSV_HEADERS);
    for record in records {
        push_row(&mut out, record.as_row());
    }
    out
}
