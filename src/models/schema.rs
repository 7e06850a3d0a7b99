//! 结果表格的列布局
//!
//! 列下标与最小列数取决于目标页面的实际结构，因此作为配置的一部分，
//! 默认值对应 OBS 课程表页面。

use serde::Deserialize;

/// 结果表格列下标
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct TableSchema {
    /// 少于该列数的行直接丢弃
    pub min_cells: usize,
    pub crn: usize,
    pub code: usize,
    pub title: usize,
    pub delivery_mode: usize,
    pub instructor: usize,
    pub building: usize,
    pub day: usize,
    pub time: usize,
    pub room: usize,
    pub capacity: usize,
    pub enrolled: usize,
    pub restriction: usize,
}

impl Default for TableSchema {
    fn default() -> Self {
        Self {
            min_cells: 14,
            crn: 0,
            code: 1,
            title: 2,
            delivery_mode: 3,
            instructor: 4,
            building: 5,
            day: 6,
            time: 7,
            room: 8,
            capacity: 9,
            enrolled: 10,
            restriction: 12,
        }
    }
}

/// 教学方式原始值 → 简称
static DELIVERY_MODES: phf::Map<&'static str, &'static str> = phf::phf_map! {
    "Fiziksel (Yüz yüze)" => "Fiziksel",
    "Sanal (Çevrimiçi/Online)" => "Online",
};

/// 将教学方式映射为简称，未知值原样返回
pub fn canonical_delivery_mode(raw: &str) -> &str {
    DELIVERY_MODES.get(raw).copied().unwrap_or(raw)
}
