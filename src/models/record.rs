use std::cmp::Ordering;
use std::fmt::{self, Display};

/// CSV 表头，顺序与 [`Record::as_row`] 一致
pub const CSV_HEADERS: [&str; 11] = [
    "Kod",
    "Ders",
    "Öğretim Yöntemi",
    "Eğitmen",
    "Gün",
    "Saat",
    "Bina",
    "Kayıtlı",
    "Kontenjan",
    "Bölüm Sınırlaması",
    "CRN",
];

/// 一个待抓取的课程代码（下拉框中的显示文本）
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct WorkItem(String);

impl WorkItem {
    pub fn new(code: impl Into<String>) -> Self {
        Self(code.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for WorkItem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for WorkItem {
    fn from(code: &str) -> Self {
        Self::new(code)
    }
}

impl From<String> for WorkItem {
    fn from(code: String) -> Self {
        Self(code)
    }
}

/// 一条规范化后的课程记录
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Record {
    /// 课程完整代码，如 "AKM 101"
    pub code: String,
    pub title: String,
    pub delivery_mode: String,
    pub instructor: String,
    pub day: String,
    pub time: String,
    /// 楼名 / 教室
    pub location: String,
    pub enrolled: String,
    pub capacity: String,
    pub restriction: String,
    /// CRN
    pub identifier: String,
}

impl Record {
    /// 按输出列顺序返回各字段
    pub fn as_row(&self) -> [&str; 11] {
        [
            &self.code,
            &self.title,
            &self.delivery_mode,
            &self.instructor,
            &self.day,
            &self.time,
            &self.location,
            &self.enrolled,
            &self.capacity,
            &self.restriction,
            &self.identifier,
        ]
    }
}

// 主键 (code, identifier)，其余字段只用于打破平局
impl Ord for Record {
    fn cmp(&self, other: &Self) -> Ordering {
        (&self.code, &self.identifier)
            .cmp(&(&other.code, &other.identifier))
            .then_with(|| self.as_row().cmp(&other.as_row()))
    }
}

impl PartialOrd for Record {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// 合并、排序后的全部记录
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResultSet {
    records: Vec<Record>,
}

impl ResultSet {
    /// 合并各工作者的结果并按 (code, identifier) 排序
    ///
    /// 输出与批次的到达顺序无关。
    pub fn from_batches<I>(batches: I) -> Self
    where
        I: IntoIterator<Item = Vec<Record>>,
    {
        let mut records: Vec<Record> = batches.into_iter().flatten().collect();
        records.sort();
        Self { records }
    }

    pub fn empty() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn records(&self) -> &[Record] {
        &self.records
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Record> {
        self.records.iter()
    }

    pub fn into_records(self) -> Vec<Record> {
        self.records
    }
}

impl<'a> IntoIterator for &'a ResultSet {
    type Item = &'a Record;
    type IntoIter = std::slice::Iter<'a, Record>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(code: &str, crn: &str, title: &str) -> Record {
        Record {
            code: code.to_string(),
            identifier: crn.to_string(),
            title: title.to_string(),
            ..Default::default()
        }
    }

    fn keys(set: &ResultSet) -> Vec<(String, String)> {
        set.iter()
            .map(|r| (r.code.clone(), r.identifier.clone()))
            .collect()
    }

    #[test]
    fn test_sorted_by_code_then_identifier() {
        let set = ResultSet::from_batches(vec![
            vec![record("BLG102", "5", "b")],
            vec![record("AKM101", "11", "a"), record("AKM101", "10", "a")],
        ]);

        assert_eq!(
            keys(&set),
            vec![
                ("AKM101".to_string(), "10".to_string()),
                ("AKM101".to_string(), "11".to_string()),
                ("BLG102".to_string(), "5".to_string()),
            ]
        );
    }

    #[test]
    fn test_arrival_order_does_not_matter() {
        let a = vec![record("AKM101", "10", "x"), record("AKM101", "10", "w")];
        let b = vec![record("BLG102", "5", "y")];
        let c = vec![record("ALM201", "7", "z")];

        let forward = ResultSet::from_batches(vec![a.clone(), b.clone(), c.clone()]);
        let reversed = ResultSet::from_batches(vec![c, b, a]);

        assert_eq!(forward, reversed);
        // 主键相同时按其余字段排序
        assert_eq!(forward.records()[0].title, "w");
    }

    #[test]
    fn test_empty() {
        let set = ResultSet::from_batches(Vec::<Vec<Record>>::new());
        assert!(set.is_empty());
        assert_eq!(set, ResultSet::empty());
    }
}
