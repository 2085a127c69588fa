// Data structures for parsed logs

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use serde::Serialize;

/// Half-open byte range of one run within the decoded log text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct RunRange {
    pub start: usize,
    pub end: usize,
    /// The start marker shared its line with text that looked like data.
    pub colocated_data: bool,
}

impl RunRange {
    pub fn len(&self) -> usize {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Column {
    pub name: String,
    pub values: Vec<f64>,
}

impl Column {
    pub fn new(name: String) -> Self {
        Self {
            name,
            values: Vec::new(),
        }
    }
}

/// Numeric table of a run: named columns in header order, plus whatever
/// trailed past the named columns on each data line.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct RunData {
    pub named: Vec<Column>,
    pub unnamed: Vec<Vec<f64>>,
}

impl RunData {
    /// First column carrying `name`.
    pub fn column(&self, name: &str) -> Option<&[f64]> {
        self.named
            .iter()
            .find(|c| c.name == name)
            .map(|c| c.values.as_slice())
    }

    pub fn column_names(&self) -> Vec<&str> {
        self.named.iter().map(|c| c.name.as_str()).collect()
    }

    /// Number of data lines seen.
    pub fn rows(&self) -> usize {
        self.unnamed.len()
    }

    pub fn is_empty(&self) -> bool {
        self.unnamed.is_empty()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct RunRecord {
    pub date: String,
    pub start_time: String,
    pub notes: String,
    pub data: RunData,
}

impl RunRecord {
    pub fn parsed_date(&self) -> Option<NaiveDate> {
        ["%Y/%m/%d", "%Y.%m.%d"]
            .iter()
            .find_map(|fmt| NaiveDate::parse_from_str(&self.date, fmt).ok())
    }

    pub fn parsed_start_time(&self) -> Option<NaiveTime> {
        NaiveTime::parse_from_str(&self.start_time, "%H:%M:%S").ok()
    }

    pub fn started_at(&self) -> Option<NaiveDateTime> {
        Some(self.parsed_date()?.and_time(self.parsed_start_time()?))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Labels {
    pub x: String,
    pub y: String,
    pub title: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VarRef {
    pub name: String,
    pub scale: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SeriesRef {
    pub name: String,
    pub scale: f64,
    pub runs: Vec<usize>,
}

/// One `\p{...}(...)` directive, resolved against its default runs.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlotRequest {
    pub labels: Labels,
    pub x: VarRef,
    pub y: Vec<SeriesRef>,
    /// `<title>.png`, unencoded
    pub artifact: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parsed_metadata() {
        let rec = RunRecord {
            date: "2021.03.04".to_string(),
            start_time: "10:11:12".to_string(),
            ..Default::default()
        };
        let dt = rec.started_at().unwrap();
        assert_eq!(dt.to_string(), "2021-03-04 10:11:12");

        let rec = RunRecord {
            date: "2021/03/04".to_string(),
            ..Default::default()
        };
        assert!(rec.parsed_date().is_some());
        assert!(rec.started_at().is_none());
    }

    #[test]
    fn test_column_lookup_takes_first() {
        let data = RunData {
            named: vec![
                Column { name: "a".into(), values: vec![1.0] },
                Column { name: "a".into(), values: vec![2.0] },
            ],
            unnamed: vec![vec![]],
        };
        assert_eq!(data.column("a"), Some(&[1.0][..]));
        assert_eq!(data.column("b"), None);
        assert_eq!(data.rows(), 1);
    }
}
