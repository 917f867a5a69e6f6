use chrono::{Duration, NaiveDate, NaiveDateTime};
use serde::{Serialize, Serializer};

// ---------------------------------------------------------------------------
// Cells + tables
// ---------------------------------------------------------------------------

/// One cell. Missing or blank cells are `Empty`, never a sentinel string.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Value {
    Empty,
    Text(String),
    Number(f64),
    Bool(bool),
    /// Spreadsheet date/time as an Excel serial (days since 1899-12-30,
    /// fraction = time of day).
    #[serde(serialize_with = "serialize_date")]
    Date(f64),
}

impl Value {
    pub fn text(s: impl Into<String>) -> Self {
        Self::Text(s.into())
    }

    pub fn is_empty(&self) -> bool {
        match self {
            Self::Empty => true,
            Self::Text(s) => s.is_empty(),
            _ => false,
        }
    }

    /// String form with surrounding whitespace stripped.
    pub fn trimmed(&self) -> String {
        match self {
            Self::Text(s) => s.trim().to_string(),
            other => other.to_string(),
        }
    }
}

impl std::fmt::Display for Value {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Empty => Ok(()),
            Self::Text(s) => f.write_str(s),
            Self::Number(n) => f.write_str(&format_number(*n)),
            Self::Bool(b) => f.write_str(if *b { "TRUE" } else { "FALSE" }),
            Self::Date(serial) => match serial_to_datetime(*serial) {
                Some(dt) if serial.fract() == 0.0 => write!(f, "{}", dt.format("%Y-%m-%d")),
                Some(dt) if serial.trunc() == 0.0 => write!(f, "{}", dt.format("%H:%M:%S")),
                Some(dt) => write!(f, "{}", dt.format("%Y-%m-%d %H:%M:%S")),
                None => f.write_str(&format_number(*serial)),
            },
        }
    }
}

fn serialize_date<S: Serializer>(serial: &f64, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.collect_str(&Value::Date(*serial))
}

/// Excel 1900-system serial to a calendar date/time, to the second.
pub fn serial_to_datetime(serial: f64) -> Option<NaiveDateTime> {
    if !serial.is_finite() || serial < 0.0 || serial > 2_958_465.0 {
        return None;
    }
    let epoch = NaiveDate::from_ymd_opt(1899, 12, 30)?.and_hms_opt(0, 0, 0)?;
    let seconds = (serial * 86_400.0).round() as i64;
    epoch.checked_add_signed(Duration::seconds(seconds))
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Self::Text(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Self::Text(s)
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Self::Number(n)
    }
}

/// Integers without decimals (`5102.0` → `5102`), everything else in
/// shortest round-trip form.
pub fn format_number(n: f64) -> String {
    if n.is_finite() && n.fract() == 0.0 && n.abs() < 1e15 {
        format!("{}", n as i64)
    } else {
        format!("{}", n)
    }
}

/// A loaded table: header names plus rows aligned to them.
///
/// Every row has exactly `columns().len()` cells; short rows are padded with
/// [`Value::Empty`] and surplus cells are dropped on insert.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Table {
    columns: Vec<String>,
    rows: Vec<Vec<Value>>,
}

impl Table {
    pub fn new(columns: Vec<String>) -> Self {
        Self {
            columns,
            rows: Vec::new(),
        }
    }

    pub fn from_rows(columns: Vec<String>, rows: Vec<Vec<Value>>) -> Self {
        let mut table = Self::new(columns);
        for row in rows {
            table.push_row(row);
        }
        table
    }

    pub fn push_row(&mut self, mut row: Vec<Value>) {
        row.resize(self.columns.len(), Value::Empty);
        self.rows.push(row);
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    pub fn rows(&self) -> &[Vec<Value>] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub(crate) fn columns_mut(&mut self) -> &mut Vec<String> {
        &mut self.columns
    }

    pub(crate) fn rows_mut(&mut self) -> &mut Vec<Vec<Value>> {
        &mut self.rows
    }
}

// ---------------------------------------------------------------------------
// Join output
// ---------------------------------------------------------------------------

/// Which side(s) of the join a row came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Provenance {
    LeftOnly,
    RightOnly,
    Both,
}

impl Provenance {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::LeftOnly => "left_only",
            Self::RightOnly => "right_only",
            Self::Both => "both",
        }
    }
}

impl std::fmt::Display for Provenance {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct JoinedRow {
    pub provenance: Provenance,
    pub values: Vec<Value>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct JoinedTable {
    pub columns: Vec<String>,
    pub rows: Vec<JoinedRow>,
}

impl JoinedTable {
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }
}

/// Positions of the columns the engine cares about in a [`JoinedTable`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct JoinLayout {
    pub key: usize,
    pub left_compare: usize,
    pub right_compare: usize,
}

// ---------------------------------------------------------------------------
// Partitions
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PartitionKind {
    LeftOnly,
    RightOnly,
    Both,
    Mismatch,
}

impl std::fmt::Display for PartitionKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::LeftOnly => write!(f, "left_only"),
            Self::RightOnly => write!(f, "right_only"),
            Self::Both => write!(f, "both"),
            Self::Mismatch => write!(f, "mismatch"),
        }
    }
}

/// Read-only view over a subset of joined rows.
#[derive(Debug, Clone)]
pub struct Partition<'a> {
    pub kind: PartitionKind,
    table: &'a JoinedTable,
    layout: JoinLayout,
    indices: Vec<usize>,
}

impl<'a> Partition<'a> {
    pub(crate) fn new(
        kind: PartitionKind,
        table: &'a JoinedTable,
        layout: JoinLayout,
        indices: Vec<usize>,
    ) -> Self {
        Self {
            kind,
            table,
            layout,
            indices,
        }
    }

    pub fn len(&self) -> usize {
        self.indices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }

    pub fn columns(&self) -> &'a [String] {
        &self.table.columns
    }

    pub fn layout(&self) -> JoinLayout {
        self.layout
    }

    /// Row positions in the joined table, in partition order.
    pub fn indices(&self) -> &[usize] {
        &self.indices
    }

    pub fn rows(&self) -> impl Iterator<Item = &'a JoinedRow> + '_ {
        let table = self.table;
        self.indices.iter().map(move |&i| &table.rows[i])
    }

    /// Narrow to rows matching `pred`, keeping kind and order.
    pub fn retain_rows(&self, mut pred: impl FnMut(&JoinedRow) -> bool) -> Partition<'a> {
        let indices = self
            .indices
            .iter()
            .copied()
            .filter(|&i| pred(&self.table.rows[i]))
            .collect();
        Partition::new(self.kind, self.table, self.layout, indices)
    }

    /// Project onto the given column positions.
    pub fn select(&self, title: impl Into<String>, cols: &[usize]) -> TableView {
        TableView {
            title: title.into(),
            columns: cols.iter().map(|&c| self.table.columns[c].clone()).collect(),
            rows: self
                .rows()
                .map(|r| cols.iter().map(|&c| r.values[c].clone()).collect())
                .collect(),
        }
    }
}

/// Owned, display-ready projection of a partition.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TableView {
    pub title: String,
    pub columns: Vec<String>,
    pub rows: Vec<Vec<Value>>,
}

impl TableView {
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

// ---------------------------------------------------------------------------
// Summary + Output
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReconSummary {
    pub total_rows: usize,
    pub left_only: usize,
    pub right_only: usize,
    pub both: usize,
    pub mismatches: usize,
}

impl ReconSummary {
    pub fn is_reconciled(&self) -> bool {
        self.left_only == 0 && self.right_only == 0 && self.mismatches == 0
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ReconMeta {
    pub config_name: String,
    pub engine_version: String,
    pub run_at: String,
}

/// Joined table plus the row sets of each partition.
#[derive(Debug, Clone)]
pub struct ReconResult {
    pub meta: ReconMeta,
    pub joined: JoinedTable,
    pub layout: JoinLayout,
    pub(crate) left_only: Vec<usize>,
    pub(crate) right_only: Vec<usize>,
    pub(crate) both: Vec<usize>,
    pub(crate) mismatches: Vec<usize>,
}

impl ReconResult {
    pub fn partition(&self, kind: PartitionKind) -> Partition<'_> {
        let indices = match kind {
            PartitionKind::LeftOnly => &self.left_only,
            PartitionKind::RightOnly => &self.right_only,
            PartitionKind::Both => &self.both,
            PartitionKind::Mismatch => &self.mismatches,
        };
        Partition::new(kind, &self.joined, self.layout, indices.clone())
    }

    pub fn left_only(&self) -> Partition<'_> {
        self.partition(PartitionKind::LeftOnly)
    }

    pub fn right_only(&self) -> Partition<'_> {
        self.partition(PartitionKind::RightOnly)
    }

    pub fn both(&self) -> Partition<'_> {
        self.partition(PartitionKind::Both)
    }

    pub fn mismatches(&self) -> Partition<'_> {
        self.partition(PartitionKind::Mismatch)
    }

    pub fn summary(&self) -> ReconSummary {
        ReconSummary {
            total_rows: self.joined.rows.len(),
            left_only: self.left_only.len(),
            right_only: self.right_only.len(),
            both: self.both.len(),
            mismatches: self.mismatches.len(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn number_rendering() {
        assert_eq!(format_number(5102.0), "5102");
        assert_eq!(format_number(-3.0), "-3");
        assert_eq!(format_number(1.25), "1.25");
        assert_eq!(Value::Number(202.0).to_string(), "202");
        assert_eq!(Value::Bool(true).to_string(), "TRUE");
        assert_eq!(Value::Empty.to_string(), "");
    }

    #[test]
    fn trimmed_strips_text_only() {
        assert_eq!(Value::text("  101 ").trimmed(), "101");
        assert_eq!(Value::Number(7.0).trimmed(), "7");
        assert_eq!(Value::Empty.trimmed(), "");
    }

    #[test]
    fn push_row_pads_and_truncates() {
        let mut t = Table::new(vec!["a".into(), "b".into()]);
        t.push_row(vec![Value::text("1")]);
        t.push_row(vec![Value::text("1"), Value::text("2"), Value::text("3")]);
        assert_eq!(t.rows()[0], vec![Value::text("1"), Value::Empty]);
        assert_eq!(t.rows()[1].len(), 2);
        assert_eq!(t.column_index("b"), Some(1));
        assert_eq!(t.column_index("zzz"), None);
    }

    #[test]
    fn value_serializes_untagged() {
        let json = serde_json::to_string(&vec![
            Value::Empty,
            Value::text("x"),
            Value::Number(1.5),
            Value::Bool(false),
            Value::Date(45366.0),
        ])
        .unwrap();
        assert_eq!(json, r#"[null,"x",1.5,false,"2024-03-15"]"#);
    }

    #[test]
    fn date_serials_render_as_calendar_dates() {
        assert_eq!(Value::Date(45366.0).to_string(), "2024-03-15");
        assert_eq!(Value::Date(45292.5).to_string(), "2024-01-01 12:00:00");
        assert_eq!(Value::Date(0.75).to_string(), "18:00:00");
        assert_eq!(Value::Date(45366.0).trimmed(), "2024-03-15");
        assert_eq!(Value::Date(f64::NAN).to_string(), "NaN");
        assert!(!Value::Date(45366.0).is_empty());
    }
}
