use std::collections::{HashMap, HashSet};

use crate::error::ReconError;
use crate::model::{JoinedRow, JoinedTable, Provenance, Table, Value};

/// Column naming for the joined table.
#[derive(Debug, Clone)]
pub struct JoinNames {
    pub key: String,
    pub left_suffix: String,
    pub right_suffix: String,
}

/// Output column names for a join of `left` and `right` on `names.key`.
///
/// Layout: key first, then left's other columns, then right's other columns.
/// A non-key name present on both sides gets the side's suffix on each side;
/// names unique to one side pass through unchanged.
pub fn joined_columns(left: &Table, right: &Table, names: &JoinNames) -> Result<Vec<String>, ReconError> {
    let left_names: HashSet<&str> = left.columns().iter().map(String::as_str).collect();
    let right_names: HashSet<&str> = right.columns().iter().map(String::as_str).collect();

    let mut columns = vec![names.key.clone()];
    for c in left.columns().iter().filter(|c| **c != names.key) {
        if right_names.contains(c.as_str()) {
            columns.push(format!("{c}{}", names.left_suffix));
        } else {
            columns.push(c.clone());
        }
    }
    for c in right.columns().iter().filter(|c| **c != names.key) {
        if left_names.contains(c.as_str()) {
            columns.push(format!("{c}{}", names.right_suffix));
        } else {
            columns.push(c.clone());
        }
    }

    let mut seen = HashSet::new();
    for c in &columns {
        if !seen.insert(c.as_str()) {
            return Err(ReconError::ColumnCollision(c.clone()));
        }
    }
    Ok(columns)
}

/// Full outer equi-join on the key column.
///
/// Each left row is paired with every right row sharing its key, in right
/// order; left rows with no partner follow as `LeftOnly`. Right rows never
/// paired are appended last as `RightOnly`, in right order.
pub fn outer_join(left: &Table, right: &Table, names: &JoinNames) -> Result<JoinedTable, ReconError> {
    let columns = joined_columns(left, right, names)?;

    let left_key = left.column_index(&names.key).ok_or_else(|| ReconError::MissingColumn {
        table: "left".into(),
        column: names.key.clone(),
    })?;
    let right_key = right.column_index(&names.key).ok_or_else(|| ReconError::MissingColumn {
        table: "right".into(),
        column: names.key.clone(),
    })?;

    let left_width = left.columns().len() - 1;
    let right_width = right.columns().len() - 1;

    let mut right_index: HashMap<String, Vec<usize>> = HashMap::new();
    for (i, row) in right.rows().iter().enumerate() {
        right_index.entry(row[right_key].to_string()).or_default().push(i);
    }

    let mut right_used = vec![false; right.len()];
    let mut rows = Vec::new();

    for left_row in left.rows() {
        let key = left_row[left_key].to_string();
        match right_index.get(&key) {
            Some(matches) => {
                for &ri in matches {
                    right_used[ri] = true;
                    rows.push(JoinedRow {
                        provenance: Provenance::Both,
                        values: assemble(
                            &left_row[left_key],
                            Some(left_row),
                            left_key,
                            left_width,
                            Some(&right.rows()[ri]),
                            right_key,
                            right_width,
                        ),
                    });
                }
            }
            None => rows.push(JoinedRow {
                provenance: Provenance::LeftOnly,
                values: assemble(
                    &left_row[left_key],
                    Some(left_row),
                    left_key,
                    left_width,
                    None,
                    right_key,
                    right_width,
                ),
            }),
        }
    }

    for (ri, right_row) in right.rows().iter().enumerate() {
        if !right_used[ri] {
            rows.push(JoinedRow {
                provenance: Provenance::RightOnly,
                values: assemble(
                    &right_row[right_key],
                    None,
                    left_key,
                    left_width,
                    Some(right_row),
                    right_key,
                    right_width,
                ),
            });
        }
    }

    log::debug!(
        "outer join on '{}': {} left row(s) x {} right row(s) -> {} joined row(s)",
        names.key,
        left.len(),
        right.len(),
        rows.len()
    );

    Ok(JoinedTable { columns, rows })
}

/// One joined row: key, left's non-key cells, right's non-key cells.
/// An absent side contributes `Empty` cells.
fn assemble(
    key: &Value,
    left: Option<&Vec<Value>>,
    left_key: usize,
    left_width: usize,
    right: Option<&Vec<Value>>,
    right_key: usize,
    right_width: usize,
) -> Vec<Value> {
    let mut values = Vec::with_capacity(1 + left_width + right_width);
    values.push(key.clone());
    push_side(&mut values, left, left_key, left_width);
    push_side(&mut values, right, right_key, right_width);
    values
}

fn push_side(values: &mut Vec<Value>, row: Option<&Vec<Value>>, key: usize, width: usize) {
    match row {
        Some(row) => values.extend(
            row.iter()
                .enumerate()
                .filter(|(i, _)| *i != key)
                .map(|(_, v)| v.clone()),
        ),
        None => values.extend(std::iter::repeat(Value::Empty).take(width)),
    }
}
