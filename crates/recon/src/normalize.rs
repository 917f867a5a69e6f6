use std::collections::{HashMap, HashSet};

use crate::error::ReconError;
use crate::model::{Table, Value};

/// Rename repeated column names: the second `Valor` becomes `Valor.1`, the
/// third `Valor.2`, skipping any name already present. First occurrences
/// keep their name. Returns the names that repeated, in order.
pub fn dedup_column_names(names: &mut [String]) -> Vec<String> {
    let mut taken: HashSet<String> = HashSet::new();
    let mut next_suffix: HashMap<String, usize> = HashMap::new();
    let mut repeated = Vec::new();

    for name in names.iter_mut() {
        if taken.insert(name.clone()) {
            continue;
        }
        let n = next_suffix.entry(name.clone()).or_insert(1);
        let mut candidate = format!("{name}.{n}");
        while taken.contains(&candidate) {
            *n += 1;
            candidate = format!("{name}.{n}");
        }
        *n += 1;
        repeated.push(std::mem::replace(name, candidate.clone()));
        taken.insert(candidate);
    }
    repeated
}

/// Prepare a loaded table for joining, in place.
///
/// Column names lose surrounding whitespace, and names that collide after
/// trimming are renamed with [`dedup_column_names`]. The key and comparison
/// columns must each appear exactly once. Their cells become trimmed text
/// (`Empty` becomes `""`). Running it twice changes nothing the second time.
pub fn normalize_table(
    table: &mut Table,
    table_name: &str,
    key_column: &str,
    compare_column: &str,
) -> Result<(), ReconError> {
    let columns = table.columns_mut();
    for name in columns.iter_mut() {
        let trimmed = name.trim();
        if trimmed.len() != name.len() {
            *name = trimmed.to_string();
        }
    }

    for required in [key_column.trim(), compare_column.trim()] {
        if columns.iter().filter(|c| *c == required).count() > 1 {
            return Err(ReconError::DuplicateColumn {
                table: table_name.into(),
                column: required.into(),
            });
        }
    }
    let renamed = dedup_column_names(columns);
    if !renamed.is_empty() {
        log::debug!("'{table_name}': renamed repeated column(s) {renamed:?}");
    }

    let idx = |name: &str| -> Result<usize, ReconError> {
        table.column_index(name.trim()).ok_or_else(|| ReconError::MissingColumn {
            table: table_name.into(),
            column: name.trim().into(),
        })
    };
    let key_idx = idx(key_column)?;
    let compare_idx = idx(compare_column)?;

    for row in table.rows_mut().iter_mut() {
        for i in [key_idx, compare_idx] {
            if !matches!(&row[i], Value::Text(s) if s.trim().len() == s.len()) {
                row[i] = Value::Text(row[i].trimmed());
            }
        }
    }

    log::debug!(
        "normalized '{table_name}': {} row(s), key column #{key_idx}, compare column #{compare_idx}",
        table.len()
    );
    Ok(())
}
