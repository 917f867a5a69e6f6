use std::collections::HashSet;

use crate::config::{DuplicateKeyPolicy, ReconConfig, Side};
use crate::error::ReconError;
use crate::join::{outer_join, JoinNames};
use crate::model::{JoinLayout, Provenance, ReconMeta, ReconResult, Table};

/// Reconcile two normalized tables per config.
///
/// Joins on the key column, partitions the joined rows by provenance, and
/// flags `both` rows whose comparison fields differ.
pub fn run(config: &ReconConfig, left: &Table, right: &Table) -> Result<ReconResult, ReconError> {
    let key = config.key_column.trim();
    let compare = config.compare_column.trim();

    for (side, table) in [(Side::Left, left), (Side::Right, right)] {
        let label = &config.side(side).label;
        for column in [key, compare] {
            if table.column_index(column).is_none() {
                return Err(ReconError::MissingColumn {
                    table: label.clone(),
                    column: column.into(),
                });
            }
        }
        if config.duplicate_keys == DuplicateKeyPolicy::Reject {
            check_unique_keys(table, label, key)?;
        }
    }

    let names = JoinNames {
        key: key.into(),
        left_suffix: config.left.suffix(),
        right_suffix: config.right.suffix(),
    };
    let joined = outer_join(left, right, &names)?;

    // The compare column exists on both sides, so it is always suffixed.
    let left_compare_name = format!("{compare}{}", names.left_suffix);
    let right_compare_name = format!("{compare}{}", names.right_suffix);
    let layout = JoinLayout {
        key: 0,
        left_compare: joined
            .column_index(&left_compare_name)
            .ok_or_else(|| ReconError::ColumnCollision(left_compare_name.clone()))?,
        right_compare: joined
            .column_index(&right_compare_name)
            .ok_or_else(|| ReconError::ColumnCollision(right_compare_name.clone()))?,
    };

    let mut left_only = Vec::new();
    let mut right_only = Vec::new();
    let mut both = Vec::new();
    let mut mismatches = Vec::new();

    for (i, row) in joined.rows.iter().enumerate() {
        match row.provenance {
            Provenance::LeftOnly => left_only.push(i),
            Provenance::RightOnly => right_only.push(i),
            Provenance::Both => {
                both.push(i);
                if row.values[layout.left_compare].trimmed()
                    != row.values[layout.right_compare].trimmed()
                {
                    mismatches.push(i);
                }
            }
        }
    }

    log::debug!(
        "partitions: {} left_only, {} right_only, {} both ({} mismatched)",
        left_only.len(),
        right_only.len(),
        both.len(),
        mismatches.len()
    );

    Ok(ReconResult {
        meta: ReconMeta {
            config_name: config.name.clone(),
            engine_version: env!("CARGO_PKG_VERSION").to_string(),
            run_at: chrono::Utc::now().to_rfc3339(),
        },
        joined,
        layout,
        left_only,
        right_only,
        both,
        mismatches,
    })
}

fn check_unique_keys(table: &Table, label: &str, key: &str) -> Result<(), ReconError> {
    let Some(idx) = table.column_index(key) else {
        return Ok(());
    };
    let mut seen = HashSet::new();
    for row in table.rows() {
        let k = row[idx].to_string();
        if !seen.insert(k.clone()) {
            return Err(ReconError::DuplicateKey {
                table: label.into(),
                key: k,
            });
        }
    }
    Ok(())
}
