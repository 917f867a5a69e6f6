//! Per-request reconciliation context.
//!
//! A [`ReconSession`] owns the two input tables, the config and the filter
//! choice. Replacing a table discards the previous one; nothing outlives the
//! session value.

use serde::Serialize;

use crate::config::{ReconConfig, Side};
use crate::engine;
use crate::error::ReconError;
use crate::filter::{filter_by_code, FilterChoice};
use crate::model::{ReconResult, Table, TableView};
use crate::normalize::normalize_table;
use crate::report::{build_report, mismatch_view, Report};

#[derive(Debug, Clone, Default)]
pub struct ReconSession {
    config: ReconConfig,
    left: Option<Table>,
    right: Option<Table>,
    filter: FilterChoice,
}

/// Outcome of [`ReconSession::run`].
#[derive(Debug)]
pub enum SessionOutcome {
    /// One or both tables not supplied yet. Not an error.
    AwaitingInput(Vec<Side>),
    Complete(Box<ReconOutput>),
}

#[derive(Debug)]
pub struct ReconOutput {
    pub result: ReconResult,
    pub report: Report,
    pub filtered: Option<AppliedFilter>,
}

#[derive(Debug, Clone, Serialize)]
pub struct AppliedFilter {
    pub value: String,
    pub indices: Vec<usize>,
    pub view: TableView,
}

impl ReconSession {
    pub fn new(config: ReconConfig) -> Self {
        Self {
            config,
            left: None,
            right: None,
            filter: FilterChoice::Skip,
        }
    }

    pub fn config(&self) -> &ReconConfig {
        &self.config
    }

    pub fn set_table(&mut self, side: Side, table: Table) {
        match side {
            Side::Left => self.left = Some(table),
            Side::Right => self.right = Some(table),
        }
    }

    pub fn set_filter(&mut self, choice: FilterChoice) {
        self.filter = choice;
    }

    pub fn missing_inputs(&self) -> Vec<Side> {
        let mut missing = Vec::new();
        if self.left.is_none() {
            missing.push(Side::Left);
        }
        if self.right.is_none() {
            missing.push(Side::Right);
        }
        missing
    }

    /// Normalize both tables in place, reconcile, report, and apply the
    /// filter when one was requested with a value.
    pub fn run(&mut self) -> Result<SessionOutcome, ReconError> {
        let missing = self.missing_inputs();
        let (Some(left), Some(right)) = (self.left.as_mut(), self.right.as_mut()) else {
            log::debug!("waiting for input: {missing:?}");
            return Ok(SessionOutcome::AwaitingInput(missing));
        };

        let config = &self.config;
        normalize_table(left, &config.left.label, &config.key_column, &config.compare_column)?;
        normalize_table(right, &config.right.label, &config.key_column, &config.compare_column)?;

        let result = engine::run(config, left, right)?;
        let report = build_report(config, &result);

        let filtered = self.filter.value().map(|value| {
            let mismatches = result.mismatches();
            let subset = filter_by_code(&mismatches, Some(value));
            AppliedFilter {
                value: value.to_string(),
                indices: subset.indices().to_vec(),
                view: mismatch_view(format!("{} = {value}", config.mismatch_sheet()), &subset),
            }
        });

        Ok(SessionOutcome::Complete(Box::new(ReconOutput {
            result,
            report,
            filtered,
        })))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Value;

    fn config() -> ReconConfig {
        ReconConfig {
            key_column: "Invoice".into(),
            compare_column: "CFOP".into(),
            ..ReconConfig::default()
        }
    }

    fn table(rows: &[(&str, &str)]) -> Table {
        Table::from_rows(
            vec![" Invoice ".into(), "CFOP".into()],
            rows.iter()
                .map(|(k, c)| vec![Value::text(*k), Value::text(*c)])
                .collect(),
        )
    }

    #[test]
    fn waits_for_both_tables() {
        let mut session = ReconSession::new(config());
        match session.run().unwrap() {
            SessionOutcome::AwaitingInput(missing) => assert_eq!(missing, [Side::Left, Side::Right]),
            other => panic!("expected AwaitingInput, got {other:?}"),
        }

        session.set_table(Side::Left, table(&[("1", "101")]));
        match session.run().unwrap() {
            SessionOutcome::AwaitingInput(missing) => assert_eq!(missing, [Side::Right]),
            other => panic!("expected AwaitingInput, got {other:?}"),
        }
    }

    #[test]
    fn full_pipeline_with_filter() {
        let mut session = ReconSession::new(config());
        session.set_table(Side::Left, table(&[("1", "101"), ("2", " 202")]));
        session.set_table(Side::Right, table(&[("2", "203"), ("3", "101")]));
        session.set_filter(FilterChoice::Apply(Some("202".into())));

        let SessionOutcome::Complete(output) = session.run().unwrap() else {
            panic!("expected Complete");
        };
        assert_eq!(
            output.report.sentence,
            "1 exclusive to A, 1 exclusive to B, 1 CFOP mismatch."
        );
        let filtered = output.filtered.expect("filter applied");
        assert_eq!(filtered.value, "202");
        assert_eq!(
            filtered.view.rows,
            vec![vec![Value::text("2"), Value::text("202"), Value::text("203")]]
        );
    }

    #[test]
    fn filter_skipped_without_value() {
        let mut session = ReconSession::new(config());
        session.set_table(Side::Left, table(&[("1", "1")]));
        session.set_table(Side::Right, table(&[("1", "2")]));
        session.set_filter(FilterChoice::Apply(None));
        let SessionOutcome::Complete(output) = session.run().unwrap() else {
            panic!("expected Complete");
        };
        assert!(output.filtered.is_none());
        assert_eq!(output.report.summary.mismatches, 1);
    }

    #[test]
    fn missing_column_is_fatal() {
        let mut session = ReconSession::new(config());
        session.set_table(Side::Left, table(&[("1", "1")]));
        session.set_table(
            Side::Right,
            Table::from_rows(vec!["Invoice".into()], vec![vec![Value::text("1")]]),
        );
        let err = session.run().unwrap_err();
        assert_eq!(
            err,
            ReconError::MissingColumn {
                table: "B".into(),
                column: "CFOP".into(),
            }
        );
    }

    #[test]
    fn rerun_after_replacing_table() {
        let mut session = ReconSession::new(config());
        session.set_table(Side::Left, table(&[("1", "1")]));
        session.set_table(Side::Right, table(&[("1", "2")]));
        session.run().unwrap();

        session.set_table(Side::Right, table(&[("1", "1")]));
        let SessionOutcome::Complete(output) = session.run().unwrap() else {
            panic!("expected Complete");
        };
        assert!(output.report.summary.is_reconciled());
    }
}
