use serde::Serialize;

use crate::config::ReconConfig;
use crate::model::{Partition, ReconResult, ReconSummary, TableView};

/// MIME type of the exported workbook.
pub const XLSX_MIME: &str = "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet";

/// Display views plus the one-line summary.
#[derive(Debug, Clone, Serialize)]
pub struct Report {
    pub summary: ReconSummary,
    pub sentence: String,
    pub left_only: TableView,
    pub right_only: TableView,
    pub mismatches: TableView,
}

/// One workbook sheet: a full partition under a sheet name.
#[derive(Debug, Clone)]
pub struct ExportSheet<'a> {
    pub name: String,
    pub partition: Partition<'a>,
    /// Header of the provenance column; `None` leaves it out.
    pub indicator_column: Option<String>,
}

pub fn build_report(config: &ReconConfig, result: &ReconResult) -> Report {
    let summary = result.summary();
    let layout = result.layout;
    let [left_title, right_title, mismatch_title] = config.sheet_names();

    Report {
        sentence: summary_sentence(config, &summary),
        left_only: result
            .left_only()
            .select(left_title, &[layout.key, layout.left_compare]),
        right_only: result
            .right_only()
            .select(right_title, &[layout.key, layout.right_compare]),
        mismatches: mismatch_view(mismatch_title, &result.mismatches()),
        summary,
    }
}

/// Key plus both comparison columns of a mismatch set (filtered or not).
pub fn mismatch_view(title: impl Into<String>, mismatches: &Partition<'_>) -> TableView {
    let layout = mismatches.layout();
    mismatches.select(title, &[layout.key, layout.left_compare, layout.right_compare])
}

pub fn summary_sentence(config: &ReconConfig, summary: &ReconSummary) -> String {
    format!(
        "{} exclusive to {}, {} exclusive to {}, {} {} mismatch.",
        summary.left_only,
        config.left.label,
        summary.right_only,
        config.right.label,
        summary.mismatches,
        config.compare_label,
    )
}

/// Sheets in workbook order: exclusive-left, exclusive-right, mismatch.
pub fn export_sheets<'a>(config: &ReconConfig, result: &'a ReconResult) -> Vec<ExportSheet<'a>> {
    let indicator = Some(config.output.indicator_column.clone()).filter(|c| !c.is_empty());
    let [left_name, right_name, mismatch_name] = config.sheet_names();
    vec![
        ExportSheet {
            name: left_name,
            partition: result.left_only(),
            indicator_column: indicator.clone(),
        },
        ExportSheet {
            name: right_name,
            partition: result.right_only(),
            indicator_column: indicator.clone(),
        },
        ExportSheet {
            name: mismatch_name,
            partition: result.mismatches(),
            indicator_column: indicator,
        },
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::run;
    use crate::model::{PartitionKind, Table, Value};

    fn scenario() -> (ReconConfig, ReconResult) {
        let config = ReconConfig {
            key_column: "Invoice".into(),
            compare_column: "CFOP".into(),
            ..ReconConfig::default()
        };
        let t = |rows: &[(&str, &str)]| {
            Table::from_rows(
                vec!["Invoice".into(), "CFOP".into(), "Note".into()],
                rows.iter()
                    .map(|(k, c)| vec![Value::text(*k), Value::text(*c), Value::text("n")])
                    .collect(),
            )
        };
        let result = run(&config, &t(&[("1", "101"), ("2", "202")]), &t(&[("2", "203"), ("3", "101")]))
            .unwrap();
        (config, result)
    }

    #[test]
    fn sentence_matches_scenario() {
        let (config, result) = scenario();
        let report = build_report(&config, &result);
        assert_eq!(report.sentence, "1 exclusive to A, 1 exclusive to B, 1 CFOP mismatch.");
    }

    #[test]
    fn views_restricted_to_key_and_codes() {
        let (config, result) = scenario();
        let report = build_report(&config, &result);
        assert_eq!(report.left_only.columns, ["Invoice", "CFOP_A"]);
        assert_eq!(report.left_only.rows, vec![vec![Value::text("1"), Value::text("101")]]);
        assert_eq!(report.right_only.columns, ["Invoice", "CFOP_B"]);
        assert_eq!(report.right_only.rows, vec![vec![Value::text("3"), Value::text("101")]]);
        assert_eq!(report.mismatches.columns, ["Invoice", "CFOP_A", "CFOP_B"]);
        assert_eq!(report.mismatches.title, "CFOP Mismatch");
    }

    #[test]
    fn export_sheets_carry_full_partitions() {
        let (config, result) = scenario();
        let sheets = export_sheets(&config, &result);
        let names: Vec<_> = sheets.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, ["Exclusive A", "Exclusive B", "CFOP Mismatch"]);
        assert_eq!(sheets[2].partition.kind, PartitionKind::Mismatch);
        assert_eq!(
            sheets[0].partition.columns(),
            ["Invoice", "CFOP_A", "Note_A", "CFOP_B", "Note_B"]
        );
        assert_eq!(sheets[0].indicator_column.as_deref(), Some("_merge"));
    }

    #[test]
    fn empty_indicator_disables_column() {
        let (mut config, result) = scenario();
        config.output.indicator_column.clear();
        let sheets = export_sheets(&config, &result);
        assert!(sheets.iter().all(|s| s.indicator_column.is_none()));
    }
}
