// End-to-end tests for the `taxmatch` binary.
// Run with: cargo test -p taxmatch-cli --test cli_tests

use std::fs;
use std::path::Path;
use std::process::{Command, Output};

use calamine::{open_workbook_auto, Reader};
use tempfile::TempDir;

const LEFT: &str = "Invoice Number,Fiscal Operation Code,Amount\n1,101,10.00\n2,202,20.00\n";
const RIGHT: &str = "Invoice Number;Fiscal Operation Code;Paid\n2;203;yes\n3;101;no\n";

fn taxmatch(dir: &Path) -> Command {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_taxmatch"));
    cmd.current_dir(dir);
    cmd.env_remove("TAXMATCH_CONFIG");
    cmd
}

fn workspace(left: &str, right: &str) -> TempDir {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("a.csv"), left).unwrap();
    fs::write(dir.path().join("b.csv"), right).unwrap();
    dir
}

fn stdout(out: &Output) -> String {
    String::from_utf8_lossy(&out.stdout).into_owned()
}

fn stderr(out: &Output) -> String {
    String::from_utf8_lossy(&out.stderr).into_owned()
}

#[test]
fn differences_exit_1_and_write_default_workbook() {
    let dir = workspace(LEFT, RIGHT);
    let out = taxmatch(dir.path()).args(["run", "a.csv", "b.csv"]).output().unwrap();

    assert_eq!(out.status.code(), Some(1), "stderr: {}", stderr(&out));
    let text = stdout(&out);
    assert!(text.contains("Exclusive A (1)"), "{text}");
    assert!(text.contains("CFOP Mismatch (1)"), "{text}");
    assert!(text.contains("1 exclusive to A, 1 exclusive to B, 1 CFOP mismatch."), "{text}");

    let path = dir.path().join("reconciliation_report.xlsx");
    assert!(path.exists());
    let wb = open_workbook_auto(&path).unwrap();
    assert_eq!(wb.sheet_names(), ["Exclusive A", "Exclusive B", "CFOP Mismatch"]);
}

#[test]
fn identical_tables_exit_0() {
    let dir = workspace(LEFT, LEFT);
    let out = taxmatch(dir.path()).args(["run", "a.csv", "b.csv", "-q"]).output().unwrap();
    assert_eq!(out.status.code(), Some(0), "stderr: {}", stderr(&out));
    assert!(stdout(&out).is_empty());
    assert!(stderr(&out).is_empty());
}

#[test]
fn json_output_with_filter() {
    let dir = workspace(LEFT, RIGHT);
    let out = taxmatch(dir.path())
        .args(["run", "a.csv", "b.csv", "--json", "--filter", " 203 ", "-o", "out.xlsx"])
        .output()
        .unwrap();
    assert_eq!(out.status.code(), Some(1));

    let doc: serde_json::Value = serde_json::from_str(&stdout(&out)).unwrap();
    assert_eq!(doc["reconciled"], false);
    assert_eq!(doc["summary"]["left_only"], 1);
    assert_eq!(doc["summary"]["mismatches"], 1);
    assert_eq!(doc["mismatches"]["columns"], serde_json::json!(["Invoice Number", "Fiscal Operation Code_A", "Fiscal Operation Code_B"]));
    assert_eq!(doc["filter"]["value"], "203");
    assert_eq!(doc["filter"]["view"]["rows"], serde_json::json!([["2", "202", "203"]]));
    assert_eq!(doc["workbook"], "out.xlsx");
    assert!(dir.path().join("out.xlsx").exists());
}

#[test]
fn unknown_filter_value_is_empty_not_error() {
    let dir = workspace(LEFT, RIGHT);
    let out = taxmatch(dir.path())
        .args(["run", "a.csv", "b.csv", "--json", "--filter", "999"])
        .output()
        .unwrap();
    assert_eq!(out.status.code(), Some(1));
    let doc: serde_json::Value = serde_json::from_str(&stdout(&out)).unwrap();
    assert_eq!(doc["filter"]["indices"], serde_json::json!([]));
}

#[test]
fn blank_filter_value_skips_filter() {
    let dir = workspace(LEFT, RIGHT);
    let out = taxmatch(dir.path())
        .args(["run", "a.csv", "b.csv", "--json", "--filter", "   "])
        .output()
        .unwrap();
    let doc: serde_json::Value = serde_json::from_str(&stdout(&out)).unwrap();
    assert!(doc["filter"].is_null());
}

#[test]
fn missing_column_exit_3() {
    let dir = workspace("Invoice,CFOP\n1,101\n", RIGHT);
    let out = taxmatch(dir.path()).args(["run", "a.csv", "b.csv"]).output().unwrap();
    assert_eq!(out.status.code(), Some(3));
    let err = stderr(&out);
    assert!(err.contains("missing column 'Invoice Number'"), "{err}");
    assert!(err.contains("hint:"), "{err}");
}

#[test]
fn unsupported_extension_exit_4() {
    let dir = workspace(LEFT, RIGHT);
    fs::write(dir.path().join("b.pdf"), b"%PDF-1.4").unwrap();
    let out = taxmatch(dir.path()).args(["run", "a.csv", "b.pdf"]).output().unwrap();
    assert_eq!(out.status.code(), Some(4));
}

#[test]
fn config_drives_labels_and_sheets() {
    let dir = workspace(
        "Número NF-e;CFOP\n1001;5102\n1002;6102\n",
        "Número NF-e,CFOP\n1002,6108\n1003,5102\n",
    );
    fs::write(
        dir.path().join("recon.toml"),
        r#"
key_column = "Número NF-e"
compare_column = "CFOP"

[left]
label = "BBTS"
sheet_name = "Exclusivas BBTS"

[right]
label = "NCI"
sheet_name = "Exclusivas NCI"

[output]
mismatch_sheet = "CFOP Divergente"
file_name = "relatorio.xlsx"
"#,
    )
    .unwrap();

    let out = taxmatch(dir.path())
        .args(["run", "a.csv", "b.csv", "--config", "recon.toml"])
        .output()
        .unwrap();
    assert_eq!(out.status.code(), Some(1), "stderr: {}", stderr(&out));
    assert!(stdout(&out).contains("1 exclusive to BBTS, 1 exclusive to NCI, 1 CFOP mismatch."));

    let wb = open_workbook_auto(dir.path().join("relatorio.xlsx")).unwrap();
    assert_eq!(wb.sheet_names(), ["Exclusivas BBTS", "Exclusivas NCI", "CFOP Divergente"]);
}

#[test]
fn validate_accepts_good_config() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("ok.toml"), "[left]\nlabel = \"BBTS\"\n").unwrap();
    let out = taxmatch(dir.path()).args(["validate", "ok.toml"]).output().unwrap();
    assert_eq!(out.status.code(), Some(0));
    assert!(stderr(&out).contains("valid:"));
}

#[test]
fn validate_rejects_bad_config_exit_5() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("bad.toml"), "key_column = \"CFOP\"\ncompare_column = \"CFOP\"\n").unwrap();
    let out = taxmatch(dir.path()).args(["validate", "bad.toml"]).output().unwrap();
    assert_eq!(out.status.code(), Some(5));
    assert!(stderr(&out).starts_with("error: config validation error"));
}

#[test]
fn no_args_is_usage_error() {
    let dir = tempfile::tempdir().unwrap();
    let out = taxmatch(dir.path()).args(["run", "only-one.csv"]).output().unwrap();
    assert_eq!(out.status.code(), Some(2));
}
