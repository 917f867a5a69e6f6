// Table loading and report export

pub mod csv;
pub mod xlsx;

use std::path::Path;

use taxmatch_recon::{dedup_column_names, export_sheets, ReconConfig, ReconError, ReconResult, Table};

/// Input file kinds, chosen by extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TableFormat {
    Delimited,
    Spreadsheet,
}

impl TableFormat {
    pub fn from_name(name: &str) -> Option<Self> {
        let ext = Path::new(name).extension()?.to_str()?.to_ascii_lowercase();
        match ext.as_str() {
            "csv" | "tsv" | "txt" => Some(Self::Delimited),
            "xlsx" | "xlsm" | "xlsb" | "xls" | "ods" => Some(Self::Spreadsheet),
            _ => None,
        }
    }
}

/// Load an uploaded file given its name and contents.
pub fn load_bytes(name: &str, bytes: &[u8]) -> Result<Table, ReconError> {
    let format =
        TableFormat::from_name(name).ok_or_else(|| ReconError::UnsupportedFormat(name.into()))?;
    let table = match format {
        TableFormat::Delimited => crate::csv::import_bytes(name, bytes)?,
        TableFormat::Spreadsheet => crate::xlsx::import_bytes(name, bytes)?,
    };
    log::debug!(
        "loaded '{name}': {} column(s), {} row(s)",
        table.columns().len(),
        table.len()
    );
    Ok(table)
}

pub fn load_path(path: &Path) -> Result<Table, ReconError> {
    let bytes = std::fs::read(path)
        .map_err(|e| ReconError::Io(format!("cannot read {}: {e}", path.display())))?;
    load_bytes(&path.display().to_string(), &bytes)
}

/// Serialize the three partitions of `result` into an `.xlsx` buffer.
pub fn write_report(config: &ReconConfig, result: &ReconResult) -> Result<Vec<u8>, ReconError> {
    xlsx::write_workbook(&export_sheets(config, result))
}

/// Column names from a raw header row. Blank headers become
/// `Unnamed: <index>`; a repeated name gets `.1`, `.2`, ... appended.
pub(crate) fn header_names<'a>(raw: impl IntoIterator<Item = &'a str>) -> Vec<String> {
    let mut names: Vec<String> = raw
        .into_iter()
        .enumerate()
        .map(|(i, h)| {
            if h.trim().is_empty() {
                format!("Unnamed: {i}")
            } else {
                h.to_string()
            }
        })
        .collect();
    dedup_column_names(&mut names);
    names
}
