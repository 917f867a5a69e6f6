use std::fmt;

#[derive(Debug, Clone, PartialEq)]
pub enum ReconError {
    /// TOML parse / deserialization error.
    ConfigParse(String),
    /// Config validation error (empty column name, bad sheet name, etc.).
    ConfigValidation(String),
    /// Required column absent from a loaded table.
    MissingColumn { table: String, column: String },
    /// Two headers in one table are identical after trimming.
    DuplicateColumn { table: String, column: String },
    /// Joined column naming produced the same name twice.
    ColumnCollision(String),
    /// Duplicate key in a table while `duplicate_keys = "reject"`.
    DuplicateKey { table: String, key: String },
    /// Input could not be decoded as a table.
    Unparseable { source: String, message: String },
    /// File extension not recognized as delimited text or spreadsheet.
    UnsupportedFormat(String),
    /// Workbook serialization failed.
    Export(String),
    /// IO error (file read, etc.).
    Io(String),
}

impl fmt::Display for ReconError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ConfigParse(msg) => write!(f, "config parse error: {msg}"),
            Self::ConfigValidation(msg) => write!(f, "config validation error: {msg}"),
            Self::MissingColumn { table, column } => {
                write!(f, "table '{table}': missing column '{column}'")
            }
            Self::DuplicateColumn { table, column } => {
                write!(f, "table '{table}': column '{column}' appears more than once")
            }
            Self::ColumnCollision(name) => {
                write!(f, "joined column '{name}' is ambiguous; choose different suffixes")
            }
            Self::DuplicateKey { table, key } => {
                write!(f, "table '{table}': key '{key}' appears more than once")
            }
            Self::Unparseable { source, message } => {
                write!(f, "cannot read '{source}' as a table: {message}")
            }
            Self::UnsupportedFormat(name) => {
                write!(f, "unsupported file type: '{name}' (expected csv, tsv, txt, xlsx, xlsm, xlsb, xls or ods)")
            }
            Self::Export(msg) => write!(f, "export error: {msg}"),
            Self::Io(msg) => write!(f, "IO error: {msg}"),
        }
    }
}

impl std::error::Error for ReconError {}
