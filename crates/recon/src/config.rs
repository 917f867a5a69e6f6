use serde::Deserialize;

use crate::error::ReconError;

/// Characters Excel refuses in worksheet names.
const INVALID_SHEET_CHARS: &[char] = &['[', ']', ':', '*', '?', '/', '\\'];

/// Excel's worksheet name length limit.
const MAX_SHEET_NAME_LEN: usize = 31;

// ---------------------------------------------------------------------------
// Top-level config
// ---------------------------------------------------------------------------

/// Reconciliation settings. Every field has a default, so an empty TOML
/// document is a valid config.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ReconConfig {
    pub name: String,
    /// Join key (invoice number).
    pub key_column: String,
    /// Field compared on rows present in both tables (fiscal operation code).
    pub compare_column: String,
    /// Short name of the compared field used in the summary sentence.
    pub compare_label: String,
    pub duplicate_keys: DuplicateKeyPolicy,
    pub left: SideConfig,
    pub right: SideConfig,
    pub output: OutputConfig,
}

impl Default for ReconConfig {
    fn default() -> Self {
        Self {
            name: "reconciliation".into(),
            key_column: "Invoice Number".into(),
            compare_column: "Fiscal Operation Code".into(),
            compare_label: "CFOP".into(),
            duplicate_keys: DuplicateKeyPolicy::default(),
            left: SideConfig::labeled("A"),
            right: SideConfig::labeled("B"),
            output: OutputConfig::default(),
        }
    }
}

// ---------------------------------------------------------------------------
// Sides
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Side {
    Left,
    Right,
}

impl std::fmt::Display for Side {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Left => write!(f, "left"),
            Self::Right => write!(f, "right"),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct SideConfig {
    /// Display name of the source ("BBTS", "NCI", ...).
    pub label: String,
    /// Column suffix on join collisions. Defaults to `_<label>`.
    #[serde(default)]
    pub suffix: Option<String>,
    /// Workbook sheet holding this side's exclusive rows.
    /// Defaults to `Exclusive <label>`.
    #[serde(default)]
    pub sheet_name: Option<String>,
}

impl SideConfig {
    pub fn labeled(label: &str) -> Self {
        Self {
            label: label.into(),
            suffix: None,
            sheet_name: None,
        }
    }

    pub fn suffix(&self) -> String {
        self.suffix.clone().unwrap_or_else(|| format!("_{}", self.label))
    }

    pub fn sheet_name(&self) -> String {
        self.sheet_name
            .clone()
            .unwrap_or_else(|| format!("Exclusive {}", self.label))
    }
}

// ---------------------------------------------------------------------------
// Duplicate keys + Output
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DuplicateKeyPolicy {
    /// Every row pairs with every row sharing its key.
    #[default]
    CrossProduct,
    /// A repeated key in either table is an error.
    Reject,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Mismatch sheet name. Defaults to `<compare_label> Mismatch`.
    pub mismatch_sheet: Option<String>,
    /// Suggested file name for the exported workbook.
    pub file_name: String,
    /// Header of the provenance column in exported sheets; empty omits it.
    pub indicator_column: String,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            mismatch_sheet: None,
            file_name: "reconciliation_report.xlsx".into(),
            indicator_column: "_merge".into(),
        }
    }
}

// ---------------------------------------------------------------------------
// Parse + Validate
// ---------------------------------------------------------------------------

impl ReconConfig {
    pub fn from_toml(input: &str) -> Result<Self, ReconError> {
        let config: ReconConfig =
            toml::from_str(input).map_err(|e| ReconError::ConfigParse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn side(&self, side: Side) -> &SideConfig {
        match side {
            Side::Left => &self.left,
            Side::Right => &self.right,
        }
    }

    pub fn mismatch_sheet(&self) -> String {
        self.output
            .mismatch_sheet
            .clone()
            .unwrap_or_else(|| format!("{} Mismatch", self.compare_label))
    }

    /// Sheet names in workbook order: exclusive-left, exclusive-right, mismatch.
    pub fn sheet_names(&self) -> [String; 3] {
        [
            self.left.sheet_name(),
            self.right.sheet_name(),
            self.mismatch_sheet(),
        ]
    }

    pub fn validate(&self) -> Result<(), ReconError> {
        if self.key_column.trim().is_empty() {
            return Err(ReconError::ConfigValidation("key_column must not be empty".into()));
        }
        if self.compare_column.trim().is_empty() {
            return Err(ReconError::ConfigValidation(
                "compare_column must not be empty".into(),
            ));
        }
        if self.key_column.trim() == self.compare_column.trim() {
            return Err(ReconError::ConfigValidation(format!(
                "key_column and compare_column are both '{}'",
                self.key_column.trim()
            )));
        }

        for (side, cfg) in [(Side::Left, &self.left), (Side::Right, &self.right)] {
            if cfg.label.trim().is_empty() {
                return Err(ReconError::ConfigValidation(format!("{side} label must not be empty")));
            }
            if cfg.suffix().is_empty() {
                return Err(ReconError::ConfigValidation(format!("{side} suffix must not be empty")));
            }
        }
        if self.left.suffix() == self.right.suffix() {
            return Err(ReconError::ConfigValidation(format!(
                "left and right suffixes are both '{}'",
                self.left.suffix()
            )));
        }

        let names = self.sheet_names();
        for name in &names {
            validate_sheet_name(name)?;
        }
        for i in 0..names.len() {
            for j in (i + 1)..names.len() {
                if names[i].eq_ignore_ascii_case(&names[j]) {
                    return Err(ReconError::ConfigValidation(format!(
                        "sheet name '{}' is used twice",
                        names[i]
                    )));
                }
            }
        }

        if self.output.file_name.trim().is_empty() {
            return Err(ReconError::ConfigValidation("output.file_name must not be empty".into()));
        }

        Ok(())
    }
}

fn validate_sheet_name(name: &str) -> Result<(), ReconError> {
    if name.trim().is_empty() {
        return Err(ReconError::ConfigValidation("sheet name must not be empty".into()));
    }
    if name.chars().count() > MAX_SHEET_NAME_LEN {
        return Err(ReconError::ConfigValidation(format!(
            "sheet name '{name}' is longer than {MAX_SHEET_NAME_LEN} characters"
        )));
    }
    if let Some(c) = name.chars().find(|c| INVALID_SHEET_CHARS.contains(c)) {
        return Err(ReconError::ConfigValidation(format!(
            "sheet name '{name}' contains '{c}'"
        )));
    }
    Ok(())
}
