use crate::model::Partition;

/// Whether the caller asked for a secondary filter on the mismatch set.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum FilterChoice {
    #[default]
    Skip,
    /// Filter requested; the value may still be missing.
    Apply(Option<String>),
}

impl FilterChoice {
    /// The value to filter by, if the filter should run at all.
    pub fn value(&self) -> Option<&str> {
        match self {
            Self::Skip => None,
            Self::Apply(v) => v.as_deref().map(str::trim).filter(|v| !v.is_empty()),
        }
    }
}

/// Mismatch rows whose left OR right comparison field equals `value`.
///
/// No value (or a blank one) returns the set unchanged.
pub fn filter_by_code<'a>(mismatches: &Partition<'a>, value: Option<&str>) -> Partition<'a> {
    let Some(value) = value.map(str::trim).filter(|v| !v.is_empty()) else {
        return mismatches.clone();
    };
    let layout = mismatches.layout();
    let filtered = mismatches.retain_rows(|row| {
        row.values[layout.left_compare].trimmed() == value
            || row.values[layout.right_compare].trimmed() == value
    });
    log::debug!(
        "filter '{value}': {} of {} mismatch row(s)",
        filtered.len(),
        mismatches.len()
    );
    filtered
}
