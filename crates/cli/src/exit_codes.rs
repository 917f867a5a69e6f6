//! CLI Exit Code Registry
//!
//! This is the single source of truth for all CLI exit codes.
//! Exit codes are part of the shell contract: scripts rely on them.
//!
//! | Code | Meaning                                              |
//! |------|------------------------------------------------------|
//! | 0    | Reconciled: no exclusive rows and no mismatches      |
//! | 1    | Differences found (exclusive rows or mismatches)     |
//! | 2    | CLI usage error (bad args)                           |
//! | 3    | A required column is missing or ambiguous            |
//! | 4    | Input file cannot be read as a table                 |
//! | 5    | Invalid config                                       |
//! | 6    | Runtime / IO failure                                 |
//!
//! # Adding New Exit Codes
//!
//! 1. Add the constant
//! 2. Document what triggers it
//! 3. Update the table above
//! 4. Wire it into `exit_code_for`

use taxmatch_recon::ReconError;

/// Success - both tables agree.
pub const EXIT_SUCCESS: u8 = 0;

/// The run completed and found exclusive rows or comparison mismatches.
pub const EXIT_DIFFERENCES: u8 = 1;

/// Usage error - bad arguments, missing required options.
pub const EXIT_USAGE: u8 = 2;

/// Key or comparison column absent, or a header duplicated after trimming.
pub const EXIT_MISSING_COLUMN: u8 = 3;

/// Input is not a readable table: unknown extension, undecodable content,
/// or a duplicate key under `duplicate_keys = "reject"`.
pub const EXIT_UNPARSEABLE: u8 = 4;

/// Config failed to parse or validate, or its suffixes collide with
/// existing column names.
pub const EXIT_INVALID_CONFIG: u8 = 5;

/// File system or workbook serialization failure.
pub const EXIT_RUNTIME: u8 = 6;

/// Map an engine error to its exit code.
pub fn exit_code_for(err: &ReconError) -> u8 {
    match err {
        ReconError::MissingColumn { .. } | ReconError::DuplicateColumn { .. } => EXIT_MISSING_COLUMN,
        ReconError::Unparseable { .. }
        | ReconError::UnsupportedFormat(_)
        | ReconError::DuplicateKey { .. } => EXIT_UNPARSEABLE,
        ReconError::ConfigParse(_)
        | ReconError::ConfigValidation(_)
        | ReconError::ColumnCollision(_) => EXIT_INVALID_CONFIG,
        ReconError::Export(_) | ReconError::Io(_) => EXIT_RUNTIME,
    }
}
