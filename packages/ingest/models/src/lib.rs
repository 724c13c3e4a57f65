#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Ingestion options, source column layout, and result types.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Source CSV columns that have no counterpart in the `fires` table.
pub const DROPPED_COLUMNS: [&str; 9] = [
    "oktmo",
    "okato",
    "zone_beginning",
    "code",
    "landmark_settlement",
    "landmark_azimuth",
    "forestry",
    "comment",
    "zone",
];

/// Source CSV columns whose name differs from the table column, as
/// `(source, target)` pairs.
pub const RENAMED_COLUMNS: [(&str, &str); 2] = [("region", "region_name"), ("type", "fire_type")];

/// Field delimiter of the source CSV.
pub const CSV_DELIMITER: u8 = b';';

/// Day-month-year format of the source date columns.
pub const SOURCE_DATE_FORMAT: &str = "%d.%m.%Y";

/// Options for a single load run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IngestOptions {
    /// ZIP archive holding the source CSV.
    pub archive_path: PathBuf,
    /// Name of the CSV member inside the archive.
    pub member: String,
    /// Rows per multi-row `INSERT` statement.
    pub batch_rows: usize,
}

/// Result of a load run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum IngestOutcome {
    /// The table was empty and has been populated.
    Loaded {
        /// Number of rows inserted.
        rows: u64,
    },
    /// The table already held data; nothing was written.
    SkippedNotEmpty {
        /// Number of rows found in the table.
        existing: i64,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn renamed_and_dropped_columns_are_disjoint() {
        for (source, target) in RENAMED_COLUMNS {
            assert!(!DROPPED_COLUMNS.contains(&source));
            assert!(!DROPPED_COLUMNS.contains(&target));
        }
    }
}
