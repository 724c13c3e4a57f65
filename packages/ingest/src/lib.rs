#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! One-shot loader for the wildfire archive.
//!
//! Reads the semicolon-delimited CSV member out of the source ZIP, cleans
//! it into [`NewFire`] rows and writes them into the `fires` table inside a
//! single transaction. A table that already holds rows is left untouched,
//! so running the loader twice never duplicates data.

pub mod transform;

use std::path::Path;
use std::time::Instant;

use switchy_database::Database;
use wildfire_map_database::{DbError, queries};
use wildfire_map_fire_models::NewFire;
use wildfire_map_ingest_models::{IngestOptions, IngestOutcome};

/// Errors that can occur while loading the archive.
#[derive(Debug, thiserror::Error)]
pub enum IngestError {
    /// The source archive does not exist.
    #[error("Source archive not found: {0}")]
    ArchiveNotFound(String),

    /// The source archive could not be opened.
    #[error("I/O error reading {path}: {source}")]
    Io {
        /// Path of the archive.
        path: String,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// The archive is not a readable ZIP, or lacks the requested member.
    #[error("ZIP error in {path}: {source}")]
    Zip {
        /// Path of the archive.
        path: String,
        /// Underlying ZIP error.
        source: zip::result::ZipError,
    },

    /// The CSV member is malformed.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// A table column is absent from the CSV header.
    #[error("Source CSV has no column for {0:?}")]
    MissingColumn(String),

    /// A row has an empty region.
    #[error("Line {line}: region is empty")]
    MissingRegion {
        /// 1-based line number in the CSV member.
        line: u64,
    },

    /// A cell could not be converted to its column type.
    #[error("Line {line}: invalid {column} value {value:?}")]
    InvalidField {
        /// 1-based line number in the CSV member.
        line: u64,
        /// Target table column.
        column: &'static str,
        /// Raw cell contents.
        value: String,
    },

    /// Writing to the database failed.
    #[error(transparent)]
    Database(#[from] DbError),
}

impl From<switchy_database::DatabaseError> for IngestError {
    fn from(e: switchy_database::DatabaseError) -> Self {
        Self::Database(DbError::from(e))
    }
}

/// Reads and cleans the CSV member `member` of the ZIP at `path`.
///
/// # Errors
///
/// Returns [`IngestError`] if the archive is missing or unreadable, the
/// member does not exist, or any row fails to parse.
pub fn read_archive(path: &Path, member: &str) -> Result<Vec<NewFire>, IngestError> {
    if !path.exists() {
        return Err(IngestError::ArchiveNotFound(path.display().to_string()));
    }

    let file = std::fs::File::open(path).map_err(|e| IngestError::Io {
        path: path.display().to_string(),
        source: e,
    })?;

    let mut archive = zip::ZipArchive::new(file).map_err(|e| IngestError::Zip {
        path: path.display().to_string(),
        source: e,
    })?;

    let entry = archive.by_name(member).map_err(|e| IngestError::Zip {
        path: path.display().to_string(),
        source: e,
    })?;

    log::info!(
        "Reading {member} ({} bytes) from {}",
        entry.size(),
        path.display()
    );

    transform::parse_fires(entry)
}

/// Loads the archive into an empty `fires` table.
///
/// The emptiness check is repeated under a table lock inside the insert
/// transaction, so two loaders racing on the same database cannot both
/// write. Any failure rolls the transaction back and leaves the table
/// empty.
///
/// # Errors
///
/// Returns [`IngestError`] if reading the archive or writing the rows
/// fails.
pub async fn ingest(db: &dyn Database, options: &IngestOptions) -> Result<IngestOutcome, IngestError> {
    let existing = queries::count_fires(db).await?;
    if existing > 0 {
        log::info!("fires already holds {existing} rows, skipping load");
        return Ok(IngestOutcome::SkippedNotEmpty { existing });
    }

    let start = Instant::now();
    let fires = read_archive(&options.archive_path, &options.member)?;
    log::info!(
        "Parsed {} fires in {:.1}s",
        fires.len(),
        start.elapsed().as_secs_f64()
    );

    let txn = db.begin_transaction().await?;

    match load_locked(txn.as_ref(), &fires, options.batch_rows).await {
        Ok(IngestOutcome::Loaded { rows }) => {
            txn.commit().await?;
            log::info!(
                "Loaded {rows} fires in {:.1}s",
                start.elapsed().as_secs_f64()
            );
            Ok(IngestOutcome::Loaded { rows })
        }
        Ok(outcome) => {
            txn.rollback().await?;
            Ok(outcome)
        }
        Err(e) => {
            log::error!("Load failed, rolling back: {e}");
            if let Err(rollback_err) = txn.rollback().await {
                log::error!("Rollback failed: {rollback_err}");
            }
            Err(e)
        }
    }
}

async fn load_locked(
    db: &dyn Database,
    fires: &[NewFire],
    batch_rows: usize,
) -> Result<IngestOutcome, IngestError> {
    queries::lock_fires_table(db).await?;

    let existing = queries::count_fires(db).await?;
    if existing > 0 {
        log::warn!("fires was filled by another loader ({existing} rows), skipping load");
        return Ok(IngestOutcome::SkippedNotEmpty { existing });
    }

    let rows = queries::insert_fires(db, fires, batch_rows).await?;
    Ok(IngestOutcome::Loaded { rows })
}
