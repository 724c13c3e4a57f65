//! CSV encoding for the fires export.
//!
//! The export is produced chunk by chunk: the caller fetches a batch with
//! [`crate::queries::fetch_fires_after`], encodes it here, emits the bytes,
//! and moves on. Only the first chunk carries the header row.

use wildfire_map_fire_models::{FIRE_COLUMNS, FireRecord};

use crate::DbError;

/// Rows fetched per export chunk.
pub const EXPORT_BATCH_SIZE: u32 = 1000;

/// Errors that can occur while producing the export.
#[derive(Debug, thiserror::Error)]
pub enum ExportError {
    /// Fetching a chunk failed.
    #[error(transparent)]
    Database(#[from] DbError),

    /// Encoding a chunk failed.
    #[error("CSV encoding error: {0}")]
    Csv(#[from] csv::Error),
}

/// Encodes `fires` as CSV lines, preceded by the header row when
/// `include_header` is set.
///
/// # Errors
///
/// Returns [`ExportError::Csv`] if a record cannot be serialized.
pub fn encode_csv_chunk(fires: &[FireRecord], include_header: bool) -> Result<Vec<u8>, ExportError> {
    let mut writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(Vec::new());

    if include_header {
        writer.write_record(FIRE_COLUMNS)?;
    }
    for fire in fires {
        writer.serialize(fire)?;
    }

    writer
        .into_inner()
        .map_err(|e| ExportError::Csv(csv::Error::from(e.into_error())))
}
