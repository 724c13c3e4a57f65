//! Cleaning and reshaping of source CSV rows into [`NewFire`] records.
//!
//! Columns are resolved by header name: the administrative and free-text
//! columns listed in [`DROPPED_COLUMNS`] are discarded, `region` and `type`
//! are renamed, and every remaining table column must be present.

use std::io::Read;

use chrono::NaiveDate;
use csv::StringRecord;
use wildfire_map_fire_models::{FIRE_COLUMNS, FireType, NewFire};
use wildfire_map_ingest_models::{
    CSV_DELIMITER, DROPPED_COLUMNS, RENAMED_COLUMNS, SOURCE_DATE_FORMAT,
};

use crate::IngestError;

/// Table column filled from the CSV at position `target`, in [`NewFire`]
/// field order. `fire_id` is generated by the database.
const fn target_column(target: usize) -> &'static str {
    FIRE_COLUMNS[target + 1]
}

/// Position of a target column, see [`target_column`].
#[derive(Debug, Clone, Copy)]
enum Field {
    RegionName,
    Year,
    FireType,
    Latitude,
    Longitude,
    LandmarkDistance,
    DateBeginning,
    AreaBeginning,
    DateEnd,
    CurrentState,
    AreaTotal,
    AreaForest,
    AreaFundTotal,
    AreaFundForest,
}

impl Field {
    const fn name(self) -> &'static str {
        target_column(self as usize)
    }
}

/// Maps each target column to its index in the source record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnMap {
    indices: [usize; NewFire::PARAM_COUNT],
}

impl ColumnMap {
    /// Applies the drop and rename rules to a header row.
    ///
    /// # Errors
    ///
    /// Returns [`IngestError::MissingColumn`] if a table column is absent
    /// after renaming.
    pub fn from_headers(headers: &StringRecord) -> Result<Self, IngestError> {
        let mut found: [Option<usize>; NewFire::PARAM_COUNT] = [None; NewFire::PARAM_COUNT];

        for (idx, raw) in headers.iter().enumerate() {
            let header = raw.trim().trim_start_matches('\u{feff}');
            if DROPPED_COLUMNS.contains(&header) {
                continue;
            }

            let name = RENAMED_COLUMNS
                .iter()
                .find(|(source, _)| *source == header)
                .map_or(header, |(_, target)| target);

            match (0..NewFire::PARAM_COUNT).find(|&target| target_column(target) == name) {
                Some(target) => found[target] = Some(idx),
                None => log::warn!("Ignoring unknown source column {header:?}"),
            }
        }

        let mut indices = [0usize; NewFire::PARAM_COUNT];
        for (target, slot) in found.iter().enumerate() {
            indices[target] =
                slot.ok_or_else(|| IngestError::MissingColumn(target_column(target).to_string()))?;
        }

        Ok(Self { indices })
    }

    /// Trimmed, non-empty cell for `field`.
    fn cell<'r>(&self, record: &'r StringRecord, field: Field) -> Option<&'r str> {
        record
            .get(self.indices[field as usize])
            .map(str::trim)
            .filter(|s| !s.is_empty())
    }

    fn text(&self, record: &StringRecord, field: Field) -> Option<String> {
        self.cell(record, field).map(str::to_string)
    }

    fn int(&self, record: &StringRecord, field: Field, line: u64) -> Result<Option<i32>, IngestError> {
        self.cell(record, field)
            .map(|value| parse_int(value).ok_or_else(|| invalid(line, field, value)))
            .transpose()
    }

    fn float(&self, record: &StringRecord, field: Field, line: u64) -> Result<Option<f64>, IngestError> {
        self.cell(record, field)
            .map(|value| parse_float(value).ok_or_else(|| invalid(line, field, value)))
            .transpose()
    }

    fn date(&self, record: &StringRecord, field: Field) -> Option<NaiveDate> {
        self.cell(record, field).and_then(parse_date)
    }

    /// Converts one source record into a [`NewFire`].
    ///
    /// # Errors
    ///
    /// Returns [`IngestError`] if the region is empty, a numeric cell does
    /// not parse, or the fire type is not a known category.
    pub fn parse_record(&self, record: &StringRecord, line: u64) -> Result<NewFire, IngestError> {
        let region_name = self
            .text(record, Field::RegionName)
            .ok_or(IngestError::MissingRegion { line })?;

        let fire_type = self
            .cell(record, Field::FireType)
            .map(|value| {
                value
                    .parse::<FireType>()
                    .map_err(|_| invalid(line, Field::FireType, value))
            })
            .transpose()?;

        Ok(NewFire {
            region_name,
            year: self.int(record, Field::Year, line)?,
            fire_type,
            latitude: self.float(record, Field::Latitude, line)?,
            longitude: self.float(record, Field::Longitude, line)?,
            landmark_distance: self.float(record, Field::LandmarkDistance, line)?,
            date_beginning: self.date(record, Field::DateBeginning),
            area_beginning: self.int(record, Field::AreaBeginning, line)?,
            date_end: self.date(record, Field::DateEnd),
            current_state: self.text(record, Field::CurrentState),
            area_total: self.int(record, Field::AreaTotal, line)?,
            area_forest: self.int(record, Field::AreaForest, line)?,
            area_fund_total: self.int(record, Field::AreaFundTotal, line)?,
            area_fund_forest: self.int(record, Field::AreaFundForest, line)?,
        })
    }
}

fn invalid(line: u64, field: Field, value: &str) -> IngestError {
    IngestError::InvalidField {
        line,
        column: field.name(),
        value: value.to_string(),
    }
}

/// Parses every row of a semicolon-delimited source CSV.
///
/// # Errors
///
/// Returns [`IngestError`] on malformed CSV, a missing table column, or an
/// invalid cell. The whole read fails on the first bad row.
pub fn parse_fires(reader: impl Read) -> Result<Vec<NewFire>, IngestError> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .delimiter(CSV_DELIMITER)
        .from_reader(reader);

    let columns = ColumnMap::from_headers(csv_reader.headers()?)?;

    let mut fires = Vec::new();
    let mut record = StringRecord::new();
    while csv_reader.read_record(&mut record)? {
        let line = record.position().map_or(0, csv::Position::line);
        fires.push(columns.parse_record(&record, line)?);
    }

    Ok(fires)
}

/// Parses a day-month-year date. Unparseable input yields `None` rather
/// than an error.
#[must_use]
pub fn parse_date(value: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(value.trim(), SOURCE_DATE_FORMAT).ok()
}

/// Parses an integer cell, accepting a float rendering with no fractional
/// part (`"12.0"`).
fn parse_int(value: &str) -> Option<i32> {
    if let Ok(v) = value.parse::<i32>() {
        return Some(v);
    }
    let float = parse_float(value)?;
    if float.fract() != 0.0 || float < f64::from(i32::MIN) || float > f64::from(i32::MAX) {
        return None;
    }
    #[allow(clippy::cast_possible_truncation)]
    Some(float as i32)
}

/// Parses a decimal cell, accepting either `.` or `,` as the separator.
fn parse_float(value: &str) -> Option<f64> {
    value
        .replace(',', ".")
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
}
