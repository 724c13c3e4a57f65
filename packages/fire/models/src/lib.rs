#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions)]

//! Wildfire record types and fire categories.
//!
//! This crate defines the canonical shape of a fire incident as stored in
//! the `fires` table, the two fire categories the table accepts, and the
//! Earth constants used by radius searches.

pub mod geo;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumString};

/// Column names of the `fires` table, in table order.
///
/// This is also the header row of the CSV export.
pub const FIRE_COLUMNS: [&str; 15] = [
    "fire_id",
    "region_name",
    "year",
    "fire_type",
    "latitude",
    "longitude",
    "landmark_distance",
    "date_beginning",
    "area_beginning",
    "date_end",
    "current_state",
    "area_total",
    "area_forest",
    "area_fund_total",
    "area_fund_forest",
];

/// Category of a fire. The database only accepts these two labels.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
)]
pub enum FireType {
    /// Fire on forest land.
    #[serde(rename = "Лесные")]
    #[strum(serialize = "Лесные")]
    Forest,
    /// Fire outside forest land (steppe, agricultural, etc.).
    #[serde(rename = "Нелесные")]
    #[strum(serialize = "Нелесные")]
    NonForest,
}

/// A fire incident as stored in the `fires` table.
///
/// Field order matches [`FIRE_COLUMNS`] so the struct can be serialized
/// directly as a CSV row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FireRecord {
    /// Primary key, assigned by the database.
    pub fire_id: i32,
    /// Administrative region the fire was recorded in.
    pub region_name: String,
    /// Reporting year.
    pub year: Option<i32>,
    /// Fire category.
    pub fire_type: Option<FireType>,
    /// Latitude (WGS84).
    pub latitude: Option<f64>,
    /// Longitude (WGS84).
    pub longitude: Option<f64>,
    /// Distance to the nearest landmark settlement, in kilometers.
    pub landmark_distance: Option<f64>,
    /// Date the fire was detected.
    pub date_beginning: Option<NaiveDate>,
    /// Area burning at detection, in hectares.
    pub area_beginning: Option<i32>,
    /// Date the fire was extinguished.
    pub date_end: Option<NaiveDate>,
    /// Last reported status.
    pub current_state: Option<String>,
    /// Total burned area, in hectares.
    pub area_total: Option<i32>,
    /// Burned forest area, in hectares.
    pub area_forest: Option<i32>,
    /// Burned area of the forest fund.
    pub area_fund_total: Option<i32>,
    /// Burned forested area of the forest fund.
    pub area_fund_forest: Option<i32>,
}

/// A fire incident ready for insertion. Identical to [`FireRecord`] minus
/// the database-assigned `fire_id`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewFire {
    /// Administrative region the fire was recorded in.
    pub region_name: String,
    /// Reporting year.
    pub year: Option<i32>,
    /// Fire category.
    pub fire_type: Option<FireType>,
    /// Latitude (WGS84).
    pub latitude: Option<f64>,
    /// Longitude (WGS84).
    pub longitude: Option<f64>,
    /// Distance to the nearest landmark settlement, in kilometers.
    pub landmark_distance: Option<f64>,
    /// Date the fire was detected.
    pub date_beginning: Option<NaiveDate>,
    /// Area burning at detection, in hectares.
    pub area_beginning: Option<i32>,
    /// Date the fire was extinguished.
    pub date_end: Option<NaiveDate>,
    /// Last reported status.
    pub current_state: Option<String>,
    /// Total burned area, in hectares.
    pub area_total: Option<i32>,
    /// Burned forest area, in hectares.
    pub area_forest: Option<i32>,
    /// Burned area of the forest fund.
    pub area_fund_total: Option<i32>,
    /// Burned forested area of the forest fund.
    pub area_fund_forest: Option<i32>,
}

impl NewFire {
    /// Number of bind parameters one row occupies in an `INSERT`.
    pub const PARAM_COUNT: usize = FIRE_COLUMNS.len() - 1;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fire_type_parses_database_labels() {
        assert_eq!("Лесные".parse::<FireType>().unwrap(), FireType::Forest);
        assert_eq!("Нелесные".parse::<FireType>().unwrap(), FireType::NonForest);
        assert!("Forest".parse::<FireType>().is_err());
    }

    #[test]
    fn fire_type_display_roundtrip() {
        for fire_type in &[FireType::Forest, FireType::NonForest] {
            let label = fire_type.to_string();
            assert_eq!(label.parse::<FireType>().unwrap(), *fire_type);
            assert_eq!(fire_type.as_ref(), label);
        }
    }

    #[test]
    fn new_fire_param_count_excludes_primary_key() {
        assert_eq!(NewFire::PARAM_COUNT, 14);
        assert_eq!(FIRE_COLUMNS[0], "fire_id");
    }
}
