#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions)]

//! Query parameter definitions and aggregate row types.
//!
//! Query types here carry already-validated values; range checks on raw
//! request input live in `wildfire_map_server_models`. Aggregate rows are
//! the shapes returned by the statistics queries and serialize directly to
//! the JSON the API serves.

use serde::{Deserialize, Serialize};
use wildfire_map_fire_models::geo::{EARTH_RADIUS_KM, KM_PER_DEGREE};
use wildfire_map_fire_models::{FireRecord, FireType};

/// Slack added around a computed bounding box so points lying exactly on
/// the search circle survive floating-point rounding.
const BBOX_MARGIN_DEGREES: f64 = 1e-6;

/// A geographic bounding box in WGS84 coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    /// Western longitude boundary.
    pub west: f64,
    /// Southern latitude boundary.
    pub south: f64,
    /// Eastern longitude boundary.
    pub east: f64,
    /// Northern latitude boundary.
    pub north: f64,
}

impl BoundingBox {
    /// Creates a new bounding box from the given coordinates.
    #[must_use]
    pub const fn new(west: f64, south: f64, east: f64, north: f64) -> Self {
        Self {
            west,
            south,
            east,
            north,
        }
    }

    /// Smallest box (in degrees) containing every point within
    /// `radius_km` of (`latitude`, `longitude`).
    ///
    /// Falls back to the full longitude range when the circle reaches a
    /// pole or crosses the antimeridian.
    #[must_use]
    pub fn around(latitude: f64, longitude: f64, radius_km: f64) -> Self {
        let lat_delta = radius_km / KM_PER_DEGREE + BBOX_MARGIN_DEGREES;
        let south = latitude - lat_delta;
        let north = latitude + lat_delta;

        if south <= -90.0 || north >= 90.0 {
            return Self::new(-180.0, south.max(-90.0), 180.0, north.min(90.0));
        }

        let angular = radius_km / EARTH_RADIUS_KM;
        let ratio = angular.sin() / latitude.to_radians().cos();
        if angular >= std::f64::consts::FRAC_PI_2 || ratio >= 1.0 {
            return Self::new(-180.0, south, 180.0, north);
        }

        let lon_delta = ratio.asin().to_degrees() + BBOX_MARGIN_DEGREES;
        let west = longitude - lon_delta;
        let east = longitude + lon_delta;
        if west < -180.0 || east > 180.0 {
            return Self::new(-180.0, south, 180.0, north);
        }

        Self::new(west, south, east, north)
    }
}

/// Optional predicates for the filtered fire listing. Every supplied
/// field narrows the result; absent fields are ignored.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FireFilter {
    /// Case-insensitive substring of the region name.
    pub region_name: Option<String>,
    /// Exact reporting year.
    pub year: Option<i32>,
    /// Exact fire category.
    pub fire_type: Option<FireType>,
    /// Inclusive lower latitude bound.
    pub min_latitude: Option<f64>,
    /// Inclusive upper latitude bound.
    pub max_latitude: Option<f64>,
    /// Inclusive lower longitude bound.
    pub min_longitude: Option<f64>,
    /// Inclusive upper longitude bound.
    pub max_longitude: Option<f64>,
    /// Maximum number of rows to return.
    pub limit: u32,
}

/// One page of the unfiltered listing. Pages are 1-based.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageRequest {
    /// Page number, starting at 1.
    pub page: u32,
    /// Rows per page.
    pub per_page: u32,
}

impl PageRequest {
    /// Number of rows preceding this page.
    #[must_use]
    pub fn offset(&self) -> u64 {
        u64::from(self.page.saturating_sub(1)) * u64::from(self.per_page)
    }
}

/// Radius search around a point.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct NearbyQuery {
    /// Latitude of the query point.
    pub latitude: f64,
    /// Longitude of the query point.
    pub longitude: f64,
    /// Search radius in kilometers (inclusive).
    pub radius_km: f64,
    /// Maximum number of rows to return.
    pub limit: u32,
}

impl NearbyQuery {
    /// Index-friendly pre-filter covering the whole search circle.
    #[must_use]
    pub fn bounding_box(&self) -> BoundingBox {
        BoundingBox::around(self.latitude, self.longitude, self.radius_km)
    }
}

/// Heatmap point selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct HeatmapQuery {
    /// Only include fires from this year.
    pub year: Option<i32>,
    /// Maximum number of points to return.
    pub limit: u32,
}

/// Fire count and burned area for one region.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegionStats {
    /// Region name.
    pub region_name: String,
    /// Number of fires.
    pub count: i64,
    /// Sum of `area_total`, nulls counted as zero.
    pub total_area: i64,
}

/// Fire count and burned area for one year.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct YearStats {
    /// Reporting year (`None` groups fires without a year).
    pub year: Option<i32>,
    /// Number of fires.
    pub count: i64,
    /// Sum of `area_total`, nulls counted as zero.
    pub total_area: i64,
}

/// Fire count and burned area for one fire category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FireTypeStats {
    /// Fire category (`None` groups uncategorized fires).
    pub fire_type: Option<FireType>,
    /// Number of fires.
    pub count: i64,
    /// Sum of `area_total`, nulls counted as zero.
    pub total_area: i64,
}

/// Fire count and burned area for one region in one year.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegionYearStats {
    /// Region name.
    pub region_name: String,
    /// Reporting year.
    pub year: Option<i32>,
    /// Number of fires.
    pub count: i64,
    /// Sum of `area_total`, nulls counted as zero.
    pub total_area: i64,
}

/// Fire count and burned area for one calendar month, keyed on
/// `date_beginning`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MonthYearStats {
    /// Calendar year.
    pub year: i32,
    /// Calendar month, 1-12.
    pub month: i32,
    /// Number of fires.
    pub count: i64,
    /// Sum of `area_total`, nulls counted as zero.
    pub total_area: i64,
}

/// An aggregate group carrying a fire count and burned area.
pub trait GroupTotals {
    /// Number of fires in the group.
    fn count(&self) -> i64;
    /// Sum of `area_total` in the group.
    fn total_area(&self) -> i64;
}

macro_rules! impl_group_totals {
    ($($ty:ty),* $(,)?) => {
        $(
            impl GroupTotals for $ty {
                fn count(&self) -> i64 {
                    self.count
                }

                fn total_area(&self) -> i64 {
                    self.total_area
                }
            }
        )*
    };
}

impl_group_totals!(RegionStats, YearStats, FireTypeStats, RegionYearStats, MonthYearStats);

/// Sums `(count, total_area)` over every group.
#[must_use]
pub fn sum_totals<T: GroupTotals>(groups: &[T]) -> (i64, i64) {
    groups.iter().fold((0, 0), |(count, area), group| {
        (count + group.count(), area + group.total_area())
    })
}

/// Mean burned area per fire for one region.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AverageAreaStats {
    /// Region name.
    pub region_name: String,
    /// Mean of non-null `area_total` values.
    pub avg_area: f64,
}

/// Mean fire duration for one region.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FireDurationStats {
    /// Region name.
    pub region_name: String,
    /// Mean of `date_end - date_beginning` in days, rounded to 2 decimals.
    pub avg_duration_days: f64,
}

/// A coordinate weighted by burned area.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HeatmapPoint {
    /// Latitude (WGS84).
    pub latitude: f64,
    /// Longitude (WGS84).
    pub longitude: f64,
    /// Total burned area, in hectares.
    pub area_total: Option<i32>,
}

/// A fire matched by a radius search.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NearbyFire {
    /// The matched record.
    #[serde(flatten)]
    pub fire: FireRecord,
    /// Great-circle distance to the query point, in kilometers.
    pub distance_km: f64,
}
