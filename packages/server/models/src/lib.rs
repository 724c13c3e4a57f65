#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! API request and response types for the wildfire map server.
//!
//! Query parameter structs deserialize the raw query string and are
//! checked by their `validate` methods before any SQL runs, producing the
//! typed queries of `wildfire_map_database_models`. Integer parameters are
//! read as `i64` so that negative values surface as range errors rather
//! than parse errors.

use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumString};
use wildfire_map_database_models::{FireFilter, HeatmapQuery, NearbyQuery, PageRequest};
use wildfire_map_fire_models::{FireRecord, FireType};

/// Default row cap of the filtered listing.
pub const DEFAULT_LIST_LIMIT: u32 = 100;
/// Largest row cap of the filtered listing.
pub const MAX_LIST_LIMIT: u32 = 1000;
/// Default page size of the paginated listing.
pub const DEFAULT_PER_PAGE: u32 = 100;
/// Largest page size of the paginated listing.
pub const MAX_PER_PAGE: u32 = 1000;
/// Default number of fires in the top-fires ranking.
pub const DEFAULT_TOP_LIMIT: u32 = 10;
/// Largest number of fires in the top-fires ranking.
pub const MAX_TOP_LIMIT: u32 = 1000;
/// Default number of heatmap points.
pub const DEFAULT_HEATMAP_LIMIT: u32 = 10_000;
/// Largest number of heatmap points.
pub const MAX_HEATMAP_LIMIT: u32 = 50_000;
/// Default radius of the nearby search, in kilometers.
pub const DEFAULT_RADIUS_KM: f64 = 50.0;
/// Smallest accepted radius of the nearby search, in kilometers.
pub const MIN_RADIUS_KM: f64 = 1.0;
/// Default row cap of the nearby search.
pub const DEFAULT_NEARBY_LIMIT: u32 = 100;
/// Largest row cap of the nearby search.
pub const MAX_NEARBY_LIMIT: u32 = 1000;

/// Path the pagination links point at.
pub const PAGINATED_PATH: &str = "/fires/paginated";

/// Body of `GET /`.
pub const ROOT_MESSAGE: &str = "Wildfire Tracking API";

/// A query parameter that failed validation.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ValidationError {
    /// An integer parameter lies outside its allowed range.
    #[error("{name} must be between {min} and {max}, got {value}")]
    OutOfRange {
        /// Parameter name.
        name: &'static str,
        /// Supplied value.
        value: i64,
        /// Smallest allowed value.
        min: i64,
        /// Largest allowed value.
        max: i64,
    },

    /// A coordinate lies outside its allowed range.
    #[error("{name} must be between {min} and {max}, got {value}")]
    CoordinateOutOfRange {
        /// Parameter name.
        name: &'static str,
        /// Supplied value.
        value: f64,
        /// Smallest allowed value.
        min: f64,
        /// Largest allowed value.
        max: f64,
    },

    /// The search radius is below [`MIN_RADIUS_KM`] or not finite.
    #[error("radius_km must be a finite number >= 1, got {0}")]
    InvalidRadius(f64),

    /// `fire_type` is not one of the known categories.
    #[error("Unknown fire_type {0:?}")]
    UnknownFireType(String),

    /// `format` names no export format.
    #[error("Unsupported export format {0:?}")]
    UnsupportedExportFormat(String),

    /// JSON export is reserved but not available.
    #[error("JSON export not implemented")]
    JsonExportNotImplemented,
}

fn check_range(
    name: &'static str,
    value: Option<i64>,
    default: u32,
    min: u32,
    max: u32,
) -> Result<u32, ValidationError> {
    let Some(value) = value else {
        return Ok(default);
    };

    u32::try_from(value)
        .ok()
        .filter(|v| (min..=max).contains(v))
        .ok_or(ValidationError::OutOfRange {
            name,
            value,
            min: i64::from(min),
            max: i64::from(max),
        })
}

fn check_coordinate(name: &'static str, value: f64, bound: f64) -> Result<f64, ValidationError> {
    if (-bound..=bound).contains(&value) {
        Ok(value)
    } else {
        Err(ValidationError::CoordinateOutOfRange {
            name,
            value,
            min: -bound,
            max: bound,
        })
    }
}

fn check_optional_coordinate(
    name: &'static str,
    value: Option<f64>,
    bound: f64,
) -> Result<Option<f64>, ValidationError> {
    value.map(|v| check_coordinate(name, v, bound)).transpose()
}

/// Query parameters of `GET /fires/`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct FireListParams {
    /// Case-insensitive substring of the region name.
    pub region_name: Option<String>,
    /// Exact reporting year.
    pub year: Option<i32>,
    /// Exact fire category label.
    pub fire_type: Option<String>,
    /// Inclusive lower latitude bound.
    pub min_latitude: Option<f64>,
    /// Inclusive upper latitude bound.
    pub max_latitude: Option<f64>,
    /// Inclusive lower longitude bound.
    pub min_longitude: Option<f64>,
    /// Inclusive upper longitude bound.
    pub max_longitude: Option<f64>,
    /// Row cap, 1 to [`MAX_LIST_LIMIT`].
    pub limit: Option<i64>,
}

impl FireListParams {
    /// Checks the parameters and builds the listing filter.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError`] if `limit` or a coordinate bound is out
    /// of range, or `fire_type` is not a known category.
    pub fn validate(self) -> Result<FireFilter, ValidationError> {
        let limit = check_range("limit", self.limit, DEFAULT_LIST_LIMIT, 1, MAX_LIST_LIMIT)?;
        let min_latitude = check_optional_coordinate("min_latitude", self.min_latitude, 90.0)?;
        let max_latitude = check_optional_coordinate("max_latitude", self.max_latitude, 90.0)?;
        let min_longitude = check_optional_coordinate("min_longitude", self.min_longitude, 180.0)?;
        let max_longitude = check_optional_coordinate("max_longitude", self.max_longitude, 180.0)?;

        let fire_type = self
            .fire_type
            .map(|value| {
                value
                    .trim()
                    .parse::<FireType>()
                    .map_err(|_| ValidationError::UnknownFireType(value))
            })
            .transpose()?;

        Ok(FireFilter {
            region_name: self.region_name,
            year: self.year,
            fire_type,
            min_latitude,
            max_latitude,
            min_longitude,
            max_longitude,
            limit,
        })
    }
}

/// Query parameters of `GET /fires/paginated`.
#[derive(Debug, Clone, Copy, Default, Deserialize)]
pub struct PaginationParams {
    /// 1-based page number.
    pub page: Option<i64>,
    /// Rows per page, 1 to [`MAX_PER_PAGE`].
    pub per_page: Option<i64>,
}

impl PaginationParams {
    /// Checks the parameters and builds the page request.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::OutOfRange`] if `page` is below 1 or
    /// `per_page` is outside `1..=1000`.
    pub fn validate(self) -> Result<PageRequest, ValidationError> {
        Ok(PageRequest {
            page: check_range("page", self.page, 1, 1, u32::MAX)?,
            per_page: check_range("per_page", self.per_page, DEFAULT_PER_PAGE, 1, MAX_PER_PAGE)?,
        })
    }
}

/// Query parameters of `GET /fires/stats/top-fires`.
#[derive(Debug, Clone, Copy, Default, Deserialize)]
pub struct TopFiresParams {
    /// Number of fires, 1 to [`MAX_TOP_LIMIT`].
    pub limit: Option<i64>,
}

impl TopFiresParams {
    /// Returns the validated ranking size.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::OutOfRange`] if `limit` is out of range.
    pub fn validate(self) -> Result<u32, ValidationError> {
        check_range("limit", self.limit, DEFAULT_TOP_LIMIT, 1, MAX_TOP_LIMIT)
    }
}

/// Query parameters of `GET /fires/heatmap-points`.
#[derive(Debug, Clone, Copy, Default, Deserialize)]
pub struct HeatmapParams {
    /// Only include fires from this year.
    pub year: Option<i32>,
    /// Number of points, 1 to [`MAX_HEATMAP_LIMIT`].
    pub limit: Option<i64>,
}

impl HeatmapParams {
    /// Checks the parameters and builds the heatmap query.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::OutOfRange`] if `limit` is out of range.
    pub fn validate(self) -> Result<HeatmapQuery, ValidationError> {
        Ok(HeatmapQuery {
            year: self.year,
            limit: check_range("limit", self.limit, DEFAULT_HEATMAP_LIMIT, 1, MAX_HEATMAP_LIMIT)?,
        })
    }
}

/// Query parameters of `GET /fires/nearby`.
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct NearbyParams {
    /// Latitude of the query point, -90 to 90.
    pub latitude: f64,
    /// Longitude of the query point, -180 to 180.
    pub longitude: f64,
    /// Search radius in kilometers, at least [`MIN_RADIUS_KM`].
    pub radius_km: Option<f64>,
    /// Row cap, 1 to [`MAX_NEARBY_LIMIT`].
    pub limit: Option<i64>,
}

impl NearbyParams {
    /// Checks the parameters and builds the radius search.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError`] if a coordinate, the radius or the limit
    /// is out of range.
    pub fn validate(self) -> Result<NearbyQuery, ValidationError> {
        let latitude = check_coordinate("latitude", self.latitude, 90.0)?;
        let longitude = check_coordinate("longitude", self.longitude, 180.0)?;

        let radius_km = self.radius_km.unwrap_or(DEFAULT_RADIUS_KM);
        if !radius_km.is_finite() || radius_km < MIN_RADIUS_KM {
            return Err(ValidationError::InvalidRadius(radius_km));
        }

        Ok(NearbyQuery {
            latitude,
            longitude,
            radius_km,
            limit: check_range("limit", self.limit, DEFAULT_NEARBY_LIMIT, 1, MAX_NEARBY_LIMIT)?,
        })
    }
}

/// Formats accepted by the `format` parameter of `GET /fires/export`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Display, EnumString, AsRefStr)]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum ExportFormat {
    /// Comma-separated values with a header row.
    #[default]
    Csv,
    /// Reserved; always rejected.
    Json,
}

/// Query parameters of `GET /fires/export`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ExportParams {
    /// Export format, `csv` when absent.
    pub format: Option<String>,
}

impl ExportParams {
    /// Resolves the requested format.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::JsonExportNotImplemented`] for `json` and
    /// [`ValidationError::UnsupportedExportFormat`] for anything else that
    /// is not `csv`.
    pub fn validate(&self) -> Result<ExportFormat, ValidationError> {
        let format = match self.format.as_deref() {
            None => ExportFormat::default(),
            Some(raw) => raw
                .trim()
                .parse()
                .map_err(|_| ValidationError::UnsupportedExportFormat(raw.to_string()))?,
        };

        match format {
            ExportFormat::Csv => Ok(format),
            ExportFormat::Json => Err(ValidationError::JsonExportNotImplemented),
        }
    }
}

/// One page of the unfiltered listing, with links to its neighbours.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaginatedFires {
    /// Rows in the whole table.
    pub total: u64,
    /// This page's number.
    pub page: u32,
    /// Page size.
    pub per_page: u32,
    /// `ceil(total / per_page)`.
    pub total_pages: u64,
    /// Link to the following page, `None` on the last page.
    pub next_page: Option<String>,
    /// Link to the preceding page, `None` on page 1.
    pub prev_page: Option<String>,
    /// Rows of this page.
    pub items: Vec<FireRecord>,
}

impl PaginatedFires {
    /// Wraps one fetched page with its pagination metadata.
    #[must_use]
    pub fn new(items: Vec<FireRecord>, total: u64, request: PageRequest) -> Self {
        let total_pages = total_pages(total, request.per_page);
        let page = request.page;

        let next_page = (u64::from(page) < total_pages).then(|| page_link(page.saturating_add(1), request.per_page));
        let prev_page = (page > 1).then(|| page_link(page - 1, request.per_page));

        Self {
            total,
            page,
            per_page: request.per_page,
            total_pages,
            next_page,
            prev_page,
            items,
        }
    }
}

/// Number of pages needed for `total` rows.
#[must_use]
pub fn total_pages(total: u64, per_page: u32) -> u64 {
    if per_page == 0 {
        return 0;
    }
    total.div_ceil(u64::from(per_page))
}

/// Link to page `page` of the paginated listing.
#[must_use]
pub fn page_link(page: u32, per_page: u32) -> String {
    format!("{PAGINATED_PATH}?page={page}&per_page={per_page}")
}

/// Error body returned with every 4xx and 5xx response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiError {
    /// Human-readable message.
    pub error: String,
}

impl ApiError {
    /// Creates an error body.
    #[must_use]
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
        }
    }
}

impl From<ValidationError> for ApiError {
    fn from(e: ValidationError) -> Self {
        Self::new(e.to_string())
    }
}

/// Body of `GET /`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiRoot {
    /// Service banner.
    pub message: String,
}

/// Body of `GET /health`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiHealth {
    /// Whether the server is healthy.
    pub healthy: bool,
    /// Server version.
    pub version: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(page: u32, per_page: u32) -> PageRequest {
        PageRequest { page, per_page }
    }

    #[test]
    fn list_defaults_and_limit_bounds() {
        let filter = FireListParams::default().validate().unwrap();
        assert_eq!(filter.limit, DEFAULT_LIST_LIMIT);
        assert_eq!(filter.fire_type, None);

        for bad in [0, -1, 1001] {
            let params = FireListParams {
                limit: Some(bad),
                ..FireListParams::default()
            };
            assert!(matches!(
                params.validate(),
                Err(ValidationError::OutOfRange { name: "limit", .. })
            ));
        }

        let params = FireListParams {
            limit: Some(1000),
            ..FireListParams::default()
        };
        assert_eq!(params.validate().unwrap().limit, 1000);
    }

    #[test]
    fn list_keeps_zero_valued_filters() {
        let params = FireListParams {
            year: Some(0),
            min_latitude: Some(0.0),
            fire_type: Some("Нелесные".to_string()),
            ..FireListParams::default()
        };
        let filter = params.validate().unwrap();
        assert_eq!(filter.year, Some(0));
        assert_eq!(filter.min_latitude, Some(0.0));
        assert_eq!(filter.fire_type, Some(FireType::NonForest));
    }

    #[test]
    fn list_coordinate_bounds_must_be_on_the_globe() {
        let params = FireListParams {
            min_latitude: Some(200.0),
            ..FireListParams::default()
        };
        assert!(matches!(
            params.validate(),
            Err(ValidationError::CoordinateOutOfRange { name: "min_latitude", .. })
        ));

        let params = FireListParams {
            max_longitude: Some(f64::NAN),
            ..FireListParams::default()
        };
        assert!(matches!(
            params.validate(),
            Err(ValidationError::CoordinateOutOfRange { name: "max_longitude", .. })
        ));

        let params = FireListParams {
            min_latitude: Some(-90.0),
            max_latitude: Some(90.0),
            min_longitude: Some(-180.0),
            max_longitude: Some(180.0),
            ..FireListParams::default()
        };
        let filter = params.validate().unwrap();
        assert_eq!(filter.min_latitude, Some(-90.0));
        assert_eq!(filter.max_longitude, Some(180.0));
    }

    #[test]
    fn unknown_fire_type_is_rejected() {
        let params = FireListParams {
            fire_type: Some("Степные".to_string()),
            ..FireListParams::default()
        };
        assert_eq!(
            params.validate().unwrap_err(),
            ValidationError::UnknownFireType("Степные".to_string())
        );
    }

    #[test]
    fn pagination_bounds() {
        let page = PaginationParams::default().validate().unwrap();
        assert_eq!(page, request(1, DEFAULT_PER_PAGE));

        for (page, per_page) in [(Some(0), None), (None, Some(0)), (None, Some(1001)), (Some(-3), None)] {
            let params = PaginationParams { page, per_page };
            assert!(params.validate().is_err(), "{page:?} {per_page:?}");
        }
    }

    #[test]
    fn top_and_heatmap_limits() {
        assert_eq!(TopFiresParams::default().validate().unwrap(), DEFAULT_TOP_LIMIT);
        assert!(TopFiresParams { limit: Some(1001) }.validate().is_err());

        let heatmap = HeatmapParams::default().validate().unwrap();
        assert_eq!(heatmap.limit, DEFAULT_HEATMAP_LIMIT);
        assert!(HeatmapParams {
            year: None,
            limit: Some(50_001)
        }
        .validate()
        .is_err());
        assert_eq!(
            HeatmapParams {
                year: Some(2020),
                limit: Some(50_000)
            }
            .validate()
            .unwrap()
            .limit,
            MAX_HEATMAP_LIMIT
        );
    }

    #[test]
    fn nearby_validation() {
        let ok = NearbyParams {
            latitude: 55.75,
            longitude: 37.62,
            radius_km: None,
            limit: None,
        };
        let query = ok.validate().unwrap();
        assert!((query.radius_km - DEFAULT_RADIUS_KM).abs() < f64::EPSILON);
        assert_eq!(query.limit, DEFAULT_NEARBY_LIMIT);

        let edge = NearbyParams {
            latitude: -90.0,
            longitude: 180.0,
            radius_km: Some(1.0),
            ..ok
        };
        assert!(edge.validate().is_ok());

        let bad_lat = NearbyParams {
            latitude: 91.0,
            ..ok
        };
        assert!(matches!(
            bad_lat.validate(),
            Err(ValidationError::CoordinateOutOfRange { name: "latitude", .. })
        ));

        let bad_lon = NearbyParams {
            longitude: -180.5,
            ..ok
        };
        assert!(bad_lon.validate().is_err());

        for radius in [0.5, f64::NAN, f64::INFINITY] {
            let params = NearbyParams {
                radius_km: Some(radius),
                ..ok
            };
            assert!(matches!(params.validate(), Err(ValidationError::InvalidRadius(_))));
        }
    }

    #[test]
    fn export_format_parsing() {
        assert_eq!(ExportParams::default().validate().unwrap(), ExportFormat::Csv);

        let csv = ExportParams {
            format: Some("CSV".to_string()),
        };
        assert_eq!(csv.validate().unwrap(), ExportFormat::Csv);

        let json = ExportParams {
            format: Some("json".to_string()),
        };
        let err = json.validate().unwrap_err();
        assert_eq!(err, ValidationError::JsonExportNotImplemented);
        assert_eq!(
            serde_json::to_value(ApiError::from(err)).unwrap(),
            serde_json::json!({ "error": "JSON export not implemented" })
        );

        let xml = ExportParams {
            format: Some("xml".to_string()),
        };
        assert_eq!(
            xml.validate().unwrap_err(),
            ValidationError::UnsupportedExportFormat("xml".to_string())
        );
    }

    #[test]
    fn total_pages_rounds_up() {
        assert_eq!(total_pages(0, 100), 0);
        assert_eq!(total_pages(1, 100), 1);
        assert_eq!(total_pages(100, 100), 1);
        assert_eq!(total_pages(101, 100), 2);
        assert_eq!(total_pages(2500, 1000), 3);
    }

    #[test]
    fn links_are_null_at_the_boundaries() {
        let first = PaginatedFires::new(Vec::new(), 250, request(1, 100));
        assert_eq!(first.total_pages, 3);
        assert_eq!(first.prev_page, None);
        assert_eq!(
            first.next_page.as_deref(),
            Some("/fires/paginated?page=2&per_page=100")
        );

        let middle = PaginatedFires::new(Vec::new(), 250, request(2, 100));
        assert_eq!(
            middle.prev_page.as_deref(),
            Some("/fires/paginated?page=1&per_page=100")
        );
        assert_eq!(
            middle.next_page.as_deref(),
            Some("/fires/paginated?page=3&per_page=100")
        );

        let last = PaginatedFires::new(Vec::new(), 250, request(3, 100));
        assert_eq!(last.next_page, None);
        assert!(last.prev_page.is_some());

        let empty = PaginatedFires::new(Vec::new(), 0, request(1, 100));
        assert_eq!(empty.total_pages, 0);
        assert_eq!(empty.next_page, None);
        assert_eq!(empty.prev_page, None);
    }

    #[test]
    fn page_windows_cover_the_table_exactly() {
        let ids: Vec<u64> = (1..=1037).collect();
        let total = ids.len() as u64;

        for per_page in [1, 7, 100, 1000] {
            let mut seen: Vec<u64> = Vec::new();
            let pages = total_pages(total, per_page);
            for page in 1..=u32::try_from(pages).unwrap() {
                let req = request(page, per_page);
                let offset = usize::try_from(req.offset()).unwrap();
                seen.extend(ids.iter().skip(offset).take(per_page as usize));

                let meta = PaginatedFires::new(Vec::new(), total, req);
                assert_eq!(meta.next_page.is_none(), u64::from(page) == pages);
                assert_eq!(meta.prev_page.is_none(), page == 1);
            }
            assert_eq!(seen, ids, "per_page = {per_page}");
        }
    }
}
