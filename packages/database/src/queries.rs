//! Database query functions for fire data.
//!
//! Every query is raw SQL through `query_raw_params()`. Optional filters are
//! appended as `AND` predicates with numbered `$n` placeholders, so user
//! input never reaches the SQL text. `NUMERIC` columns are read back as
//! `DOUBLE PRECISION` and `DATE` columns as ISO-8601 text.

use std::fmt::Write as _;

use chrono::NaiveDate;
use moosicbox_json_utils::database::ToValue as _;
use switchy_database::{Database, DatabaseValue};
use wildfire_map_database_models::{
    AverageAreaStats, FireDurationStats, FireFilter, FireTypeStats, HeatmapPoint, HeatmapQuery,
    MonthYearStats, NearbyFire, NearbyQuery, PageRequest, RegionStats, RegionYearStats,
    YearStats,
};
use wildfire_map_fire_models::geo::EARTH_RADIUS_KM;
use wildfire_map_fire_models::{FireRecord, NewFire};

use crate::DbError;

/// Maximum number of parameters `PostgreSQL` allows per statement.
pub const PG_MAX_PARAMS: usize = 65_535;

/// Largest number of rows a single multi-row `INSERT` can carry.
pub const MAX_INSERT_ROWS: usize = PG_MAX_PARAMS / NewFire::PARAM_COUNT;

/// Select list producing every [`FireRecord`] column in a readable type.
const FIRE_SELECT_COLUMNS: &str = "fire_id, region_name, year, fire_type,
    latitude::DOUBLE PRECISION AS latitude,
    longitude::DOUBLE PRECISION AS longitude,
    landmark_distance::DOUBLE PRECISION AS landmark_distance,
    TO_CHAR(date_beginning, 'YYYY-MM-DD') AS date_beginning,
    area_beginning,
    TO_CHAR(date_end, 'YYYY-MM-DD') AS date_end,
    current_state, area_total, area_forest, area_fund_total, area_fund_forest";

/// Cast for a bound compared against the `NUMERIC` coordinate columns.
/// Comparing in the column's own type keeps `idx_fires_coords` usable.
const COORD_BOUND_CAST: &str = "::DOUBLE PRECISION::NUMERIC";

/// Columns written by [`insert_fires`], in bind order.
const INSERT_COLUMNS: &str = "region_name, year, fire_type, latitude, longitude,
    landmark_distance, date_beginning, area_beginning,
    date_end, current_state, area_total, area_forest,
    area_fund_total, area_fund_forest";

/// Placeholder casts for one inserted row, in [`INSERT_COLUMNS`] order.
const INSERT_CASTS: [&str; NewFire::PARAM_COUNT] = [
    "",
    "::INTEGER",
    "",
    "::DOUBLE PRECISION",
    "::DOUBLE PRECISION",
    "::DOUBLE PRECISION",
    "::TEXT::DATE",
    "::INTEGER",
    "::TEXT::DATE",
    "",
    "::INTEGER",
    "::INTEGER",
    "::INTEGER",
    "::INTEGER",
];

/// Returns the number of rows in the `fires` table.
///
/// # Errors
///
/// Returns [`DbError`] if the database operation fails.
pub async fn count_fires(db: &dyn Database) -> Result<i64, DbError> {
    let rows = db
        .query_raw_params("SELECT COUNT(*) AS count FROM fires", &[])
        .await?;

    let row = rows.first().ok_or_else(|| DbError::Conversion {
        message: "COUNT(*) returned no rows".to_string(),
    })?;

    row.to_value("count").map_err(|e| DbError::Conversion {
        message: format!("Failed to parse fire count: {e}"),
    })
}

/// Takes a lock on `fires` that blocks concurrent writers until the
/// surrounding transaction ends.
///
/// # Errors
///
/// Returns [`DbError`] if the database operation fails.
pub async fn lock_fires_table(db: &dyn Database) -> Result<(), DbError> {
    db.exec_raw("LOCK TABLE fires IN SHARE ROW EXCLUSIVE MODE")
        .await?;
    Ok(())
}

/// Inserts fires with multi-row `INSERT` statements of at most
/// `batch_rows` rows each.
///
/// `batch_rows` is clamped to `1..=`[`MAX_INSERT_ROWS`]. The caller owns
/// the transaction.
///
/// # Errors
///
/// Returns [`DbError`] if any statement fails.
pub async fn insert_fires(
    db: &dyn Database,
    fires: &[NewFire],
    batch_rows: usize,
) -> Result<u64, DbError> {
    let batch_rows = batch_rows.clamp(1, MAX_INSERT_ROWS);
    let mut inserted = 0u64;

    for chunk in fires.chunks(batch_rows) {
        let (sql, params) = build_insert_statement(chunk);
        inserted += db.exec_raw_params(&sql, &params).await?;
        log::debug!("Inserted batch of {} fires ({inserted} total)", chunk.len());
    }

    Ok(inserted)
}

/// Builds one multi-row `INSERT` for `fires`.
#[must_use]
pub fn build_insert_statement(fires: &[NewFire]) -> (String, Vec<DatabaseValue>) {
    let mut sql = format!("INSERT INTO fires ({INSERT_COLUMNS}) VALUES ");
    let mut params: Vec<DatabaseValue> = Vec::with_capacity(fires.len() * NewFire::PARAM_COUNT);
    let mut param_idx = 1usize;

    for (i, fire) in fires.iter().enumerate() {
        if i > 0 {
            sql.push_str(", ");
        }
        sql.push('(');
        for (j, cast) in INSERT_CASTS.iter().enumerate() {
            if j > 0 {
                sql.push_str(", ");
            }
            write!(sql, "${param_idx}{cast}").unwrap();
            param_idx += 1;
        }
        sql.push(')');

        params.extend(fire_params(fire));
    }

    (sql, params)
}

/// Bind values for one row, in [`INSERT_COLUMNS`] order.
fn fire_params(fire: &NewFire) -> [DatabaseValue; NewFire::PARAM_COUNT] {
    [
        DatabaseValue::String(fire.region_name.clone()),
        opt_i32(fire.year),
        fire.fire_type
            .map_or(DatabaseValue::Null, |t| DatabaseValue::String(t.to_string())),
        opt_f64(fire.latitude),
        opt_f64(fire.longitude),
        opt_f64(fire.landmark_distance),
        opt_date(fire.date_beginning),
        opt_i32(fire.area_beginning),
        opt_date(fire.date_end),
        fire.current_state
            .as_ref()
            .map_or(DatabaseValue::Null, |s| DatabaseValue::String(s.clone())),
        opt_i32(fire.area_total),
        opt_i32(fire.area_forest),
        opt_i32(fire.area_fund_total),
        opt_i32(fire.area_fund_forest),
    ]
}

fn opt_i32(value: Option<i32>) -> DatabaseValue {
    value.map_or(DatabaseValue::Null, DatabaseValue::Int32)
}

fn opt_f64(value: Option<f64>) -> DatabaseValue {
    value.map_or(DatabaseValue::Null, DatabaseValue::Real64)
}

fn opt_date(value: Option<NaiveDate>) -> DatabaseValue {
    value.map_or(DatabaseValue::Null, |d| {
        DatabaseValue::String(d.format("%Y-%m-%d").to_string())
    })
}

/// Queries fires matching every supplied filter, ordered by `fire_id`.
///
/// # Errors
///
/// Returns [`DbError`] if the database operation fails.
pub async fn list_fires(db: &dyn Database, filter: &FireFilter) -> Result<Vec<FireRecord>, DbError> {
    let (sql, params) = build_list_query(filter);
    let rows = db.query_raw_params(&sql, &params).await?;
    rows.iter().map(fire_from_row).collect()
}

/// Builds the filtered listing query: a base selection plus one `AND`
/// predicate per supplied filter.
#[must_use]
pub fn build_list_query(filter: &FireFilter) -> (String, Vec<DatabaseValue>) {
    let mut sql = format!("SELECT {FIRE_SELECT_COLUMNS} FROM fires WHERE 1=1");
    let mut params: Vec<DatabaseValue> = Vec::new();
    let mut param_idx = 1u32;

    if let Some(region_name) = &filter.region_name {
        write!(sql, " AND region_name ILIKE ${param_idx}").unwrap();
        params.push(DatabaseValue::String(format!(
            "%{}%",
            escape_like(region_name)
        )));
        param_idx += 1;
    }

    if let Some(year) = filter.year {
        write!(sql, " AND year = ${param_idx}").unwrap();
        params.push(DatabaseValue::Int32(year));
        param_idx += 1;
    }

    if let Some(fire_type) = filter.fire_type {
        write!(sql, " AND fire_type = ${param_idx}").unwrap();
        params.push(DatabaseValue::String(fire_type.to_string()));
        param_idx += 1;
    }

    let bounds = [
        ("latitude", ">=", filter.min_latitude),
        ("latitude", "<=", filter.max_latitude),
        ("longitude", ">=", filter.min_longitude),
        ("longitude", "<=", filter.max_longitude),
    ];
    for (column, op, value) in bounds {
        if let Some(value) = value {
            write!(sql, " AND {column} {op} ${param_idx}{COORD_BOUND_CAST}").unwrap();
            params.push(DatabaseValue::Real64(value));
            param_idx += 1;
        }
    }

    write!(sql, " ORDER BY fire_id LIMIT ${param_idx}").unwrap();
    params.push(DatabaseValue::Int64(i64::from(filter.limit)));

    (sql, params)
}

/// Escapes `LIKE` wildcards so `value` matches literally.
#[must_use]
pub fn escape_like(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for c in value.chars() {
        if matches!(c, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

/// Returns one page of the unfiltered listing, ordered by `fire_id`.
///
/// # Errors
///
/// Returns [`DbError`] if the database operation fails.
pub async fn list_fires_page(
    db: &dyn Database,
    page: &PageRequest,
) -> Result<Vec<FireRecord>, DbError> {
    let offset = i64::try_from(page.offset()).map_err(|e| DbError::Conversion {
        message: format!("Page offset out of range: {e}"),
    })?;

    let rows = db
        .query_raw_params(
            &format!("SELECT {FIRE_SELECT_COLUMNS} FROM fires ORDER BY fire_id LIMIT $1 OFFSET $2"),
            &[
                DatabaseValue::Int64(i64::from(page.per_page)),
                DatabaseValue::Int64(offset),
            ],
        )
        .await?;

    rows.iter().map(fire_from_row).collect()
}

/// Returns up to `batch_size` fires with `fire_id > after_id`, ordered by
/// `fire_id`. Used for keyset-paginated export.
///
/// # Errors
///
/// Returns [`DbError`] if the database operation fails.
pub async fn fetch_fires_after(
    db: &dyn Database,
    after_id: i32,
    batch_size: u32,
) -> Result<Vec<FireRecord>, DbError> {
    let rows = db
        .query_raw_params(
            &format!(
                "SELECT {FIRE_SELECT_COLUMNS} FROM fires WHERE fire_id > $1 ORDER BY fire_id LIMIT $2"
            ),
            &[
                DatabaseValue::Int32(after_id),
                DatabaseValue::Int64(i64::from(batch_size)),
            ],
        )
        .await?;

    rows.iter().map(fire_from_row).collect()
}

/// Fire count and burned area per region, ordered by region name.
///
/// # Errors
///
/// Returns [`DbError`] if the database operation fails.
pub async fn region_stats(db: &dyn Database) -> Result<Vec<RegionStats>, DbError> {
    let rows = db
        .query_raw_params(
            "SELECT region_name, COUNT(*) AS count,
                    COALESCE(SUM(area_total), 0)::BIGINT AS total_area
             FROM fires
             GROUP BY region_name
             ORDER BY region_name",
            &[],
        )
        .await?;

    Ok(rows
        .iter()
        .map(|row| RegionStats {
            region_name: row.to_value("region_name").unwrap_or_default(),
            count: row.to_value("count").unwrap_or(0),
            total_area: row.to_value("total_area").unwrap_or(0),
        })
        .collect())
}

/// Fire count and burned area per year, ascending (unknown year last).
///
/// # Errors
///
/// Returns [`DbError`] if the database operation fails.
pub async fn year_stats(db: &dyn Database) -> Result<Vec<YearStats>, DbError> {
    let rows = db
        .query_raw_params(
            "SELECT year, COUNT(*) AS count,
                    COALESCE(SUM(area_total), 0)::BIGINT AS total_area
             FROM fires
             GROUP BY year
             ORDER BY year ASC NULLS LAST",
            &[],
        )
        .await?;

    Ok(rows
        .iter()
        .map(|row| YearStats {
            year: row.to_value("year").unwrap_or(None),
            count: row.to_value("count").unwrap_or(0),
            total_area: row.to_value("total_area").unwrap_or(0),
        })
        .collect())
}

/// Fire count and burned area per fire category.
///
/// # Errors
///
/// Returns [`DbError`] if the database operation fails.
pub async fn fire_type_stats(db: &dyn Database) -> Result<Vec<FireTypeStats>, DbError> {
    let rows = db
        .query_raw_params(
            "SELECT fire_type, COUNT(*) AS count,
                    COALESCE(SUM(area_total), 0)::BIGINT AS total_area
             FROM fires
             GROUP BY fire_type
             ORDER BY fire_type ASC NULLS LAST",
            &[],
        )
        .await?;

    Ok(rows
        .iter()
        .map(|row| FireTypeStats {
            fire_type: row
                .to_value::<Option<String>>("fire_type")
                .unwrap_or(None)
                .and_then(|s| s.parse().ok()),
            count: row.to_value("count").unwrap_or(0),
            total_area: row.to_value("total_area").unwrap_or(0),
        })
        .collect())
}

/// Fire count and burned area per region and year, ordered by region then
/// year.
///
/// # Errors
///
/// Returns [`DbError`] if the database operation fails.
pub async fn region_year_stats(db: &dyn Database) -> Result<Vec<RegionYearStats>, DbError> {
    let rows = db
        .query_raw_params(
            "SELECT region_name, year, COUNT(*) AS count,
                    COALESCE(SUM(area_total), 0)::BIGINT AS total_area
             FROM fires
             GROUP BY region_name, year
             ORDER BY region_name, year ASC NULLS LAST",
            &[],
        )
        .await?;

    Ok(rows
        .iter()
        .map(|row| RegionYearStats {
            region_name: row.to_value("region_name").unwrap_or_default(),
            year: row.to_value("year").unwrap_or(None),
            count: row.to_value("count").unwrap_or(0),
            total_area: row.to_value("total_area").unwrap_or(0),
        })
        .collect())
}

/// Fire count and burned area per calendar month of `date_beginning`,
/// chronological. Fires without a start date are excluded.
///
/// # Errors
///
/// Returns [`DbError`] if the database operation fails.
pub async fn month_year_stats(db: &dyn Database) -> Result<Vec<MonthYearStats>, DbError> {
    let rows = db
        .query_raw_params(
            "SELECT EXTRACT(YEAR FROM date_beginning)::INTEGER AS year,
                    EXTRACT(MONTH FROM date_beginning)::INTEGER AS month,
                    COUNT(*) AS count,
                    COALESCE(SUM(area_total), 0)::BIGINT AS total_area
             FROM fires
             WHERE date_beginning IS NOT NULL
             GROUP BY 1, 2
             ORDER BY 1, 2",
            &[],
        )
        .await?;

    Ok(rows
        .iter()
        .map(|row| MonthYearStats {
            year: row.to_value("year").unwrap_or(0),
            month: row.to_value("month").unwrap_or(0),
            count: row.to_value("count").unwrap_or(0),
            total_area: row.to_value("total_area").unwrap_or(0),
        })
        .collect())
}

/// Mean `area_total` per region, largest first. Null areas are left out of
/// the mean; a region with no known area reports 0.
///
/// # Errors
///
/// Returns [`DbError`] if the database operation fails.
pub async fn average_area_stats(db: &dyn Database) -> Result<Vec<AverageAreaStats>, DbError> {
    let rows = db
        .query_raw_params(
            "SELECT region_name,
                    COALESCE(AVG(area_total), 0)::DOUBLE PRECISION AS avg_area
             FROM fires
             GROUP BY region_name
             ORDER BY avg_area DESC, region_name",
            &[],
        )
        .await?;

    Ok(rows
        .iter()
        .map(|row| AverageAreaStats {
            region_name: row.to_value("region_name").unwrap_or_default(),
            avg_area: row.to_value("avg_area").unwrap_or(0.0),
        })
        .collect())
}

/// Mean `date_end - date_beginning` in days per region, longest first,
/// rounded to two decimals. Fires missing either date are excluded.
///
/// # Errors
///
/// Returns [`DbError`] if the database operation fails.
pub async fn fire_duration_stats(db: &dyn Database) -> Result<Vec<FireDurationStats>, DbError> {
    let rows = db
        .query_raw_params(
            "SELECT region_name,
                    ROUND(AVG(date_end - date_beginning)::NUMERIC, 2)::DOUBLE PRECISION
                        AS avg_duration_days
             FROM fires
             WHERE date_beginning IS NOT NULL AND date_end IS NOT NULL
             GROUP BY region_name
             ORDER BY avg_duration_days DESC, region_name",
            &[],
        )
        .await?;

    Ok(rows
        .iter()
        .map(|row| FireDurationStats {
            region_name: row.to_value("region_name").unwrap_or_default(),
            avg_duration_days: row.to_value("avg_duration_days").unwrap_or(0.0),
        })
        .collect())
}

/// The `limit` largest fires by `area_total`.
///
/// # Errors
///
/// Returns [`DbError`] if the database operation fails.
pub async fn top_fires(db: &dyn Database, limit: u32) -> Result<Vec<FireRecord>, DbError> {
    let rows = db
        .query_raw_params(
            &format!(
                "SELECT {FIRE_SELECT_COLUMNS} FROM fires
                 ORDER BY area_total DESC NULLS LAST, fire_id
                 LIMIT $1"
            ),
            &[DatabaseValue::Int64(i64::from(limit))],
        )
        .await?;

    rows.iter().map(fire_from_row).collect()
}

/// Coordinates and burned area of fires with known location.
///
/// # Errors
///
/// Returns [`DbError`] if the database operation fails.
pub async fn heatmap_points(
    db: &dyn Database,
    query: &HeatmapQuery,
) -> Result<Vec<HeatmapPoint>, DbError> {
    let mut sql = String::from(
        "SELECT latitude::DOUBLE PRECISION AS latitude,
                longitude::DOUBLE PRECISION AS longitude,
                area_total
         FROM fires
         WHERE latitude IS NOT NULL AND longitude IS NOT NULL",
    );
    let mut params: Vec<DatabaseValue> = Vec::new();
    let mut param_idx = 1u32;

    if let Some(year) = query.year {
        write!(sql, " AND year = ${param_idx}").unwrap();
        params.push(DatabaseValue::Int32(year));
        param_idx += 1;
    }

    write!(sql, " ORDER BY fire_id LIMIT ${param_idx}").unwrap();
    params.push(DatabaseValue::Int64(i64::from(query.limit)));

    let rows = db.query_raw_params(&sql, &params).await?;

    Ok(rows
        .iter()
        .map(|row| HeatmapPoint {
            latitude: row.to_value("latitude").unwrap_or(0.0),
            longitude: row.to_value("longitude").unwrap_or(0.0),
            area_total: row.to_value("area_total").unwrap_or(None),
        })
        .collect())
}

/// Fires within `radius_km` of the query point, nearest first.
///
/// # Errors
///
/// Returns [`DbError`] if the database operation fails.
pub async fn nearby_fires(db: &dyn Database, query: &NearbyQuery) -> Result<Vec<NearbyFire>, DbError> {
    let (sql, params) = build_nearby_query(query);
    let rows = db.query_raw_params(&sql, &params).await?;

    rows.iter()
        .map(|row| {
            Ok(NearbyFire {
                fire: fire_from_row(row)?,
                distance_km: row.to_value("distance_km").map_err(|e| DbError::Conversion {
                    message: format!("Failed to parse distance_km: {e}"),
                })?,
            })
        })
        .collect()
}

/// Builds the radius search: a bounding-box pre-filter on the coordinate
/// index, then the Haversine distance with an inclusive radius cut.
#[must_use]
pub fn build_nearby_query(query: &NearbyQuery) -> (String, Vec<DatabaseValue>) {
    let bbox = query.bounding_box();

    let sql = format!(
        "SELECT * FROM (
            SELECT {FIRE_SELECT_COLUMNS},
                   {EARTH_RADIUS_KM:.1} * 2.0 * ASIN(LEAST(1.0, SQRT(
                       POWER(SIN(RADIANS(latitude::DOUBLE PRECISION - $1::DOUBLE PRECISION) / 2.0), 2)
                       + COS(RADIANS($1::DOUBLE PRECISION))
                         * COS(RADIANS(latitude::DOUBLE PRECISION))
                         * POWER(SIN(RADIANS(longitude::DOUBLE PRECISION - $2::DOUBLE PRECISION) / 2.0), 2)
                   ))) AS distance_km
            FROM fires
            WHERE latitude IS NOT NULL AND longitude IS NOT NULL
              AND latitude BETWEEN $3{COORD_BOUND_CAST} AND $4{COORD_BOUND_CAST}
              AND longitude BETWEEN $5{COORD_BOUND_CAST} AND $6{COORD_BOUND_CAST}
         ) AS candidates
         WHERE distance_km <= $7::DOUBLE PRECISION
         ORDER BY distance_km, fire_id
         LIMIT $8"
    );

    let params = vec![
        DatabaseValue::Real64(query.latitude),
        DatabaseValue::Real64(query.longitude),
        DatabaseValue::Real64(bbox.south),
        DatabaseValue::Real64(bbox.north),
        DatabaseValue::Real64(bbox.west),
        DatabaseValue::Real64(bbox.east),
        DatabaseValue::Real64(query.radius_km),
        DatabaseValue::Int64(i64::from(query.limit)),
    ];

    (sql, params)
}

/// Converts a row selected with [`FIRE_SELECT_COLUMNS`] into a
/// [`FireRecord`].
fn fire_from_row(row: &switchy_database::Row) -> Result<FireRecord, DbError> {
    let fire_id: i32 = row.to_value("fire_id").map_err(|e| DbError::Conversion {
        message: format!("Failed to parse fire_id: {e}"),
    })?;
    let region_name: String = row.to_value("region_name").map_err(|e| DbError::Conversion {
        message: format!("Failed to parse region_name of fire {fire_id}: {e}"),
    })?;

    Ok(FireRecord {
        fire_id,
        region_name,
        year: row.to_value("year").unwrap_or(None),
        fire_type: row
            .to_value::<Option<String>>("fire_type")
            .unwrap_or(None)
            .and_then(|s| s.parse().ok()),
        latitude: row.to_value("latitude").unwrap_or(None),
        longitude: row.to_value("longitude").unwrap_or(None),
        landmark_distance: row.to_value("landmark_distance").unwrap_or(None),
        date_beginning: row_opt_date(row, "date_beginning"),
        area_beginning: row.to_value("area_beginning").unwrap_or(None),
        date_end: row_opt_date(row, "date_end"),
        current_state: row.to_value("current_state").unwrap_or(None),
        area_total: row.to_value("area_total").unwrap_or(None),
        area_forest: row.to_value("area_forest").unwrap_or(None),
        area_fund_total: row.to_value("area_fund_total").unwrap_or(None),
        area_fund_forest: row.to_value("area_fund_forest").unwrap_or(None),
    })
}

/// Reads a `YYYY-MM-DD` text column as an optional date.
fn row_opt_date(row: &switchy_database::Row, col: &str) -> Option<NaiveDate> {
    row.to_value::<Option<String>>(col)
        .unwrap_or(None)
        .and_then(|s| NaiveDate::parse_from_str(&s, "%Y-%m-%d").ok())
}

#[cfg(test)]
mod tests {
    use super::*;
    use wildfire_map_fire_models::FireType;

    fn new_fire(region: &str) -> NewFire {
        NewFire {
            region_name: region.to_string(),
            year: Some(2020),
            fire_type: Some(FireType::Forest),
            latitude: Some(62.03),
            longitude: Some(129.73),
            landmark_distance: None,
            date_beginning: NaiveDate::from_ymd_opt(2020, 5, 1),
            area_beginning: Some(1),
            date_end: None,
            current_state: Some("Ликвидирован".to_string()),
            area_total: Some(10),
            area_forest: None,
            area_fund_total: None,
            area_fund_forest: None,
        }
    }

    #[test]
    fn unfiltered_list_only_limits() {
        let filter = FireFilter {
            limit: 100,
            ..FireFilter::default()
        };
        let (sql, params) = build_list_query(&filter);
        assert!(sql.ends_with("WHERE 1=1 ORDER BY fire_id LIMIT $1"));
        assert_eq!(params.len(), 1);
        assert!(matches!(params[0], DatabaseValue::Int64(100)));
    }

    #[test]
    fn every_filter_adds_one_predicate() {
        let filter = FireFilter {
            region_name: Some("Якутия".to_string()),
            year: Some(2021),
            fire_type: Some(FireType::NonForest),
            min_latitude: Some(50.0),
            max_latitude: Some(70.0),
            min_longitude: Some(100.0),
            max_longitude: Some(140.0),
            limit: 10,
        };
        let (sql, params) = build_list_query(&filter);

        assert_eq!(params.len(), 8);
        assert!(sql.contains("region_name ILIKE $1"));
        assert!(sql.contains("year = $2"));
        assert!(sql.contains("fire_type = $3"));
        assert!(sql.contains("latitude >= $4::DOUBLE PRECISION::NUMERIC"));
        assert!(sql.contains("latitude <= $5::DOUBLE PRECISION::NUMERIC"));
        assert!(sql.contains("longitude >= $6::DOUBLE PRECISION::NUMERIC"));
        assert!(sql.contains("longitude <= $7::DOUBLE PRECISION::NUMERIC"));
        assert!(sql.ends_with("LIMIT $8"));

        assert!(matches!(&params[0], DatabaseValue::String(s) if s == "%Якутия%"));
        assert!(matches!(params[1], DatabaseValue::Int32(2021)));
        assert!(matches!(&params[2], DatabaseValue::String(s) if s == "Нелесные"));
    }

    #[test]
    fn zero_valued_filters_still_apply() {
        let filter = FireFilter {
            year: Some(0),
            min_latitude: Some(0.0),
            limit: 5,
            ..FireFilter::default()
        };
        let (sql, params) = build_list_query(&filter);
        assert!(sql.contains("year = $1"));
        assert!(sql.contains("latitude >= $2::DOUBLE PRECISION::NUMERIC"));
        assert_eq!(params.len(), 3);
    }

    #[test]
    fn region_filter_escapes_wildcards() {
        assert_eq!(escape_like("100%_a\\b"), "100\\%\\_a\\\\b");
        assert_eq!(escape_like("Алтай"), "Алтай");
    }

    #[test]
    fn insert_statement_numbers_placeholders_per_row() {
        let fires = vec![new_fire("A"), new_fire("B")];
        let (sql, params) = build_insert_statement(&fires);

        assert_eq!(params.len(), 2 * NewFire::PARAM_COUNT);
        assert!(sql.contains("($1, $2::INTEGER, $3,"));
        assert!(sql.contains("$7::TEXT::DATE"));
        assert!(sql.contains("), ($15, $16::INTEGER"));
        assert!(sql.ends_with("$28::INTEGER)"));
        assert!(matches!(&params[6], DatabaseValue::String(s) if s == "2020-05-01"));
        assert!(matches!(params[8], DatabaseValue::Null));
        assert!(matches!(&params[14], DatabaseValue::String(s) if s == "B"));
    }

    #[test]
    fn max_insert_batch_fits_parameter_limit() {
        assert!(MAX_INSERT_ROWS * NewFire::PARAM_COUNT <= PG_MAX_PARAMS);
        assert!((MAX_INSERT_ROWS + 1) * NewFire::PARAM_COUNT > PG_MAX_PARAMS);
    }

    #[test]
    fn nearby_query_binds_point_box_radius_and_limit() {
        let query = NearbyQuery {
            latitude: 55.0,
            longitude: 83.0,
            radius_km: 25.0,
            limit: 20,
        };
        let (sql, params) = build_nearby_query(&query);

        assert_eq!(params.len(), 8);
        assert!(sql.contains("6371.0 * 2.0 * ASIN"));
        assert!(sql.contains("distance_km <= $7"));
        assert!(sql.contains("latitude BETWEEN $3::DOUBLE PRECISION::NUMERIC AND $4::DOUBLE PRECISION::NUMERIC"));
        assert!(sql.contains("longitude BETWEEN $5::DOUBLE PRECISION::NUMERIC AND $6::DOUBLE PRECISION::NUMERIC"));
        assert!(!sql.contains("latitude::DOUBLE PRECISION BETWEEN"));
        assert!(sql.contains("ORDER BY distance_km"));
        assert!(matches!(params[6], DatabaseValue::Real64(r) if (r - 25.0).abs() < f64::EPSILON));
        assert!(matches!(params[7], DatabaseValue::Int64(20)));
        assert!(
            matches!(params[2], DatabaseValue::Real64(south) if south < 55.0),
            "south edge must be below the query point"
        );
    }
}
