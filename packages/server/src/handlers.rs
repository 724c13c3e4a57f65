//! HTTP handler functions for the wildfire map API.

use std::fmt::Display;
use std::sync::Arc;

use actix_web::http::header::{ContentDisposition, DispositionParam, DispositionType};
use actix_web::{HttpResponse, web};
use futures::Stream;
use serde::Serialize;
use switchy_database::Database;
use wildfire_map_database::export::{EXPORT_BATCH_SIZE, ExportError, encode_csv_chunk};
use wildfire_map_database::queries;
use wildfire_map_database_models::{GroupTotals, sum_totals};
use wildfire_map_server_models::{
    ApiError, ApiHealth, ApiRoot, ExportParams, FireListParams, HeatmapParams, NearbyParams,
    PaginatedFires, PaginationParams, ROOT_MESSAGE, TopFiresParams, ValidationError,
};

use crate::AppState;

/// Maps a query result to a 200 JSON response, or logs the error and
/// answers 500 with `failure` as the message.
fn json_or_500<T: Serialize, E: Display>(result: Result<T, E>, failure: &str) -> HttpResponse {
    match result {
        Ok(body) => HttpResponse::Ok().json(body),
        Err(e) => {
            log::error!("{failure}: {e}");
            HttpResponse::InternalServerError().json(ApiError::new(failure))
        }
    }
}

fn log_totals<T: GroupTotals>(kind: &str, groups: &[T]) {
    let (count, total_area) = sum_totals(groups);
    log::debug!(
        "{} {kind} groups covering {count} fires, {total_area} ha",
        groups.len()
    );
}

fn bad_request(e: ValidationError) -> HttpResponse {
    log::debug!("Rejected request: {e}");
    HttpResponse::BadRequest().json(ApiError::from(e))
}

/// `GET /`
pub async fn root() -> HttpResponse {
    HttpResponse::Ok().json(ApiRoot {
        message: ROOT_MESSAGE.to_string(),
    })
}

/// `GET /health`
pub async fn health() -> HttpResponse {
    HttpResponse::Ok().json(ApiHealth {
        healthy: true,
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

/// `GET /fires/`
///
/// Lists fires matching the optional region, year, type and coordinate
/// filters.
pub async fn list_fires(
    state: web::Data<AppState>,
    params: web::Query<FireListParams>,
) -> HttpResponse {
    let filter = match params.into_inner().validate() {
        Ok(filter) => filter,
        Err(e) => return bad_request(e),
    };

    let db = state.pool.acquire();
    json_or_500(
        queries::list_fires(db.as_ref(), &filter).await,
        "Failed to query fires",
    )
}

/// `GET /fires/paginated`
pub async fn paginated_fires(
    state: web::Data<AppState>,
    params: web::Query<PaginationParams>,
) -> HttpResponse {
    let request = match params.into_inner().validate() {
        Ok(request) => request,
        Err(e) => return bad_request(e),
    };

    let db = state.pool.acquire();
    let result = async {
        let total = queries::count_fires(db.as_ref()).await?;
        let items = queries::list_fires_page(db.as_ref(), &request).await?;
        Ok::<_, wildfire_map_database::DbError>(PaginatedFires::new(
            items,
            u64::try_from(total).unwrap_or_default(),
            request,
        ))
    }
    .await;

    json_or_500(result, "Failed to query fires page")
}

/// `GET /fires/stats/regions`
pub async fn region_stats(state: web::Data<AppState>) -> HttpResponse {
    let db = state.pool.acquire();
    let result = queries::region_stats(db.as_ref()).await;
    if let Ok(groups) = &result {
        log_totals("region", groups);
    }
    json_or_500(result, "Failed to query region stats")
}

/// `GET /fires/stats/years`
pub async fn year_stats(state: web::Data<AppState>) -> HttpResponse {
    let db = state.pool.acquire();
    let result = queries::year_stats(db.as_ref()).await;
    if let Ok(groups) = &result {
        log_totals("year", groups);
    }
    json_or_500(result, "Failed to query year stats")
}

/// `GET /fires/stats/types`
pub async fn fire_type_stats(state: web::Data<AppState>) -> HttpResponse {
    let db = state.pool.acquire();
    let result = queries::fire_type_stats(db.as_ref()).await;
    if let Ok(groups) = &result {
        log_totals("fire type", groups);
    }
    json_or_500(result, "Failed to query fire type stats")
}

/// `GET /fires/stats/region-year`
pub async fn region_year_stats(state: web::Data<AppState>) -> HttpResponse {
    let db = state.pool.acquire();
    let result = queries::region_year_stats(db.as_ref()).await;
    if let Ok(groups) = &result {
        log_totals("region-year", groups);
    }
    json_or_500(result, "Failed to query region-year stats")
}

/// `GET /fires/stats/month-year`
pub async fn month_year_stats(state: web::Data<AppState>) -> HttpResponse {
    let db = state.pool.acquire();
    let result = queries::month_year_stats(db.as_ref()).await;
    if let Ok(groups) = &result {
        log_totals("month-year", groups);
    }
    json_or_500(result, "Failed to query month-year stats")
}

/// `GET /fires/stats/average-area-per-fire`
pub async fn average_area_stats(state: web::Data<AppState>) -> HttpResponse {
    let db = state.pool.acquire();
    json_or_500(
        queries::average_area_stats(db.as_ref()).await,
        "Failed to query average area stats",
    )
}

/// `GET /fires/stats/top-fires`
pub async fn top_fires(
    state: web::Data<AppState>,
    params: web::Query<TopFiresParams>,
) -> HttpResponse {
    let limit = match params.into_inner().validate() {
        Ok(limit) => limit,
        Err(e) => return bad_request(e),
    };

    let db = state.pool.acquire();
    json_or_500(
        queries::top_fires(db.as_ref(), limit).await,
        "Failed to query top fires",
    )
}

/// `GET /fires/stats/fire-duration`
pub async fn fire_duration_stats(state: web::Data<AppState>) -> HttpResponse {
    let db = state.pool.acquire();
    json_or_500(
        queries::fire_duration_stats(db.as_ref()).await,
        "Failed to query fire duration stats",
    )
}

/// `GET /fires/heatmap-points`
pub async fn heatmap_points(
    state: web::Data<AppState>,
    params: web::Query<HeatmapParams>,
) -> HttpResponse {
    let query = match params.into_inner().validate() {
        Ok(query) => query,
        Err(e) => return bad_request(e),
    };

    let db = state.pool.acquire();
    json_or_500(
        queries::heatmap_points(db.as_ref(), &query).await,
        "Failed to query heatmap points",
    )
}

/// `GET /fires/nearby`
///
/// Fires within `radius_km` of the query point, nearest first.
pub async fn nearby_fires(
    state: web::Data<AppState>,
    params: web::Query<NearbyParams>,
) -> HttpResponse {
    let query = match params.into_inner().validate() {
        Ok(query) => query,
        Err(e) => return bad_request(e),
    };

    let db = state.pool.acquire();
    json_or_500(
        queries::nearby_fires(db.as_ref(), &query).await,
        "Failed to query nearby fires",
    )
}

/// `GET /fires/export`
///
/// Streams the whole table as CSV. The response is produced chunk by
/// chunk, so memory stays bounded by [`EXPORT_BATCH_SIZE`] rows.
pub async fn export_fires(
    state: web::Data<AppState>,
    params: web::Query<ExportParams>,
) -> HttpResponse {
    if let Err(e) = params.validate() {
        return bad_request(e);
    }

    HttpResponse::Ok()
        .content_type("text/csv; charset=utf-8")
        .insert_header(ContentDisposition {
            disposition: DispositionType::Attachment,
            parameters: vec![DispositionParam::Filename("fires.csv".to_string())],
        })
        .streaming(csv_export_stream(state.pool.acquire()))
}

/// Keyset-paginated CSV chunks of the `fires` table. The stream owns its
/// leased connection until it finishes or the client goes away.
fn csv_export_stream(db: Arc<dyn Database>) -> impl Stream<Item = Result<web::Bytes, ExportError>> {
    async_stream::try_stream! {
        let mut after_id = 0;
        let mut first = true;
        let mut exported = 0usize;

        loop {
            let batch = queries::fetch_fires_after(db.as_ref(), after_id, EXPORT_BATCH_SIZE)
                .await
                .inspect_err(|e| log::error!("Export failed after {exported} rows: {e}"))?;

            if first || !batch.is_empty() {
                yield web::Bytes::from(encode_csv_chunk(&batch, first)?);
            }
            first = false;
            exported += batch.len();

            match batch.last() {
                Some(last) => after_id = last.fire_id,
                None => break,
            }

            if batch.len() < EXPORT_BATCH_SIZE as usize {
                break;
            }
        }

        log::debug!("Exported {exported} rows");
    }
}
