#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Actix-Web API server for the wildfire map.
//!
//! Serves the read-only `/fires` REST API: filtered and paginated listings,
//! aggregate statistics, heatmap points, a radius search and a streamed CSV
//! export. Every request leases a connection from a fixed-size
//! [`DbPool`].

mod handlers;

use actix_cors::Cors;
use actix_web::error::InternalError;
use actix_web::{App, HttpResponse, HttpServer, middleware, web};
use wildfire_map_config::AppConfig;
use wildfire_map_database::db::DbPool;
use wildfire_map_database::{DbError, run_migrations};
use wildfire_map_server_models::ApiError;

/// Shared application state.
pub struct AppState {
    /// Pooled `PostgreSQL` connections.
    pub pool: DbPool,
}

/// Errors that prevent the server from starting.
#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    /// The database could not be reached.
    #[error("Failed to connect to database: {0}")]
    Connect(String),

    /// Applying migrations failed.
    #[error(transparent)]
    Migration(#[from] DbError),

    /// Binding or running the HTTP server failed.
    #[error("HTTP server error: {0}")]
    Io(#[from] std::io::Error),
}

/// Starts the wildfire map API server.
///
/// Opens the connection pool, runs migrations, and serves until shutdown.
/// The caller provides the async runtime (e.g. via `#[actix_web::main]`).
///
/// # Errors
///
/// Returns [`ServerError`] if the database is unreachable, a migration
/// fails, or the listener cannot be bound. Nothing is bound when the
/// database check fails.
#[allow(clippy::future_not_send)]
pub async fn run_server(config: AppConfig) -> Result<(), ServerError> {
    log::info!("Connecting to database...");
    let pool = DbPool::connect(&config.database, config.server.pool_size)
        .await
        .map_err(|e| ServerError::Connect(e.to_string()))?;

    log::info!("Running migrations...");
    run_migrations(pool.acquire().as_ref()).await?;

    let state = web::Data::new(AppState { pool });

    let bind_addr = config.server.bind_addr;
    let port = config.server.port;

    log::info!("Starting server on {bind_addr}:{port}");

    HttpServer::new(move || {
        let cors = Cors::permissive();

        App::new()
            .wrap(cors)
            .wrap(middleware::Logger::default())
            .app_data(state.clone())
            .app_data(query_config())
            .configure(routes)
    })
    .bind((bind_addr, port))?
    .run()
    .await?;

    Ok(())
}

/// Registers every API route.
pub fn routes(cfg: &mut web::ServiceConfig) {
    cfg.route("/", web::get().to(handlers::root))
        .route("/health", web::get().to(handlers::health))
        .service(
            web::scope("/fires")
                .route("/", web::get().to(handlers::list_fires))
                .route("", web::get().to(handlers::list_fires))
                .route("/paginated", web::get().to(handlers::paginated_fires))
                .route("/stats/regions", web::get().to(handlers::region_stats))
                .route("/stats/years", web::get().to(handlers::year_stats))
                .route("/stats/types", web::get().to(handlers::fire_type_stats))
                .route("/stats/region-year", web::get().to(handlers::region_year_stats))
                .route("/stats/month-year", web::get().to(handlers::month_year_stats))
                .route(
                    "/stats/average-area-per-fire",
                    web::get().to(handlers::average_area_stats),
                )
                .route("/stats/top-fires", web::get().to(handlers::top_fires))
                .route("/stats/fire-duration", web::get().to(handlers::fire_duration_stats))
                .route("/heatmap-points", web::get().to(handlers::heatmap_points))
                .route("/nearby", web::get().to(handlers::nearby_fires))
                .route("/export", web::get().to(handlers::export_fires)),
        );
}

/// Rejects malformed query strings with a JSON 400 instead of actix's
/// plain-text default.
fn query_config() -> web::QueryConfig {
    web::QueryConfig::default().error_handler(|err, _req| {
        let response = HttpResponse::BadRequest().json(ApiError::new(err.to_string()));
        InternalError::from_response(err, response).into()
    })
}

#[cfg(test)]
mod tests {
    use actix_web::{App, HttpResponse, http::StatusCode, test, web};
    use wildfire_map_server_models::{ApiError, ApiHealth, ApiRoot, NearbyParams};

    use super::*;

    async fn echo_nearby(params: web::Query<NearbyParams>) -> HttpResponse {
        match params.into_inner().validate() {
            Ok(query) => HttpResponse::Ok().json(query.limit),
            Err(e) => HttpResponse::BadRequest().json(ApiError::from(e)),
        }
    }

    #[actix_web::test]
    async fn root_and_health() {
        let app = test::init_service(App::new().configure(routes)).await;

        let root: ApiRoot =
            test::call_and_read_body_json(&app, test::TestRequest::get().uri("/").to_request())
                .await;
        assert_eq!(root.message, "Wildfire Tracking API");

        let health: ApiHealth = test::call_and_read_body_json(
            &app,
            test::TestRequest::get().uri("/health").to_request(),
        )
        .await;
        assert!(health.healthy);
    }

    #[actix_web::test]
    async fn malformed_query_is_a_json_400() {
        let app = test::init_service(
            App::new()
                .app_data(query_config())
                .route("/nearby", web::get().to(echo_nearby)),
        )
        .await;

        let req = test::TestRequest::get()
            .uri("/nearby?longitude=10")
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        let body: ApiError = test::read_body_json(resp).await;
        assert!(body.error.contains("latitude"), "{}", body.error);

        let req = test::TestRequest::get()
            .uri("/nearby?latitude=95&longitude=10")
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

        let req = test::TestRequest::get()
            .uri("/nearby?latitude=55.7&longitude=37.6&limit=5")
            .to_request();
        let limit: u32 = test::call_and_read_body_json(&app, req).await;
        assert_eq!(limit, 5);
    }
}
