#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions)]

//! `PostgreSQL` access for the wildfire map.
//!
//! Everything goes through `switchy_database` raw parameterized SQL: user
//! values always travel as `$n` bind parameters. The `fires` table is
//! created by an embedded `switchy_schema` migration, applied by both the
//! loader and the server before they touch the table.

pub mod db;
pub mod export;
pub mod queries;

use include_dir::{Dir, include_dir};
use moosicbox_json_utils::database::ToValue as _;
use switchy_database::{Database, DatabaseValue};
use switchy_schema::discovery::embedded::EmbeddedMigrationSource;
use switchy_schema::runner::MigrationRunner;

/// Embedded SQL migrations from the `migrations/` directory.
static MIGRATIONS_DIR: Dir<'_> = include_dir!("$CARGO_MANIFEST_DIR/../../migrations");

/// Tables the queries rely on.
const REQUIRED_TABLES: [&str; 1] = ["fires"];

/// Errors that can occur during database operations.
#[derive(Debug, thiserror::Error)]
pub enum DbError {
    /// Query or connection error.
    #[error("Database error: {0}")]
    Database(#[from] switchy_database::DatabaseError),

    /// A migration failed to apply.
    #[error("Migration error: {0}")]
    Migration(#[from] switchy_schema::MigrationError),

    /// A table is still absent after migrating.
    #[error("Table {0} does not exist after running migrations")]
    MissingTable(&'static str),

    /// A column value could not be converted.
    #[error("Data conversion error: {message}")]
    Conversion {
        /// Description of what went wrong.
        message: String,
    },
}

/// Applies pending migrations, then checks that every table the queries
/// need is present.
///
/// # Errors
///
/// Returns [`DbError`] if a migration fails or a required table is
/// missing afterwards.
pub async fn run_migrations(db: &dyn Database) -> Result<(), DbError> {
    let runner = MigrationRunner::new(Box::new(EmbeddedMigrationSource::new(&MIGRATIONS_DIR)));
    runner.run(db).await?;

    for table in REQUIRED_TABLES {
        let rows = db
            .query_raw_params(
                "SELECT to_regclass($1) IS NOT NULL AS present",
                &[DatabaseValue::String(format!("public.{table}"))],
            )
            .await?;

        let present = rows
            .first()
            .and_then(|row| row.to_value::<bool>("present").ok())
            .unwrap_or(false);
        if !present {
            return Err(DbError::MissingTable(table));
        }
    }

    log::info!("Schema is up to date");
    Ok(())
}
