//! Database connection utilities.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use switchy_database::Database;
use switchy_database_connection::Credentials;
use wildfire_map_config::DatabaseConfig;

/// Opens a new connection to the database described by `config`.
///
/// Configures a 120-second `statement_timeout` so stalled queries fail with
/// an error instead of hanging indefinitely.
///
/// # Errors
///
/// Returns an error if the credentials are malformed or the connection
/// fails.
pub async fn connect(config: &DatabaseConfig) -> Result<Box<dyn Database>, Box<dyn std::error::Error>> {
    log::debug!(
        "Connecting to postgres at {}:{}/{}",
        config.host,
        config.port,
        config.name
    );

    let creds = Credentials::from_url(&config.connection_url())?;
    let db = switchy_database_connection::init_postgres_raw_native_tls(creds).await?;

    db.exec_raw("SET statement_timeout = '120s'").await?;

    Ok(db)
}

/// Fixed-size round-robin pool of database connections.
///
/// Each request leases a connection with [`DbPool::acquire`]; the lease is
/// a reference-counted handle, so it is released when the handler (or the
/// export stream holding it) drops it.
pub struct DbPool {
    connections: Vec<Arc<dyn Database>>,
    next: AtomicUsize,
}

impl DbPool {
    /// Opens `size` connections (at least one) to the configured database.
    ///
    /// # Errors
    ///
    /// Returns an error if any connection fails to open.
    pub async fn connect(
        config: &DatabaseConfig,
        size: usize,
    ) -> Result<Self, Box<dyn std::error::Error>> {
        let size = size.max(1);
        let mut connections: Vec<Arc<dyn Database>> = Vec::with_capacity(size);
        for _ in 0..size {
            connections.push(Arc::from(connect(config).await?));
        }
        log::info!("Opened {size} pooled database connections");
        Ok(Self::from_connections(connections))
    }

    /// Wraps already-open connections.
    ///
    /// # Panics
    ///
    /// Panics if `connections` is empty.
    #[must_use]
    pub fn from_connections(connections: Vec<Arc<dyn Database>>) -> Self {
        assert!(!connections.is_empty(), "DbPool needs at least one connection");
        Self {
            connections,
            next: AtomicUsize::new(0),
        }
    }

    /// Leases the next connection from the pool (round-robin).
    #[must_use]
    pub fn acquire(&self) -> Arc<dyn Database> {
        let idx = self.next.fetch_add(1, Ordering::Relaxed) % self.connections.len();
        Arc::clone(&self.connections[idx])
    }
}
