#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Binary entry point for the wildfire map API server.
//!
//! Settings come from the environment, or from the TOML file named by
//! `WILDFIRE_MAP_CONFIG` when it is set.

use std::path::PathBuf;

use wildfire_map_config::AppConfig;

#[actix_web::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    pretty_env_logger::init_custom_env("RUST_LOG");

    let config_path = std::env::var_os("WILDFIRE_MAP_CONFIG").map(PathBuf::from);
    let config = AppConfig::load(config_path.as_deref())?;

    wildfire_map_server::run_server(config).await?;

    Ok(())
}
