use std::path::PathBuf;

use nav_engine::{default_catalog, EngineConfig, ZoneCatalog, ZoneRegistry};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use super::loop_runner::{AppError, HostConfig};
use super::router::{HomeRouter, Session};

const ROLE_ENV_VAR: &str = "PIXELMED_ROLE";
const SESSION_TOKEN_ENV_VAR: &str = "PIXELMED_SESSION_TOKEN";
const ZONE_CATALOG_ENV_VAR: &str = "PIXELMED_ZONE_CATALOG";
const ASSET_ROOT_ENV_VAR: &str = "PIXELMED_ASSET_ROOT";
const DEFAULT_ASSET_ROOT: &str = "assets";

pub(crate) struct AppWiring {
    pub(crate) host: HostConfig,
    pub(crate) engine: EngineConfig,
    pub(crate) registry: ZoneRegistry,
    pub(crate) router: HomeRouter,
}

pub(crate) fn build_app() -> Result<AppWiring, AppError> {
    init_tracing();
    info!("=== PixelMed Home Startup ===");

    let engine = EngineConfig::from_process_env();
    let catalog = match env_non_empty(ZONE_CATALOG_ENV_VAR) {
        Some(path) => ZoneCatalog::load_json_file(&PathBuf::from(path))?,
        None => default_catalog(),
    };
    let registry = ZoneRegistry::new(catalog);
    if registry.is_empty() {
        warn!("zone_catalog_empty");
    }

    let session = Session::new(
        env_non_empty(SESSION_TOKEN_ENV_VAR),
        env_non_empty(ROLE_ENV_VAR),
    );
    if !session.is_present() {
        warn!(
            var = SESSION_TOKEN_ENV_VAR,
            "no session token; home screen will redirect to login"
        );
    }

    let host = HostConfig {
        asset_root: env_non_empty(ASSET_ROOT_ENV_VAR)
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_ASSET_ROOT)),
        ..HostConfig::default()
    };
    info!(
        zone_count = registry.len(),
        asset_root = %host.asset_root.display(),
        "home_wiring"
    );

    Ok(AppWiring {
        host,
        engine,
        registry,
        router: HomeRouter::new(session),
    })
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_names(true)
        .compact()
        .init();
}

fn env_non_empty(var: &str) -> Option<String> {
    std::env::var(var)
        .ok()
        .map(|raw| raw.trim().to_string())
        .filter(|value| !value.is_empty())
}
