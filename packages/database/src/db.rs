//! Store selection from the environment.
//!
//! - `PORT_OPS_DATABASE`: path of a `SQLite` database. When set, calls are
//!   read from it.
//! - `PORT_OPS_FIXTURE`: path of a JSON fixture. With a database it is
//!   inserted when the database is empty; without one it backs an
//!   in-memory store.
//!
//! With neither set, an empty in-memory store is used.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::memory::MemoryVesselStore;
use crate::sqlite::SqliteVesselStore;
use crate::{DbError, VesselStore, fixtures};

/// Where vessel calls are read from.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StoreConfig {
    /// `SQLite` database file.
    pub database: Option<PathBuf>,
    /// JSON fixture file.
    pub fixture: Option<PathBuf>,
}

impl StoreConfig {
    /// Reads `PORT_OPS_DATABASE` and `PORT_OPS_FIXTURE`.
    #[must_use]
    pub fn from_env() -> Self {
        let path = |name: &str| {
            std::env::var(name)
                .ok()
                .filter(|v| !v.trim().is_empty())
                .map(PathBuf::from)
        };
        Self {
            database: path("PORT_OPS_DATABASE"),
            fixture: path("PORT_OPS_FIXTURE"),
        }
    }
}

/// Opens the store described by `config`.
///
/// # Errors
///
/// Returns [`DbError`] if the database or fixture cannot be opened.
pub async fn open_store(config: &StoreConfig) -> Result<Arc<dyn VesselStore>, DbError> {
    if let Some(database) = &config.database {
        let store = SqliteVesselStore::open(database).await?;
        if let Some(fixture) = &config.fixture {
            seed_if_empty(&store, fixture).await?;
        }
        log::info!("Using SQLite vessel store at {}", database.display());
        return Ok(Arc::new(store));
    }

    let calls = match &config.fixture {
        Some(fixture) => fixtures::load_fixture(fixture)?,
        None => {
            log::warn!("No PORT_OPS_DATABASE or PORT_OPS_FIXTURE set; starting with no data");
            Vec::new()
        }
    };
    log::info!("Using in-memory vessel store with {} calls", calls.len());
    Ok(Arc::new(MemoryVesselStore::new(calls)))
}

/// Opens the store configured by the environment.
///
/// # Errors
///
/// Returns [`DbError`] if the database or fixture cannot be opened.
pub async fn open_store_from_env() -> Result<Arc<dyn VesselStore>, DbError> {
    open_store(&StoreConfig::from_env()).await
}

async fn seed_if_empty(store: &SqliteVesselStore, fixture: &Path) -> Result<(), DbError> {
    if store.count().await? > 0 {
        log::debug!("Database already populated; not loading {}", fixture.display());
        return Ok(());
    }
    let calls = fixtures::load_fixture(fixture)?;
    let written = store.insert_calls(&calls).await?;
    log::info!("Seeded database with {written} calls from {}", fixture.display());
    Ok(())
}
