//! Store connections.
//!
//! Two independently-configured SQLite files, one per scrape source. The
//! collections are externally owned and this layer never writes to them;
//! both pools are opened read-only at process start and handed to the
//! request handlers (no ambient globals).

use anyhow::{Context, Result};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use std::path::Path;
use std::str::FromStr;

use crate::config::Config;

/// The two document stores, constructed once and shared by all handlers.
#[derive(Clone)]
pub struct Stores {
    pub foursquare: SqlitePool,
    pub google: SqlitePool,
}

impl Stores {
    /// Closes both pools. Called on shutdown after the listener drains.
    pub async fn close(&self) {
        self.foursquare.close().await;
        self.google.close().await;
    }
}

pub async fn connect(config: &Config) -> Result<Stores> {
    let foursquare = open(&config.foursquare_path())
        .await
        .with_context(|| format!("opening store {}", config.foursquare_path().display()))?;
    let google = open(&config.google_path())
        .await
        .with_context(|| format!("opening store {}", config.google_path().display()))?;
    Ok(Stores { foursquare, google })
}

async fn open(path: &Path) -> Result<SqlitePool> {
    let options =
        SqliteConnectOptions::from_str(&format!("sqlite:{}", path.display()))?.read_only(true);

    let pool = SqlitePoolOptions::new()
        .max_connections(5)
        .connect_with(options)
        .await?;

    Ok(pool)
}

/// Liveness probe used by `GET /ping`: one trivial query per store.
pub async fn ping(pool: &SqlitePool) -> Result<(), sqlx::Error> {
    sqlx::query("SELECT 1").fetch_one(pool).await?;
    Ok(())
}
