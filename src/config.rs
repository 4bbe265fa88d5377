//! Environment-sourced configuration.
//!
//! Only three settings exist: the store root and the two database names.
//! The root has no default — the service cannot do anything useful without
//! its stores, so its absence is a fatal startup condition. The names carry
//! the defaults the scrape pipeline uses.

use anyhow::{Context, Result};
use std::env;
use std::path::{Path, PathBuf};

pub const ENV_DB_ROOT: &str = "TURISMO_DB_ROOT";
pub const ENV_DB_FOURSQUARE: &str = "TURISMO_DB_FOURSQUARE";
pub const ENV_DB_GOOGLE: &str = "TURISMO_DB_GOOGLE";

pub const DEFAULT_DB_FOURSQUARE: &str = "foursquare_scraping";
pub const DEFAULT_DB_GOOGLE: &str = "googlemaps_scraping";

#[derive(Debug, Clone)]
pub struct Config {
    /// Directory holding the store files.
    pub db_root: PathBuf,
    /// Database name of the location-discovery scrape.
    pub foursquare_db: String,
    /// Database name of the mapping-service scrape.
    pub google_db: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        let db_root = env::var(ENV_DB_ROOT)
            .with_context(|| format!("{} must be set", ENV_DB_ROOT))?
            .into();
        Ok(Self {
            db_root,
            foursquare_db: env::var(ENV_DB_FOURSQUARE)
                .unwrap_or_else(|_| DEFAULT_DB_FOURSQUARE.to_string()),
            google_db: env::var(ENV_DB_GOOGLE).unwrap_or_else(|_| DEFAULT_DB_GOOGLE.to_string()),
        })
    }

    /// Constructor used by tests and embedders that already know the paths.
    pub fn new(db_root: impl Into<PathBuf>, foursquare_db: &str, google_db: &str) -> Self {
        Self {
            db_root: db_root.into(),
            foursquare_db: foursquare_db.to_string(),
            google_db: google_db.to_string(),
        }
    }

    pub fn foursquare_path(&self) -> PathBuf {
        store_path(&self.db_root, &self.foursquare_db)
    }

    pub fn google_path(&self) -> PathBuf {
        store_path(&self.db_root, &self.google_db)
    }
}

fn store_path(root: &Path, name: &str) -> PathBuf {
    root.join(format!("{}.sqlite", name))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn store_paths_join_root_and_name() {
        let config = Config::new("/var/data", "foursquare_scraping", "googlemaps_scraping");
        assert_eq!(
            config.foursquare_path(),
            PathBuf::from("/var/data/foursquare_scraping.sqlite")
        );
        assert_eq!(
            config.google_path(),
            PathBuf::from("/var/data/googlemaps_scraping.sqlite")
        );
    }
}
