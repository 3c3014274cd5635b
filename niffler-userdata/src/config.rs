use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use tracing::info;

use crate::store::{IdentityStore, MemoryStore, SledStore};

/// Niffler user data service.
#[derive(Parser, Debug, Clone)]
#[command(name = "niffler-userdata", about = "Niffler user data service")]
pub struct Config {
    /// Port to listen on (127.0.0.1).
    #[arg(long, env = "NIFFLER_USERDATA_PORT", default_value_t = 8089)]
    pub port: u16,

    /// Directory of the sled database.
    #[arg(long, env = "NIFFLER_USERDATA_DB", default_value = "niffler-userdata.sled")]
    pub db_path: PathBuf,

    /// Keep everything in memory; nothing is written to disk.
    #[arg(long)]
    pub in_memory: bool,

    /// Delete the database directory before opening it.
    #[arg(long)]
    pub fresh: bool,
}

impl Config {
    pub fn addr(&self) -> SocketAddr {
        SocketAddr::from(([127, 0, 0, 1], self.port))
    }

    pub fn open_store(&self) -> anyhow::Result<Arc<dyn IdentityStore>> {
        if self.in_memory {
            info!("using in-memory identity store");
            return Ok(Arc::new(MemoryStore::new()));
        }
        if self.fresh && self.db_path.exists() {
            info!("removing {}", self.db_path.display());
            std::fs::remove_dir_all(&self.db_path)
                .with_context(|| format!("removing {}", self.db_path.display()))?;
        }
        let store = SledStore::open(&self.db_path)
            .with_context(|| format!("opening sled store at {}", self.db_path.display()))?;
        Ok(Arc::new(store))
    }
}

#[cfg(test)]
mod tests {
    use clap::CommandFactory;

    use super::*;

    fn declared_default(id: &str) -> Option<String> {
        Config::command()
            .get_arguments()
            .find(|arg| arg.get_id().as_str() == id)
            .and_then(|arg| {
                arg.get_default_values()
                    .first()
                    .map(|value| value.to_string_lossy().into_owned())
            })
    }

    #[test]
    fn defaults() {
        assert_eq!(declared_default("port").as_deref(), Some("8089"));
        assert_eq!(declared_default("db_path").as_deref(), Some("niffler-userdata.sled"));

        let config = Config::try_parse_from(["niffler-userdata", "--port", "8089"]).unwrap();
        assert!(!config.in_memory);
        assert!(!config.fresh);
        assert_eq!(config.addr().to_string(), "127.0.0.1:8089");
    }

    #[test]
    fn in_memory_store_starts_empty() {
        let config = Config::try_parse_from(["niffler-userdata", "--in-memory"]).unwrap();
        let store = config.open_store().unwrap();
        assert!(store.find_all_except("dima", None).unwrap().is_empty());
    }

    #[test]
    fn fresh_removes_existing_database() {
        let dir = tempfile::tempdir().unwrap();
        let db_path = dir.path().join("db");
        let config = Config::try_parse_from([
            "niffler-userdata",
            "--db-path",
            db_path.to_str().unwrap(),
            "--fresh",
        ])
        .unwrap();

        std::fs::create_dir_all(&db_path).unwrap();
        std::fs::write(db_path.join("stale"), b"left over").unwrap();

        let store = config.open_store().unwrap();
        assert!(!db_path.join("stale").exists());
        assert_eq!(store.find_by_username("dima").unwrap(), None);
    }
}
