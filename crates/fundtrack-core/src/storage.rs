//! Watchlist persistence as a two-column CSV file.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::{StorageError, Symbol};

/// Header row written at the top of every watchlist file.
pub const WATCHLIST_FIELDS: [&str; 2] = ["symbol", "name"];

/// One tracked symbol and its optional display name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WatchlistEntry {
    pub symbol: Symbol,
    #[serde(default)]
    pub name: Option<String>,
}

impl WatchlistEntry {
    pub fn new(symbol: Symbol, name: Option<String>) -> Self {
        Self {
            symbol,
            name: name
                .map(|value| value.trim().to_owned())
                .filter(|value| !value.is_empty()),
        }
    }
}

/// File-backed watchlist. The whole file is rewritten on every save.
#[derive(Debug, Clone)]
pub struct WatchlistStore {
    path: PathBuf,
}

impl WatchlistStore {
    /// Open the store at `path`, creating a header-only file if none exists.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, StorageError> {
        let path = path.into();
        if path.extension().and_then(|ext| ext.to_str()) != Some("csv") {
            return Err(StorageError::UnsupportedFileType { path });
        }

        let store = Self { path };
        if !store.path.exists() {
            debug!(path = %store.path.display(), "creating watchlist file");
            store.save(&[])?;
        }
        Ok(store)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read every row. A symbol listed more than once keeps its first row.
    pub fn load(&self) -> Result<Vec<WatchlistEntry>, StorageError> {
        let mut reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .flexible(true)
            .from_path(&self.path)?;

        let mut entries: Vec<WatchlistEntry> = Vec::new();
        for row in reader.deserialize::<WatchlistEntry>() {
            let row = row?;
            if entries.iter().any(|entry| entry.symbol == row.symbol) {
                warn!(
                    path = %self.path.display(),
                    symbol = %row.symbol,
                    "skipping duplicate watchlist row"
                );
                continue;
            }
            entries.push(WatchlistEntry::new(row.symbol, row.name));
        }

        debug!(path = %self.path.display(), count = entries.len(), "loaded watchlist");
        Ok(entries)
    }

    pub fn save(&self, entries: &[WatchlistEntry]) -> Result<(), StorageError> {
        let mut writer = csv::WriterBuilder::new()
            .has_headers(false)
            .from_path(&self.path)?;

        writer.write_record(WATCHLIST_FIELDS)?;
        for entry in entries {
            writer.serialize(entry)?;
        }
        writer.flush().map_err(|source| StorageError::Io {
            path: self.path.clone(),
            source,
        })?;

        debug!(path = %self.path.display(), count = entries.len(), "saved watchlist");
        Ok(())
    }
}
