#![forbid(unsafe_code)]

mod change_set;
mod config;
mod error;
mod lists;
mod notify;
mod processors;
mod properties;
mod requests;
mod search;
mod support;
mod tasks;

pub use change_set::TaskChangeSet;
pub use config::{NgramConfig, SearchConfig, StoreConfig};
pub use error::StoreError;
pub use notify::ChangeObserver;
pub use processors::{
    AutoUpdate, InstanceMaterializer, ListMoveEmulator, LocalPurge, ProcessorChain,
    ProcessorContext, SearchIndexer, TaskProcessor, Validator,
};
pub use properties::{
    AlarmHandler, CategoryHandler, CommentHandler, PropertyHandler, RelationHandler,
};
pub use requests::*;

use rusqlite::Connection;
use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use support::{SCHEMA_VERSION, install_schema};
use tp_core::ngrams::NGramGenerator;
use tracing::info;

pub struct SqliteStore {
    conn: Connection,
    storage_dir: PathBuf,
    config: StoreConfig,
    ngrams: NGramGenerator,
    chain: ProcessorChain,
    handlers: BTreeMap<&'static str, Box<dyn PropertyHandler>>,
    observers: Vec<Arc<dyn ChangeObserver>>,
}

impl SqliteStore {
    pub fn open(storage_dir: impl AsRef<Path>) -> Result<Self, StoreError> {
        Self::open_with(storage_dir, StoreConfig::default(), ProcessorChain::standard())
    }

    pub fn open_with(
        storage_dir: impl AsRef<Path>,
        config: StoreConfig,
        chain: ProcessorChain,
    ) -> Result<Self, StoreError> {
        config.validate()?;
        let storage_dir = storage_dir.as_ref().to_path_buf();
        std::fs::create_dir_all(&storage_dir)?;

        let db_path = storage_dir.join(&config.database_file);
        let conn = Connection::open(&db_path)?;
        conn.busy_timeout(Duration::from_millis(config.busy_timeout_ms))?;
        conn.execute_batch("PRAGMA foreign_keys = ON;")?;

        install_schema(&conn)?;
        info!(
            path = %db_path.display(),
            schema_version = SCHEMA_VERSION,
            processors = ?chain.names(),
            "opened task store"
        );

        let ngrams = config.ngrams.generator();
        let mut store = Self {
            conn,
            storage_dir,
            config,
            ngrams,
            chain,
            handlers: BTreeMap::new(),
            observers: Vec::new(),
        };
        store.register_property_handler(CategoryHandler);
        store.register_property_handler(CommentHandler);
        store.register_property_handler(AlarmHandler);
        store.register_property_handler(RelationHandler);
        Ok(store)
    }

    pub fn storage_dir(&self) -> &Path {
        &self.storage_dir
    }

    pub fn config(&self) -> &StoreConfig {
        &self.config
    }

    /// Registers a handler, replacing any earlier one for the same mimetype.
    pub fn register_property_handler(&mut self, handler: impl PropertyHandler + 'static) {
        self.handlers.insert(handler.mimetype(), Box::new(handler));
    }
}

impl fmt::Debug for SqliteStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SqliteStore")
            .field("storage_dir", &self.storage_dir)
            .field("config", &self.config)
            .field("chain", &self.chain)
            .field("handlers", &self.handlers.keys().collect::<Vec<_>>())
            .field("observers", &self.observers.len())
            .finish_non_exhaustive()
    }
}
