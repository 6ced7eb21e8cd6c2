#![forbid(unsafe_code)]

use super::SqliteStore;
use std::collections::BTreeSet;
use std::sync::Arc;
use tp_core::model::Collection;

/// Receives one call per affected collection after a client operation commits.
pub trait ChangeObserver: Send + Sync {
    fn on_change(&self, collection: Collection);
}

impl SqliteStore {
    pub fn subscribe(&mut self, observer: Arc<dyn ChangeObserver>) {
        self.observers.push(observer);
    }

    pub(super) fn notify(&self, collections: impl IntoIterator<Item = Collection>) {
        let collections: BTreeSet<Collection> = collections.into_iter().collect();
        for observer in &self.observers {
            for collection in &collections {
                observer.on_change(*collection);
            }
        }
    }
}
