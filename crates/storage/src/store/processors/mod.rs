#![forbid(unsafe_code)]

//! The ordered processor chain run around every task row mutation.
//!
//! For each row: all `before_*` hooks in chain order, then the commit, then
//! all `after_*` hooks in chain order. A `before_*` error aborts the row and
//! the enclosing transaction. `after_*` hooks see the committed change-set
//! read-only and may only perform independent writes.

mod auto_update;
mod instances;
mod local_purge;
mod relation;
mod search;
mod validator;

pub use auto_update::AutoUpdate;
pub use instances::InstanceMaterializer;
pub use local_purge::LocalPurge;
pub use relation::ListMoveEmulator;
pub use search::SearchIndexer;
pub use validator::Validator;

use super::{StoreConfig, StoreError, TaskChangeSet};
use rusqlite::Transaction;
use std::fmt;
use tp_core::ngrams::NGramGenerator;

/// Everything a processor may use besides the change-set itself.
pub struct ProcessorContext<'a> {
    tx: &'a Transaction<'a>,
    config: &'a StoreConfig,
    ngrams: &'a NGramGenerator,
    now_ms: i64,
}

impl<'a> ProcessorContext<'a> {
    pub(crate) fn new(
        tx: &'a Transaction<'a>,
        config: &'a StoreConfig,
        ngrams: &'a NGramGenerator,
        now_ms: i64,
    ) -> Self {
        Self {
            tx,
            config,
            ngrams,
            now_ms,
        }
    }

    pub fn tx(&self) -> &Transaction<'a> {
        self.tx
    }

    pub fn config(&self) -> &StoreConfig {
        self.config
    }

    pub fn ngrams(&self) -> &NGramGenerator {
        self.ngrams
    }

    /// Wall-clock time of the enclosing operation, shared by every row.
    pub fn now_ms(&self) -> i64 {
        self.now_ms
    }
}

#[allow(unused_variables)]
pub trait TaskProcessor: Send {
    fn name(&self) -> &'static str;

    fn before_insert(
        &self,
        ctx: &ProcessorContext<'_>,
        task: &mut TaskChangeSet,
        trusted: bool,
    ) -> Result<(), StoreError> {
        Ok(())
    }

    fn after_insert(
        &self,
        ctx: &ProcessorContext<'_>,
        task: &TaskChangeSet,
        trusted: bool,
    ) -> Result<(), StoreError> {
        Ok(())
    }

    fn before_update(
        &self,
        ctx: &ProcessorContext<'_>,
        task: &mut TaskChangeSet,
        trusted: bool,
    ) -> Result<(), StoreError> {
        Ok(())
    }

    fn after_update(
        &self,
        ctx: &ProcessorContext<'_>,
        task: &TaskChangeSet,
        trusted: bool,
    ) -> Result<(), StoreError> {
        Ok(())
    }

    fn before_delete(
        &self,
        ctx: &ProcessorContext<'_>,
        task: &mut TaskChangeSet,
        trusted: bool,
    ) -> Result<(), StoreError> {
        Ok(())
    }

    fn after_delete(
        &self,
        ctx: &ProcessorContext<'_>,
        task: &TaskChangeSet,
        trusted: bool,
    ) -> Result<(), StoreError> {
        Ok(())
    }
}

/// An explicit, ordered set of processors.
#[derive(Default)]
pub struct ProcessorChain {
    processors: Vec<Box<dyn TaskProcessor>>,
}

impl ProcessorChain {
    pub fn empty() -> Self {
        Self::default()
    }

    /// Validator, AutoUpdate, Relation, Instance, Search, LocalPurge.
    pub fn standard() -> Self {
        Self::empty()
            .with(Validator)
            .with(AutoUpdate)
            .with(ListMoveEmulator)
            .with(InstanceMaterializer)
            .with(SearchIndexer)
            .with(LocalPurge)
    }

    pub fn with(mut self, processor: impl TaskProcessor + 'static) -> Self {
        self.processors.push(Box::new(processor));
        self
    }

    pub fn names(&self) -> Vec<&'static str> {
        self.processors.iter().map(|processor| processor.name()).collect()
    }

    pub(crate) fn before_insert(
        &self,
        ctx: &ProcessorContext<'_>,
        task: &mut TaskChangeSet,
        trusted: bool,
    ) -> Result<(), StoreError> {
        for processor in &self.processors {
            processor.before_insert(ctx, task, trusted)?;
        }
        Ok(())
    }

    pub(crate) fn after_insert(
        &self,
        ctx: &ProcessorContext<'_>,
        task: &TaskChangeSet,
        trusted: bool,
    ) -> Result<(), StoreError> {
        for processor in &self.processors {
            processor.after_insert(ctx, task, trusted)?;
        }
        Ok(())
    }

    pub(crate) fn before_update(
        &self,
        ctx: &ProcessorContext<'_>,
        task: &mut TaskChangeSet,
        trusted: bool,
    ) -> Result<(), StoreError> {
        for processor in &self.processors {
            processor.before_update(ctx, task, trusted)?;
        }
        Ok(())
    }

    pub(crate) fn after_update(
        &self,
        ctx: &ProcessorContext<'_>,
        task: &TaskChangeSet,
        trusted: bool,
    ) -> Result<(), StoreError> {
        for processor in &self.processors {
            processor.after_update(ctx, task, trusted)?;
        }
        Ok(())
    }

    pub(crate) fn before_delete(
        &self,
        ctx: &ProcessorContext<'_>,
        task: &mut TaskChangeSet,
        trusted: bool,
    ) -> Result<(), StoreError> {
        for processor in &self.processors {
            processor.before_delete(ctx, task, trusted)?;
        }
        Ok(())
    }

    pub(crate) fn after_delete(
        &self,
        ctx: &ProcessorContext<'_>,
        task: &TaskChangeSet,
        trusted: bool,
    ) -> Result<(), StoreError> {
        for processor in &self.processors {
            processor.after_delete(ctx, task, trusted)?;
        }
        Ok(())
    }
}

impl fmt::Debug for ProcessorChain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.names()).finish()
    }
}
