#![forbid(unsafe_code)]

use super::super::support::now_ms;
use super::super::*;
use tp_core::model::{Collection, TaskValues};
use tracing::{debug, instrument};

impl SqliteStore {
    /// Inserts one task through the processor chain and returns its id.
    #[instrument(skip(self, values), fields(fields = values.len()))]
    pub fn run_insert(&mut self, values: TaskValues, trusted: bool) -> Result<i64, StoreError> {
        let tx = self.conn.transaction()?;
        let ctx = ProcessorContext::new(&tx, &self.config, &self.ngrams, now_ms());

        let mut task = TaskChangeSet::for_insert(values);
        self.chain.before_insert(&ctx, &mut task, trusted)?;
        task.commit(&tx)?;
        let task_id = task.id().ok_or(StoreError::UnknownId)?;
        debug!(task_id, trusted, "inserted task");
        self.chain.after_insert(&ctx, &task, trusted)?;

        tx.commit()?;
        self.notify([Collection::Tasks, Collection::Instances]);
        Ok(task_id)
    }
}
