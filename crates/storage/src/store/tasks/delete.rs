#![forbid(unsafe_code)]

use super::super::support::{hard_delete_task_tx, load_task_values, now_ms, soft_delete_task_tx};
use super::super::*;
use tp_core::model::Collection;
use tracing::{debug, instrument};

impl SqliteStore {
    /// Deletes the matched tasks.
    ///
    /// Trusted callers remove rows outright. Other callers mark them deleted
    /// and dirty for the sync adapter, unless a processor purges them.
    #[instrument(skip(self, task_ids), fields(rows = task_ids.len()))]
    pub fn run_delete(&mut self, task_ids: &[i64], trusted: bool) -> Result<usize, StoreError> {
        let tx = self.conn.transaction()?;
        let ctx = ProcessorContext::new(&tx, &self.config, &self.ngrams, now_ms());

        let mut affected = 0usize;
        for &task_id in task_ids {
            let Some(stored) = load_task_values(&tx, task_id)? else {
                continue;
            };
            debug!(task_id, trusted, "deleting task");

            let mut task = TaskChangeSet::read_only(task_id, stored);
            self.chain.before_delete(&ctx, &mut task, trusted)?;
            if trusted {
                hard_delete_task_tx(&tx, task_id)?;
            } else {
                soft_delete_task_tx(&tx, task_id)?;
            }
            self.chain.after_delete(&ctx, &task, trusted)?;
            affected += 1;
        }

        tx.commit()?;
        if affected > 0 {
            self.notify([Collection::Tasks, Collection::Instances]);
        }
        Ok(affected)
    }
}
