#![forbid(unsafe_code)]

use super::super::support::{load_task_values, now_ms, task_ids_where};
use super::super::*;
use rusqlite::params;
use tp_core::model::{Collection, TaskValues};
use tracing::{debug, info, instrument};

impl SqliteStore {
    /// Applies `values` to every matched task, one row at a time.
    ///
    /// Ids that do not resolve to a row are skipped; the return value counts
    /// the rows that went through the chain.
    #[instrument(skip(self, task_ids, values), fields(rows = task_ids.len(), fields = values.len()))]
    pub fn run_update(
        &mut self,
        task_ids: &[i64],
        values: TaskValues,
        trusted: bool,
    ) -> Result<usize, StoreError> {
        let tx = self.conn.transaction()?;
        let ctx = ProcessorContext::new(&tx, &self.config, &self.ngrams, now_ms());

        let mut affected = 0usize;
        for &task_id in task_ids {
            let Some(stored) = load_task_values(&tx, task_id)? else {
                continue;
            };
            debug!(task_id, trusted, "updating task");

            let mut task = TaskChangeSet::for_update(task_id, stored, values.clone());
            self.chain.before_update(&ctx, &mut task, trusted)?;
            task.commit(&tx)?;
            self.chain.after_update(&ctx, &task, trusted)?;
            affected += 1;
        }

        tx.commit()?;
        if affected > 0 {
            self.notify([Collection::Tasks, Collection::Instances]);
        }
        Ok(affected)
    }

    /// Re-runs every live task through the chain as a trusted empty update so
    /// derived rows pick up new timezone rules.
    pub fn refresh_all_tasks(&mut self) -> Result<usize, StoreError> {
        let task_ids = task_ids_where(&self.conn, "deleted = 0", params![])?;
        let refreshed = self.run_update(&task_ids, TaskValues::new(), true)?;
        info!(refreshed, "refreshed derived task rows");
        Ok(refreshed)
    }
}
