#![forbid(unsafe_code)]

use super::{ProcessorContext, TaskProcessor};
use crate::store::support::hard_delete_task_tx;
use crate::store::{StoreError, TaskChangeSet};
use tp_core::model::TaskField;
use tracing::debug;

/// Turns soft deletes in the device-local account into hard deletes; no sync
/// adapter will ever finish them.
#[derive(Clone, Copy, Debug, Default)]
pub struct LocalPurge;

impl TaskProcessor for LocalPurge {
    fn name(&self) -> &'static str {
        "local_purge"
    }

    fn after_delete(
        &self,
        ctx: &ProcessorContext<'_>,
        task: &TaskChangeSet,
        trusted: bool,
    ) -> Result<(), StoreError> {
        if trusted {
            return Ok(());
        }
        let Some(task_id) = task.id() else {
            return Ok(());
        };
        if task.text(TaskField::AccountType)? != Some(ctx.config().local_account_type.as_str()) {
            return Ok(());
        }
        hard_delete_task_tx(ctx.tx(), task_id)?;
        debug!(task_id, "purged local task");
        Ok(())
    }
}
