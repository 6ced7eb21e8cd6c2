#![forbid(unsafe_code)]

//! Emulates moving a task between lists for sync origins that only know
//! insert and delete.
//!
//! A task that was ever synced leaves behind a tombstone in its old list (a
//! deleted, dirty copy carrying the old sync identity) and continues in the
//! new list as a never-synced row. Recurrence sets move as a whole: the
//! master first, then its other exceptions, then the edited task. Exception
//! tombstones link to the master's tombstone.

use super::{ProcessorContext, TaskProcessor};
use crate::store::support::{exception_ids_tx, load_task_values};
use crate::store::{StoreError, TaskChangeSet};
use std::collections::VecDeque;
use tp_core::model::{FieldValue, TaskField, TaskValues};
use tracing::info;

#[derive(Clone, Copy, Debug, Default)]
pub struct ListMoveEmulator;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Subject {
    /// The change-set the caller is editing; committed by the pipeline.
    Edited,
    /// Another row of the same recurrence set; committed here.
    Stored(i64),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
struct MoveStep {
    subject: Subject,
    is_master: bool,
}

impl TaskProcessor for ListMoveEmulator {
    fn name(&self) -> &'static str {
        "relation"
    }

    fn before_update(
        &self,
        ctx: &ProcessorContext<'_>,
        task: &mut TaskChangeSet,
        trusted: bool,
    ) -> Result<(), StoreError> {
        if trusted || !task.is_touched(TaskField::ListId) {
            return Ok(());
        }
        let Some(new_list) = task.integer(TaskField::ListId)? else {
            return Ok(());
        };
        if task.old_integer(TaskField::ListId) == Some(new_list) {
            return Ok(());
        }

        let mut queue = plan_moves(ctx, task)?;
        let mut master_tombstone: Option<i64> = None;

        while let Some(step) = queue.pop_front() {
            let link = if step.is_master { None } else { master_tombstone };
            let tombstone = match step.subject {
                Subject::Edited => move_task(ctx, task, new_list, link)?,
                Subject::Stored(id) => {
                    let Some(stored) = load_task_values(ctx.tx(), id)? else {
                        continue;
                    };
                    let mut sibling = TaskChangeSet::for_update(id, stored, TaskValues::new());
                    if sibling.old_integer(TaskField::ListId) == Some(new_list) {
                        continue;
                    }
                    sibling.set(TaskField::ListId, new_list)?;
                    let tombstone = move_task(ctx, &mut sibling, new_list, link)?;
                    sibling.set(TaskField::LastModifiedAt, ctx.now_ms())?;
                    sibling.commit(ctx.tx())?;
                    tombstone
                }
            };
            if step.is_master {
                master_tombstone = tombstone;
            }
        }
        Ok(())
    }
}

/// Orders the rows to move: master, remaining exceptions by id, edited task.
fn plan_moves(
    ctx: &ProcessorContext<'_>,
    task: &TaskChangeSet,
) -> Result<VecDeque<MoveStep>, StoreError> {
    let mut queue = VecDeque::new();
    let edited_id = task.id();

    let master_id = if task.is_recurring() {
        edited_id
    } else {
        task.old_integer(TaskField::OriginalInstanceId)
    };

    let Some(master_id) = master_id else {
        queue.push_back(MoveStep {
            subject: Subject::Edited,
            is_master: false,
        });
        return Ok(queue);
    };

    let edited_is_master = edited_id == Some(master_id);
    queue.push_back(MoveStep {
        subject: if edited_is_master {
            Subject::Edited
        } else {
            Subject::Stored(master_id)
        },
        is_master: true,
    });

    for exception_id in exception_ids_tx(ctx.tx(), master_id)? {
        if Some(exception_id) != edited_id {
            queue.push_back(MoveStep {
                subject: Subject::Stored(exception_id),
                is_master: false,
            });
        }
    }

    if !edited_is_master {
        queue.push_back(MoveStep {
            subject: Subject::Edited,
            is_master: false,
        });
    }
    Ok(queue)
}

fn has_sync_identity(task: &TaskChangeSet) -> bool {
    !task.old_value_of(TaskField::SyncId).is_null()
        || !task.old_value_of(TaskField::SyncVersion).is_null()
        || !task.old_value_of(TaskField::OriginalInstanceSyncId).is_null()
}

/// Moves one row whose pending list id is already `new_list`.
///
/// Returns the id of the tombstone left in the old list, if one was needed.
fn move_task(
    ctx: &ProcessorContext<'_>,
    task: &mut TaskChangeSet,
    new_list: i64,
    link: Option<i64>,
) -> Result<Option<i64>, StoreError> {
    let old_list = task.old_integer(TaskField::ListId);

    let tombstone = if has_sync_identity(task) {
        let mut tombstone = task.duplicate();
        tombstone.set(TaskField::ListId, FieldValue::from(old_list))?;
        if let Some(link) = link {
            tombstone.set(TaskField::OriginalInstanceId, link)?;
            tombstone.set(TaskField::OriginalInstanceSyncId, FieldValue::Null)?;
        }
        tombstone.set(TaskField::Deleted, true)?;
        tombstone.set(TaskField::Dirty, true)?;
        for field in TaskField::LIST_DERIVED {
            tombstone.unset(field)?;
        }
        tombstone.commit(ctx.tx())?;
        tombstone.id()
    } else {
        None
    };

    task.set(TaskField::Dirty, true)?;
    task.set(TaskField::SyncId, FieldValue::Null)?;
    task.set(TaskField::SyncVersion, FieldValue::Null)?;
    task.set(TaskField::OriginalInstanceSyncId, FieldValue::Null)?;
    for field in TaskField::SYNC_DATA {
        task.set(field, FieldValue::Null)?;
    }

    info!(
        task_id = task.id(),
        old_list,
        new_list,
        tombstone_id = tombstone,
        "emulated list move"
    );
    Ok(tombstone)
}
