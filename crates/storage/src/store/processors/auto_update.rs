#![forbid(unsafe_code)]

use super::{ProcessorContext, TaskProcessor};
use crate::store::{StoreError, TaskChangeSet};
use tp_core::model::{FieldValue, TaskField, TaskStatus};

/// Derives status-dependent fields and provider stamps.
#[derive(Clone, Copy, Debug, Default)]
pub struct AutoUpdate;

impl TaskProcessor for AutoUpdate {
    fn name(&self) -> &'static str {
        "auto_update"
    }

    fn before_insert(
        &self,
        ctx: &ProcessorContext<'_>,
        task: &mut TaskChangeSet,
        trusted: bool,
    ) -> Result<(), StoreError> {
        if !trusted {
            let now = ctx.now_ms();
            task.set(TaskField::Dirty, true)?;
            task.set(TaskField::CreatedAt, now)?;
            task.set(TaskField::LastModifiedAt, now)?;
        }
        derive(ctx, task, trusted, true)
    }

    fn before_update(
        &self,
        ctx: &ProcessorContext<'_>,
        task: &mut TaskChangeSet,
        trusted: bool,
    ) -> Result<(), StoreError> {
        if !trusted {
            task.set(TaskField::Dirty, true)?;
            task.set(TaskField::LastModifiedAt, ctx.now_ms())?;
        }
        derive(ctx, task, trusted, false)
    }
}

fn derive(
    ctx: &ProcessorContext<'_>,
    task: &mut TaskChangeSet,
    trusted: bool,
    insert: bool,
) -> Result<(), StoreError> {
    // Explicitly supplied by the caller, as opposed to derived below.
    let completed_given = task.is_touched(TaskField::CompletedAt);

    if !trusted {
        let status_given = task.is_touched(TaskField::Status);

        if !status_given
            && completed_given
            && !task.value_of(TaskField::CompletedAt).is_null()
        {
            task.set(TaskField::Status, TaskStatus::Completed.code())?;
        }

        if task.is_touched(TaskField::PercentComplete)
            && let Some(percent) = task.integer(TaskField::PercentComplete)?
        {
            if percent == 100 && !status_given {
                task.set(TaskField::Status, TaskStatus::Completed.code())?;
            } else if percent < 100 && !completed_given {
                task.set(TaskField::CompletedAt, FieldValue::Null)?;
            }
        }
    }

    if !insert && !task.is_touched(TaskField::Status) {
        return Ok(());
    }

    let status = match task.integer(TaskField::Status)? {
        Some(code) => TaskStatus::from_code(code).ok_or_else(|| {
            StoreError::violation(format!("status must be within 0..=3, got {code}"))
        })?,
        None => {
            task.set(TaskField::Status, TaskStatus::DEFAULT.code())?;
            TaskStatus::DEFAULT
        }
    };

    task.set(TaskField::IsNew, status.is_new())?;
    task.set(TaskField::IsClosed, status.is_closed())?;

    if trusted {
        return Ok(());
    }

    if status == TaskStatus::Completed {
        task.set(TaskField::PercentComplete, 100)?;
        if !completed_given {
            task.set(TaskField::CompletedAt, ctx.now_ms())?;
            task.set(TaskField::CompletedIsAllDay, false)?;
        }
    } else if !completed_given {
        task.set(TaskField::CompletedAt, FieldValue::Null)?;
    }
    Ok(())
}
