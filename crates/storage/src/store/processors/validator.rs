#![forbid(unsafe_code)]

use super::{ProcessorContext, TaskProcessor};
use crate::store::support::list_exists_tx;
use crate::store::{StoreError, TaskChangeSet};
use tp_core::duration::Duration;
use tp_core::model::{
    CLASSIFICATION_RANGE, PERCENT_COMPLETE_RANGE, PRIORITY_RANGE, TaskField, TaskStatus,
};
use tp_core::zone::parse_zone;

/// Fields only a sync adapter may write.
const PROVIDER_FIELDS: [TaskField; 5] = [
    TaskField::Uid,
    TaskField::Dirty,
    TaskField::CreatedAt,
    TaskField::LastModifiedAt,
    TaskField::Deleted,
];

/// Flags the store keeps in step with status and properties; no caller
/// writes them.
const STORE_MAINTAINED: [TaskField; 4] = [
    TaskField::IsNew,
    TaskField::IsClosed,
    TaskField::HasAlarms,
    TaskField::HasProperties,
];

const SCHEDULE_FIELDS: [TaskField; 5] = [
    TaskField::Dtstart,
    TaskField::Due,
    TaskField::Duration,
    TaskField::Timezone,
    TaskField::IsAllDay,
];

/// Rejects writes that would break a task invariant.
#[derive(Clone, Copy, Debug, Default)]
pub struct Validator;

impl TaskProcessor for Validator {
    fn name(&self) -> &'static str {
        "validator"
    }

    fn before_insert(
        &self,
        ctx: &ProcessorContext<'_>,
        task: &mut TaskChangeSet,
        trusted: bool,
    ) -> Result<(), StoreError> {
        check_touched_fields(task, trusted)?;

        if !trusted && task.is_touched(TaskField::OriginalInstanceSyncId) {
            return Err(StoreError::violation(
                "original_instance_sync_id can only be written by a sync adapter",
            ));
        }
        check_original_instance(task)?;

        let Some(list_id) = task.integer(TaskField::ListId)? else {
            return Err(StoreError::violation("list_id is required"));
        };
        if !list_exists_tx(ctx.tx(), list_id)? {
            return Err(StoreError::UnknownList(list_id));
        }

        check_ranges(task)?;
        check_schedule(task, trusted)
    }

    fn before_update(
        &self,
        ctx: &ProcessorContext<'_>,
        task: &mut TaskChangeSet,
        trusted: bool,
    ) -> Result<(), StoreError> {
        check_touched_fields(task, trusted)?;

        if !trusted
            && (task.is_touched(TaskField::OriginalInstanceId)
                || task.is_touched(TaskField::OriginalInstanceSyncId))
        {
            return Err(StoreError::violation(
                "original instance links can only be changed by a sync adapter",
            ));
        }
        check_original_instance(task)?;

        // A list change is a move; non-trusted moves are emulated downstream.
        if task.is_touched(TaskField::ListId) {
            let Some(list_id) = task.integer(TaskField::ListId)? else {
                return Err(StoreError::violation("list_id must not be null"));
            };
            if !list_exists_tx(ctx.tx(), list_id)? {
                return Err(StoreError::UnknownList(list_id));
            }
        }

        check_ranges(task)?;
        if SCHEDULE_FIELDS.iter().any(|field| task.is_touched(*field)) {
            check_schedule(task, trusted)?;
        }
        Ok(())
    }
}

fn check_touched_fields(task: &TaskChangeSet, trusted: bool) -> Result<(), StoreError> {
    for field in task.touched_fields() {
        task.value_of(field).check_kind(field)?;

        if TaskField::LIST_DERIVED.contains(&field) {
            return Err(StoreError::violation(format!(
                "{field} is derived from the task list and cannot be written"
            )));
        }
        if STORE_MAINTAINED.contains(&field) {
            return Err(StoreError::violation(format!(
                "{field} is maintained by the store and cannot be written"
            )));
        }
        if !trusted && PROVIDER_FIELDS.contains(&field) {
            return Err(StoreError::violation(format!(
                "{field} can only be written by a sync adapter"
            )));
        }
    }
    Ok(())
}

fn check_original_instance(task: &TaskChangeSet) -> Result<(), StoreError> {
    let touched = task.is_touched(TaskField::OriginalInstanceId)
        || task.is_touched(TaskField::OriginalInstanceSyncId);
    if touched
        && !task.value_of(TaskField::OriginalInstanceId).is_null()
        && !task.value_of(TaskField::OriginalInstanceSyncId).is_null()
    {
        return Err(StoreError::violation(
            "original_instance_id and original_instance_sync_id are mutually exclusive",
        ));
    }
    Ok(())
}

fn check_range(
    task: &TaskChangeSet,
    field: TaskField,
    range: std::ops::RangeInclusive<i64>,
) -> Result<(), StoreError> {
    if !task.is_touched(field) {
        return Ok(());
    }
    match task.integer(field)? {
        Some(value) if !range.contains(&value) => Err(StoreError::violation(format!(
            "{field} must be within {}..={}, got {value}",
            range.start(),
            range.end()
        ))),
        _ => Ok(()),
    }
}

fn check_ranges(task: &TaskChangeSet) -> Result<(), StoreError> {
    check_range(task, TaskField::Priority, PRIORITY_RANGE)?;
    check_range(task, TaskField::Classification, CLASSIFICATION_RANGE)?;
    check_range(task, TaskField::PercentComplete, PERCENT_COMPLETE_RANGE)?;
    if task.is_touched(TaskField::Status)
        && let Some(code) = task.integer(TaskField::Status)?
        && TaskStatus::from_code(code).is_none()
    {
        return Err(StoreError::violation(format!(
            "status must be within 0..=3, got {code}"
        )));
    }
    Ok(())
}

/// Cross-field rules over dtstart, due, duration, timezone and all-day.
fn check_schedule(task: &TaskChangeSet, trusted: bool) -> Result<(), StoreError> {
    let dtstart = task.integer(TaskField::Dtstart)?;
    let due = task.integer(TaskField::Due)?;
    let duration = task.text(TaskField::Duration)?;
    let timezone = task.text(TaskField::Timezone)?;
    let all_day = task.flag(TaskField::IsAllDay);

    if due.is_some() && duration.is_some() {
        return Err(StoreError::violation(
            "due and duration are mutually exclusive",
        ));
    }

    if let Some(raw) = duration {
        let parsed = raw
            .parse::<Duration>()
            .map_err(|err| StoreError::violation(format!("invalid duration {raw:?}: {err}")))?;
        if parsed.is_negative() {
            return Err(StoreError::violation("duration must not be negative"));
        }
        if dtstart.is_none() {
            return Err(StoreError::violation("duration requires dtstart"));
        }
    }

    if let (Some(dtstart), Some(due)) = (dtstart, due)
        && due < dtstart
    {
        return Err(StoreError::violation("due must not be before dtstart"));
    }

    if !all_day && (dtstart.is_some() || due.is_some()) && timezone.is_none() {
        return Err(StoreError::violation(
            "tz is required for timed tasks with dtstart or due",
        ));
    }

    if !trusted
        && let Some(name) = timezone
        && let Err(err) = parse_zone(name)
    {
        return Err(StoreError::violation(err.to_string()));
    }

    Ok(())
}
