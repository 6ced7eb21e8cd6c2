#![forbid(unsafe_code)]

use super::{ProcessorContext, TaskProcessor};
use crate::store::{InstanceRow, StoreError, TaskChangeSet};
use rusqlite::params;
use tp_core::duration::Duration;
use tp_core::model::TaskField;
use tp_core::zone::{Tz, parse_zone, utc_offset_ms};
use tracing::warn;

/// Maintains the single `instances` row of every task.
#[derive(Clone, Copy, Debug, Default)]
pub struct InstanceMaterializer;

impl TaskProcessor for InstanceMaterializer {
    fn name(&self) -> &'static str {
        "instances"
    }

    fn after_insert(
        &self,
        ctx: &ProcessorContext<'_>,
        task: &TaskChangeSet,
        _trusted: bool,
    ) -> Result<(), StoreError> {
        upsert_instance(ctx, task)
    }

    fn after_update(
        &self,
        ctx: &ProcessorContext<'_>,
        task: &TaskChangeSet,
        _trusted: bool,
    ) -> Result<(), StoreError> {
        upsert_instance(ctx, task)
    }

    fn after_delete(
        &self,
        ctx: &ProcessorContext<'_>,
        task: &TaskChangeSet,
        trusted: bool,
    ) -> Result<(), StoreError> {
        if trusted && let Some(task_id) = task.id() {
            ctx.tx()
                .execute("DELETE FROM instances WHERE task_id = ?1", params![task_id])?;
        }
        Ok(())
    }
}

/// Zone used for sort keys and nominal duration arithmetic; `None` for
/// all-day and floating tasks.
fn sorting_zone(task: &TaskChangeSet) -> Result<Option<Tz>, StoreError> {
    if task.flag(TaskField::IsAllDay) {
        return Ok(None);
    }
    let Some(name) = task.text(TaskField::Timezone)? else {
        return Ok(None);
    };
    match parse_zone(name) {
        Ok(zone) => Ok(Some(zone)),
        Err(err) => {
            warn!(task_id = task.id(), %err, "sorting with zero offset");
            Ok(None)
        }
    }
}

fn compute_instance(
    task: &TaskChangeSet,
    task_id: i64,
) -> Result<InstanceRow, StoreError> {
    let zone = sorting_zone(task)?;
    let start = task.integer(TaskField::Dtstart)?;
    let duration = match task.text(TaskField::Duration)? {
        Some(raw) => match raw.parse::<Duration>() {
            Ok(duration) => Some(duration),
            Err(err) => {
                warn!(task_id, %err, "ignoring unparsable duration");
                None
            }
        },
        None => None,
    };

    let due = match task.integer(TaskField::Due)? {
        Some(due) => Some(due),
        None => match start.zip(duration) {
            Some((start, duration)) => {
                let due = duration.add_to(start, zone);
                if due.is_none() {
                    warn!(task_id, "derived due overflows; storing null");
                }
                due
            }
            None => None,
        },
    };

    let sorting = |value: Option<i64>| {
        let value = value?;
        let sorted = value.checked_add(zone.map_or(0, |zone| utc_offset_ms(zone, value)));
        if sorted.is_none() {
            warn!(task_id, value, "sort key overflows; storing null");
        }
        sorted
    };

    let instance_duration = match start.zip(due) {
        Some((start, due)) => {
            let span = due.checked_sub(start);
            if span.is_none() {
                warn!(task_id, start, due, "instance duration overflows; storing null");
            }
            span
        }
        None => None,
    };

    Ok(InstanceRow {
        task_id,
        instance_start: start,
        instance_due: due,
        instance_duration,
        instance_start_sorting: sorting(start),
        instance_due_sorting: sorting(due),
    })
}

fn upsert_instance(ctx: &ProcessorContext<'_>, task: &TaskChangeSet) -> Result<(), StoreError> {
    let Some(task_id) = task.id() else {
        return Ok(());
    };
    let row = compute_instance(task, task_id)?;
    ctx.tx().execute(
        r#"
        INSERT INTO instances(task_id, instance_start, instance_due, instance_duration,
                              instance_start_sorting, instance_due_sorting)
        VALUES (?1, ?2, ?3, ?4, ?5, ?6)
        ON CONFLICT(task_id) DO UPDATE SET
          instance_start = excluded.instance_start,
          instance_due = excluded.instance_due,
          instance_duration = excluded.instance_duration,
          instance_start_sorting = excluded.instance_start_sorting,
          instance_due_sorting = excluded.instance_due_sorting
        "#,
        params![
            row.task_id,
            row.instance_start,
            row.instance_due,
            row.instance_duration,
            row.instance_start_sorting,
            row.instance_due_sorting
        ],
    )?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tp_core::model::TaskValues;

    const HOUR: i64 = 3_600_000;
    // 2024-01-15T09:00:00Z
    const START: i64 = 1_705_309_200_000;

    fn view(values: TaskValues) -> TaskChangeSet {
        TaskChangeSet::for_update(1, values, TaskValues::new())
    }

    #[test]
    fn due_is_derived_from_duration() {
        let task = view(
            TaskValues::new()
                .with(TaskField::Dtstart, START)
                .with(TaskField::Duration, "PT2H")
                .with(TaskField::Timezone, "UTC"),
        );
        let row = compute_instance(&task, 1).unwrap();
        assert_eq!(row.instance_start, Some(START));
        assert_eq!(row.instance_due, Some(START + 2 * HOUR));
        assert_eq!(row.instance_duration, Some(2 * HOUR));
        assert_eq!(row.instance_start_sorting, Some(START));
    }

    #[test]
    fn sorting_adds_zone_offset_for_timed_tasks() {
        let task = view(
            TaskValues::new()
                .with(TaskField::Dtstart, START)
                .with(TaskField::Due, START + HOUR)
                .with(TaskField::Timezone, "Europe/Berlin"),
        );
        let row = compute_instance(&task, 1).unwrap();
        assert_eq!(row.instance_start_sorting, Some(START + HOUR));
        assert_eq!(row.instance_due_sorting, Some(START + 2 * HOUR));
        assert_eq!(row.instance_duration, Some(HOUR));
    }

    #[test]
    fn all_day_and_unknown_zones_sort_without_offset() {
        let all_day = view(
            TaskValues::new()
                .with(TaskField::Due, START)
                .with(TaskField::IsAllDay, true)
                .with(TaskField::Timezone, "Europe/Berlin"),
        );
        let row = compute_instance(&all_day, 1).unwrap();
        assert_eq!(row.instance_due_sorting, Some(START));
        assert_eq!(row.instance_start, None);
        assert_eq!(row.instance_duration, None);

        let unknown = view(
            TaskValues::new()
                .with(TaskField::Dtstart, START)
                .with(TaskField::Timezone, "Mars/Olympus"),
        );
        let row = compute_instance(&unknown, 1).unwrap();
        assert_eq!(row.instance_start_sorting, Some(START));
        assert_eq!(row.instance_due, None);
    }

    #[test]
    fn overflowing_arithmetic_stores_null() {
        let task = view(
            TaskValues::new()
                .with(TaskField::Dtstart, i64::MAX - 1_000)
                .with(TaskField::Duration, "PT1H")
                .with(TaskField::Timezone, "UTC"),
        );
        let row = compute_instance(&task, 1).unwrap();
        assert_eq!(row.instance_start, Some(i64::MAX - 1_000));
        assert_eq!(row.instance_due, None);
        assert_eq!(row.instance_duration, None);
        assert_eq!(row.instance_start_sorting, Some(i64::MAX - 1_000));

        let task = view(
            TaskValues::new()
                .with(TaskField::Dtstart, i64::MIN + 1_000)
                .with(TaskField::Due, i64::MAX - 1_000)
                .with(TaskField::Timezone, "Europe/Berlin"),
        );
        let row = compute_instance(&task, 1).unwrap();
        assert_eq!(row.instance_due, Some(i64::MAX - 1_000));
        assert_eq!(row.instance_duration, None);
        assert_eq!(row.instance_due_sorting, Some(i64::MAX - 1_000));
    }
}
