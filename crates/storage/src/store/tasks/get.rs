#![forbid(unsafe_code)]

use super::super::support::{load_task_values, task_grams_tx, task_ids_where};
use super::super::*;
use rusqlite::{OptionalExtension, params};
use std::collections::BTreeSet;
use tp_core::model::{ContentType, TaskValues};

impl SqliteStore {
    /// Stored values of a task, list-derived columns included.
    pub fn get_task(&self, task_id: i64) -> Result<Option<TaskValues>, StoreError> {
        load_task_values(&self.conn, task_id)
    }

    pub fn get_instance(&self, task_id: i64) -> Result<Option<InstanceRow>, StoreError> {
        Ok(self
            .conn
            .query_row(
                r#"
                SELECT task_id, instance_start, instance_due, instance_duration,
                       instance_start_sorting, instance_due_sorting
                FROM instances
                WHERE task_id = ?1
                "#,
                params![task_id],
                |row| {
                    Ok(InstanceRow {
                        task_id: row.get(0)?,
                        instance_start: row.get(1)?,
                        instance_due: row.get(2)?,
                        instance_duration: row.get(3)?,
                        instance_start_sorting: row.get(4)?,
                        instance_due_sorting: row.get(5)?,
                    })
                },
            )
            .optional()?)
    }

    /// Every task row in a list, tombstones included.
    pub fn task_ids_in_list(&self, list_id: i64) -> Result<Vec<i64>, StoreError> {
        task_ids_where(&self.conn, "list_id = ?1", params![list_id])
    }

    pub fn task_grams(
        &self,
        task_id: i64,
        content_type: ContentType,
    ) -> Result<BTreeSet<String>, StoreError> {
        task_grams_tx(&self.conn, task_id, content_type)
    }
}
