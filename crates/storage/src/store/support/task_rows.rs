#![forbid(unsafe_code)]

use super::super::StoreError;
use super::sql_values::from_sql_value;
use rusqlite::types::Value;
use rusqlite::{Connection, OptionalExtension, params};
use tp_core::model::{TaskField, TaskValues};

fn select_expr(field: TaskField) -> String {
    match field {
        TaskField::ListName => "l.name".to_string(),
        TaskField::ListColor => "l.color".to_string(),
        TaskField::AccountName => "l.account_name".to_string(),
        TaskField::AccountType => "l.account_type".to_string(),
        field => format!("t.{}", field.column()),
    }
}

/// Loads the stored snapshot of a task, list-derived columns included.
pub(in crate::store) fn load_task_values(
    conn: &Connection,
    task_id: i64,
) -> Result<Option<TaskValues>, StoreError> {
    let columns = TaskField::ALL
        .into_iter()
        .map(select_expr)
        .collect::<Vec<_>>()
        .join(", ");
    let sql = format!(
        "SELECT {columns} FROM tasks t LEFT JOIN task_lists l ON l.id = t.list_id WHERE t.id = ?1"
    );

    Ok(conn
        .query_row(&sql, params![task_id], |row| {
            let mut values = TaskValues::new();
            for (index, field) in TaskField::ALL.into_iter().enumerate() {
                values.insert(field, from_sql_value(row.get::<_, Value>(index)?));
            }
            Ok(values)
        })
        .optional()?)
}

pub(in crate::store) fn task_exists(conn: &Connection, task_id: i64) -> Result<bool, StoreError> {
    Ok(conn
        .query_row(
            "SELECT 1 FROM tasks WHERE id = ?1",
            params![task_id],
            |_| Ok(()),
        )
        .optional()?
        .is_some())
}

/// Removes a task together with its instance, search and property rows.
pub(in crate::store) fn hard_delete_task_tx(
    conn: &Connection,
    task_id: i64,
) -> Result<usize, StoreError> {
    conn.execute(
        "DELETE FROM search_associations WHERE task_id = ?1",
        params![task_id],
    )?;
    conn.execute("DELETE FROM instances WHERE task_id = ?1", params![task_id])?;
    conn.execute("DELETE FROM properties WHERE task_id = ?1", params![task_id])?;
    Ok(conn.execute("DELETE FROM tasks WHERE id = ?1", params![task_id])?)
}

pub(in crate::store) fn soft_delete_task_tx(
    conn: &Connection,
    task_id: i64,
) -> Result<usize, StoreError> {
    Ok(conn.execute(
        "UPDATE tasks SET deleted = 1, dirty = 1 WHERE id = ?1",
        params![task_id],
    )?)
}

/// Live exceptions of a recurrence master in ascending id order.
pub(in crate::store) fn exception_ids_tx(
    conn: &Connection,
    master_id: i64,
) -> Result<Vec<i64>, StoreError> {
    task_ids_where(
        conn,
        "original_instance_id = ?1 AND deleted = 0",
        params![master_id],
    )
}

pub(in crate::store) fn task_ids_where(
    conn: &Connection,
    predicate: &str,
    args: impl rusqlite::Params,
) -> Result<Vec<i64>, StoreError> {
    let sql = format!("SELECT id FROM tasks WHERE {predicate} ORDER BY id ASC");
    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt.query_map(args, |row| row.get::<_, i64>(0))?;
    let mut out = Vec::new();
    for row in rows {
        out.push(row?);
    }
    Ok(out)
}

/// Recomputes the provider-maintained property flags of a task.
pub(in crate::store) fn refresh_property_flags_tx(
    conn: &Connection,
    task_id: i64,
    alarm_mimetype: &str,
) -> Result<(), StoreError> {
    conn.execute(
        r#"
        UPDATE tasks SET
          has_properties = EXISTS(SELECT 1 FROM properties WHERE task_id = ?1),
          has_alarms = EXISTS(SELECT 1 FROM properties WHERE task_id = ?1 AND mimetype = ?2)
        WHERE id = ?1
        "#,
        params![task_id, alarm_mimetype],
    )?;
    Ok(())
}
