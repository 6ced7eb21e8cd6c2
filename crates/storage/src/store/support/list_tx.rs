#![forbid(unsafe_code)]

use super::super::{StoreError, TaskListRow};
use rusqlite::{Connection, OptionalExtension, Row, params};

pub(in crate::store) const LIST_COLUMNS: &str =
    "id, name, color, account_name, account_type, visible, sync_enabled, sync_id";

pub(in crate::store) fn list_exists_tx(conn: &Connection, list_id: i64) -> Result<bool, StoreError> {
    Ok(conn
        .query_row(
            "SELECT 1 FROM task_lists WHERE id = ?1",
            params![list_id],
            |_| Ok(()),
        )
        .optional()?
        .is_some())
}

pub(in crate::store) fn list_row(row: &Row<'_>) -> rusqlite::Result<TaskListRow> {
    Ok(TaskListRow {
        id: row.get(0)?,
        name: row.get(1)?,
        color: row.get(2)?,
        account_name: row.get(3)?,
        account_type: row.get(4)?,
        visible: row.get::<_, i64>(5)? != 0,
        sync_enabled: row.get::<_, i64>(6)? != 0,
        sync_id: row.get(7)?,
    })
}

pub(in crate::store) fn load_list_tx(
    conn: &Connection,
    list_id: i64,
) -> Result<Option<TaskListRow>, StoreError> {
    let sql = format!("SELECT {LIST_COLUMNS} FROM task_lists WHERE id = ?1");
    Ok(conn.query_row(&sql, params![list_id], list_row).optional()?)
}
