#![forbid(unsafe_code)]

use super::support::{
    LIST_COLUMNS, hard_delete_task_tx, list_exists_tx, list_row, load_list_tx, task_ids_where,
};
use super::{SqliteStore, StoreError, TaskListRequest, TaskListRow};
use rusqlite::params;
use tp_core::model::Collection;
use tracing::{info, instrument};

impl SqliteStore {
    #[instrument(skip(self, request), fields(name = %request.name))]
    pub fn create_list(
        &mut self,
        request: TaskListRequest,
        trusted: bool,
    ) -> Result<i64, StoreError> {
        if !trusted {
            return Err(StoreError::NotPermitted(
                "task lists can only be created by a sync adapter",
            ));
        }
        if request.name.trim().is_empty() {
            return Err(StoreError::InvalidInput("list name must not be empty"));
        }

        let tx = self.conn.transaction()?;
        tx.execute(
            r#"
            INSERT INTO task_lists(name, color, account_name, account_type, visible, sync_enabled, sync_id)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
            "#,
            params![
                request.name,
                request.color,
                request.account_name,
                request.account_type,
                request.visible,
                request.sync_enabled,
                request.sync_id
            ],
        )?;
        let list_id = tx.last_insert_rowid();
        tx.commit()?;

        self.notify([Collection::Lists]);
        Ok(list_id)
    }

    /// Removes a list and hard-deletes its tasks without running task processors.
    ///
    /// Returns the number of tasks removed.
    #[instrument(skip(self))]
    pub fn delete_list(&mut self, list_id: i64, trusted: bool) -> Result<usize, StoreError> {
        if !trusted {
            return Err(StoreError::NotPermitted(
                "task lists can only be deleted by a sync adapter",
            ));
        }

        let tx = self.conn.transaction()?;
        if !list_exists_tx(&tx, list_id)? {
            return Err(StoreError::UnknownList(list_id));
        }
        let task_ids = task_ids_where(&tx, "list_id = ?1", params![list_id])?;
        for task_id in &task_ids {
            hard_delete_task_tx(&tx, *task_id)?;
        }
        tx.execute("DELETE FROM task_lists WHERE id = ?1", params![list_id])?;
        tx.commit()?;

        info!(list_id, tasks = task_ids.len(), "deleted task list");
        self.notify([Collection::Lists, Collection::Tasks, Collection::Instances]);
        Ok(task_ids.len())
    }

    pub fn list_exists(&self, list_id: i64) -> Result<bool, StoreError> {
        list_exists_tx(&self.conn, list_id)
    }

    pub fn get_list(&self, list_id: i64) -> Result<Option<TaskListRow>, StoreError> {
        load_list_tx(&self.conn, list_id)
    }

    pub fn lists(&self) -> Result<Vec<TaskListRow>, StoreError> {
        let sql = format!("SELECT {LIST_COLUMNS} FROM task_lists ORDER BY id ASC");
        let mut stmt = self.conn.prepare(&sql)?;
        let rows = stmt.query_map([], list_row)?;
        let mut out = Vec::new();
        for row in rows {
            out.push(row?);
        }
        Ok(out)
    }
}
