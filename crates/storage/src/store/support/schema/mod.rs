#![forbid(unsafe_code)]

mod sql;

use super::super::StoreError;
use rusqlite::{Connection, params};

pub(in crate::store) const SCHEMA_VERSION: i64 = 1;

pub(in crate::store) fn install_schema(conn: &Connection) -> Result<(), StoreError> {
    conn.execute_batch(&sql::full_schema_sql())?;

    conn.execute(
        "INSERT INTO store_meta(key, value) VALUES (?1, ?2) \
         ON CONFLICT(key) DO UPDATE SET value=excluded.value",
        params!["schema_version", SCHEMA_VERSION.to_string()],
    )?;

    Ok(())
}
