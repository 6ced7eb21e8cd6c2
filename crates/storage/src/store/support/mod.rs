#![forbid(unsafe_code)]

mod list_tx;
mod schema;
mod search_tx;
mod sql_values;
mod task_rows;
mod time;

pub(super) use list_tx::*;
pub(super) use schema::{SCHEMA_VERSION, install_schema};
pub(super) use search_tx::*;
pub(super) use sql_values::*;
pub(super) use task_rows::*;
pub(super) use time::now_ms;
