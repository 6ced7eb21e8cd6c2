#![forbid(unsafe_code)]

mod indexes;
mod lists;
mod projections;
mod properties;
mod tasks;

pub(super) fn full_schema_sql() -> String {
    let mut sql = String::new();
    sql.push_str(lists::SQL);
    sql.push_str(tasks::SQL);
    sql.push_str(properties::SQL);
    sql.push_str(projections::SQL);
    sql.push_str(indexes::SQL);
    sql
}
