#![forbid(unsafe_code)]

//! The per-row view processors operate on.
//!
//! A change-set pairs the stored snapshot of one task row with the set of
//! pending writes. Processors read through [`TaskChangeSet::value_of`], which
//! prefers pending values, and write through [`TaskChangeSet::set`]. Only
//! touched storage columns reach the database on [`TaskChangeSet::commit`].

use super::StoreError;
use super::support::to_sql_value;
use rusqlite::{Connection, params_from_iter};
use tp_core::model::{FieldValue, TaskField, TaskValues};

static NULL_VALUE: FieldValue = FieldValue::Null;

#[derive(Clone, Debug, PartialEq, Eq)]
enum Pending {
    ReadOnly,
    Writable(TaskValues),
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TaskChangeSet {
    id: Option<i64>,
    stored: TaskValues,
    pending: Pending,
}

impl TaskChangeSet {
    /// A writable view for a row that does not exist yet.
    pub fn for_insert(values: TaskValues) -> Self {
        Self {
            id: None,
            stored: TaskValues::new(),
            pending: Pending::Writable(values),
        }
    }

    pub fn for_update(id: i64, stored: TaskValues, values: TaskValues) -> Self {
        Self {
            id: Some(id),
            stored,
            pending: Pending::Writable(values),
        }
    }

    pub fn read_only(id: i64, stored: TaskValues) -> Self {
        Self {
            id: Some(id),
            stored,
            pending: Pending::ReadOnly,
        }
    }

    /// Row id; `None` until an insert view has been committed.
    pub fn id(&self) -> Option<i64> {
        self.id
    }

    pub fn is_writable(&self) -> bool {
        matches!(self.pending, Pending::Writable(_))
    }

    fn pending(&self) -> Option<&TaskValues> {
        match &self.pending {
            Pending::Writable(values) => Some(values),
            Pending::ReadOnly => None,
        }
    }

    pub fn value_of(&self, field: TaskField) -> &FieldValue {
        self.pending()
            .and_then(|pending| pending.get(field))
            .or_else(|| self.stored.get(field))
            .unwrap_or(&NULL_VALUE)
    }

    pub fn old_value_of(&self, field: TaskField) -> &FieldValue {
        self.stored.get(field).unwrap_or(&NULL_VALUE)
    }

    pub fn is_touched(&self, field: TaskField) -> bool {
        self.pending().is_some_and(|pending| pending.contains(field))
    }

    pub fn set(&mut self, field: TaskField, value: impl Into<FieldValue>) -> Result<(), StoreError> {
        match &mut self.pending {
            Pending::Writable(pending) => {
                pending.insert(field, value);
                Ok(())
            }
            Pending::ReadOnly => Err(StoreError::ReadOnlyView),
        }
    }

    /// Drops a pending write so the stored value shows through again.
    pub fn unset(&mut self, field: TaskField) -> Result<(), StoreError> {
        match &mut self.pending {
            Pending::Writable(pending) => {
                pending.remove(field);
                Ok(())
            }
            Pending::ReadOnly => Err(StoreError::ReadOnlyView),
        }
    }

    pub fn has_updates(&self) -> bool {
        self.pending().is_some_and(|pending| !pending.is_empty())
    }

    pub fn touched_fields(&self) -> impl Iterator<Item = TaskField> + '_ {
        self.pending().into_iter().flat_map(TaskValues::fields)
    }

    pub fn integer(&self, field: TaskField) -> Result<Option<i64>, StoreError> {
        match self.value_of(field) {
            FieldValue::Null => Ok(None),
            FieldValue::Integer(value) => Ok(Some(*value)),
            FieldValue::Text(_) => Err(StoreError::violation(format!(
                "{field} must be an integer"
            ))),
        }
    }

    pub fn old_integer(&self, field: TaskField) -> Option<i64> {
        self.old_value_of(field).as_integer()
    }

    pub fn text(&self, field: TaskField) -> Result<Option<&str>, StoreError> {
        match self.value_of(field) {
            FieldValue::Null => Ok(None),
            FieldValue::Text(value) => Ok(Some(value.as_str())),
            FieldValue::Integer(_) => Err(StoreError::violation(format!(
                "{field} must be a string"
            ))),
        }
    }

    pub fn flag(&self, field: TaskField) -> bool {
        self.value_of(field).as_integer().is_some_and(|value| value != 0)
    }

    /// A task is recurring when it carries an rrule or rdate.
    pub fn is_recurring(&self) -> bool {
        !self.value_of(TaskField::Rrule).is_null() || !self.value_of(TaskField::Rdate).is_null()
    }

    /// Stored values overlaid with pending writes.
    pub fn current_values(&self) -> TaskValues {
        let mut values = self.stored.clone();
        if let Some(pending) = self.pending() {
            for (field, value) in pending.iter() {
                values.insert(field, value.clone());
            }
        }
        values
    }

    /// A writable insert view seeded with every current value of this one.
    pub fn duplicate(&self) -> Self {
        Self::for_insert(self.current_values())
    }

    /// Writes the touched storage columns and returns the number of rows affected.
    ///
    /// An insert view always writes a row and learns its id; an update view
    /// with nothing to write is a no-op.
    pub fn commit(&mut self, conn: &Connection) -> Result<usize, StoreError> {
        let Pending::Writable(pending) = &self.pending else {
            return Err(StoreError::ReadOnlyView);
        };

        let touched: Vec<(TaskField, &FieldValue)> = pending
            .iter()
            .filter(|(field, _)| field.is_storage_column())
            .collect();

        match self.id {
            None => {
                let affected = if touched.is_empty() {
                    conn.execute("INSERT INTO tasks DEFAULT VALUES", [])?
                } else {
                    let columns = touched
                        .iter()
                        .map(|(field, _)| field.column())
                        .collect::<Vec<_>>()
                        .join(", ");
                    let placeholders = vec!["?"; touched.len()].join(", ");
                    let sql = format!("INSERT INTO tasks ({columns}) VALUES ({placeholders})");
                    conn.execute(
                        &sql,
                        params_from_iter(touched.iter().map(|(_, value)| to_sql_value(value))),
                    )?
                };
                self.id = Some(conn.last_insert_rowid());
                Ok(affected)
            }
            Some(id) => {
                if touched.is_empty() {
                    return Ok(0);
                }
                let assignments = touched
                    .iter()
                    .map(|(field, _)| format!("{} = ?", field.column()))
                    .collect::<Vec<_>>()
                    .join(", ");
                let sql = format!("UPDATE tasks SET {assignments} WHERE id = ?");
                let args = touched
                    .iter()
                    .map(|(_, value)| to_sql_value(value))
                    .chain(std::iter::once(rusqlite::types::Value::Integer(id)));
                Ok(conn.execute(&sql, params_from_iter(args))?)
            }
        }
    }
}
