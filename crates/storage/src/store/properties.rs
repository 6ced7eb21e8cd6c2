#![forbid(unsafe_code)]

use super::support::{
    IndexKey, now_ms, refresh_property_flags_tx, replace_grams_tx, task_exists, to_sql_value,
    from_sql_value,
};
use super::{
    PROPERTY_DATA_SLOTS, PropertyData, PropertyRequest, PropertyRow, SqliteStore, StoreError,
};
use rusqlite::types::Value;
use rusqlite::{Connection, OptionalExtension, Row, params, params_from_iter};
use tp_core::model::{Collection, FieldValue};
use tracing::{debug, instrument};

/// Per-mimetype behavior of property rows.
pub trait PropertyHandler: Send {
    fn mimetype(&self) -> &'static str;

    fn validate(&self, _data: &PropertyData) -> Result<(), StoreError> {
        Ok(())
    }

    /// Completes validated data from other tables before it is stored.
    fn resolve(&self, _conn: &Connection, data: PropertyData) -> Result<PropertyData, StoreError> {
        Ok(data)
    }

    /// Text fed into the search index for this property, if any.
    fn searchable_text(&self, data: &PropertyData) -> Option<String>;
}

/// `data0` category id, `data1` name, `data2` color.
#[derive(Clone, Copy, Debug, Default)]
pub struct CategoryHandler;

impl CategoryHandler {
    pub const MIMETYPE: &'static str = "category";
}

impl PropertyHandler for CategoryHandler {
    fn mimetype(&self) -> &'static str {
        Self::MIMETYPE
    }

    fn validate(&self, data: &PropertyData) -> Result<(), StoreError> {
        match data.slot(1).as_text() {
            Some(name) if !name.trim().is_empty() => Ok(()),
            _ => Err(StoreError::violation("category name is required")),
        }
    }

    fn searchable_text(&self, data: &PropertyData) -> Option<String> {
        data.slot(1).as_text().map(str::to_string)
    }
}

/// `data0` comment text.
#[derive(Clone, Copy, Debug, Default)]
pub struct CommentHandler;

impl CommentHandler {
    pub const MIMETYPE: &'static str = "comment";
}

impl PropertyHandler for CommentHandler {
    fn mimetype(&self) -> &'static str {
        Self::MIMETYPE
    }

    fn searchable_text(&self, data: &PropertyData) -> Option<String> {
        data.slot(0).as_text().map(str::to_string)
    }
}

/// `data0` minutes before, `data1` reference (0 start, 1 due), `data2`
/// message, `data3` alarm type.
#[derive(Clone, Copy, Debug, Default)]
pub struct AlarmHandler;

impl AlarmHandler {
    pub const MIMETYPE: &'static str = "alarm";
}

impl PropertyHandler for AlarmHandler {
    fn mimetype(&self) -> &'static str {
        Self::MIMETYPE
    }

    fn validate(&self, data: &PropertyData) -> Result<(), StoreError> {
        match data.slot(0).as_integer() {
            Some(minutes) if minutes >= 0 => {}
            _ => return Err(StoreError::violation("alarm minutes_before must be >= 0")),
        }
        match data.slot(1).as_integer() {
            Some(reference) if reference >= 0 => {}
            _ => return Err(StoreError::violation("alarm reference must be >= 0")),
        }
        if data.slot(3).is_null() {
            return Err(StoreError::violation("alarm type is required"));
        }
        Ok(())
    }

    fn searchable_text(&self, _data: &PropertyData) -> Option<String> {
        None
    }
}

/// `data0` related task id, `data1` related uid, `data2` related uri,
/// `data3` relation type (0 parent, 1 child, 2 sibling).
///
/// Exactly one of the three references is supplied; a local id or uid is
/// completed with its counterpart from the tasks table.
#[derive(Clone, Copy, Debug, Default)]
pub struct RelationHandler;

impl RelationHandler {
    pub const MIMETYPE: &'static str = "relation";
}

impl PropertyHandler for RelationHandler {
    fn mimetype(&self) -> &'static str {
        Self::MIMETYPE
    }

    fn validate(&self, data: &PropertyData) -> Result<(), StoreError> {
        let references = (0..3).filter(|slot| !data.slot(*slot).is_null()).count();
        if references != 1 {
            return Err(StoreError::violation(
                "relation needs exactly one of related id, uid or uri",
            ));
        }
        if data.slot(0).as_integer().is_none() && !data.slot(0).is_null() {
            return Err(StoreError::violation("related id must be an integer"));
        }
        match data.slot(3).as_integer() {
            Some(kind) if (0..=2).contains(&kind) => Ok(()),
            _ => Err(StoreError::violation("relation type must be within 0..=2")),
        }
    }

    fn resolve(&self, conn: &Connection, data: PropertyData) -> Result<PropertyData, StoreError> {
        if let Some(related_id) = data.slot(0).as_integer() {
            let uid: Option<String> = conn
                .query_row(
                    "SELECT uid FROM tasks WHERE id = ?1",
                    params![related_id],
                    |row| row.get(0),
                )
                .optional()?
                .flatten();
            return Ok(data.with(1, uid));
        }
        if let Some(related_uid) = data.slot(1).as_text() {
            let related_id: Option<i64> = conn
                .query_row(
                    "SELECT id FROM tasks WHERE uid = ?1",
                    params![related_uid],
                    |row| row.get(0),
                )
                .optional()?;
            return Ok(data.with(0, related_id));
        }
        Ok(data)
    }

    fn searchable_text(&self, _data: &PropertyData) -> Option<String> {
        None
    }
}

fn property_row(row: &Row<'_>) -> rusqlite::Result<PropertyRow> {
    let mut slots: [FieldValue; PROPERTY_DATA_SLOTS] = Default::default();
    for (index, slot) in slots.iter_mut().enumerate() {
        *slot = from_sql_value(row.get::<_, Value>(3 + index)?);
    }
    Ok(PropertyRow {
        id: row.get(0)?,
        task_id: row.get(1)?,
        mimetype: row.get(2)?,
        data: PropertyData::from_slots(slots),
    })
}

const PROPERTY_COLUMNS: &str =
    "id, task_id, mimetype, data0, data1, data2, data3, data4, data5, data6, data7";

fn load_property_tx(conn: &Connection, property_id: i64) -> Result<Option<PropertyRow>, StoreError> {
    let sql = format!("SELECT {PROPERTY_COLUMNS} FROM properties WHERE id = ?1");
    Ok(conn
        .query_row(&sql, params![property_id], property_row)
        .optional()?)
}

/// Task-side bookkeeping after a property write.
fn touch_owner_tx(
    conn: &Connection,
    task_id: i64,
    trusted: bool,
) -> Result<(), StoreError> {
    refresh_property_flags_tx(conn, task_id, AlarmHandler::MIMETYPE)?;
    if !trusted {
        conn.execute(
            "UPDATE tasks SET dirty = 1, last_modified = ?2 WHERE id = ?1",
            params![task_id, now_ms()],
        )?;
    }
    Ok(())
}

impl SqliteStore {
    fn handler(&self, mimetype: &str) -> Result<&dyn PropertyHandler, StoreError> {
        self.handlers
            .get(mimetype)
            .map(|handler| handler.as_ref())
            .ok_or(StoreError::InvalidInput("unknown property mimetype"))
    }

    #[instrument(skip_all, fields(task_id = request.task_id, mimetype = %request.mimetype, trusted = trusted))]
    pub fn insert_property(
        &mut self,
        request: PropertyRequest,
        trusted: bool,
    ) -> Result<i64, StoreError> {
        let handler = self.handler(&request.mimetype)?;
        handler.validate(&request.data)?;
        let data = handler.resolve(&self.conn, request.data)?;
        let searchable = handler.searchable_text(&data);

        let tx = self.conn.transaction()?;
        if !task_exists(&tx, request.task_id)? {
            return Err(StoreError::UnknownId);
        }

        let args = [
            Value::Integer(request.task_id),
            Value::Text(request.mimetype.clone()),
        ]
        .into_iter()
        .chain(data.slots().iter().map(to_sql_value));
        tx.execute(
            "INSERT INTO properties(task_id, mimetype, data0, data1, data2, data3, data4, data5, data6, data7) \
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
            params_from_iter(args),
        )?;
        let property_id = tx.last_insert_rowid();

        replace_grams_tx(
            &tx,
            &self.ngrams,
            IndexKey::property(request.task_id, property_id),
            searchable.as_deref(),
        )?;
        touch_owner_tx(&tx, request.task_id, trusted)?;
        tx.commit()?;

        debug!(property_id, "inserted property");
        self.notify([Collection::Properties, Collection::Tasks]);
        Ok(property_id)
    }

    #[instrument(skip(self, data))]
    pub fn update_property(
        &mut self,
        property_id: i64,
        data: PropertyData,
        trusted: bool,
    ) -> Result<(), StoreError> {
        let Some(existing) = load_property_tx(&self.conn, property_id)? else {
            return Err(StoreError::UnknownId);
        };
        let handler = self.handler(&existing.mimetype)?;
        handler.validate(&data)?;
        let data = handler.resolve(&self.conn, data)?;
        let searchable = handler.searchable_text(&data);

        let tx = self.conn.transaction()?;
        let args = data
            .slots()
            .iter()
            .map(to_sql_value)
            .chain(std::iter::once(Value::Integer(property_id)));
        tx.execute(
            "UPDATE properties SET data0 = ?, data1 = ?, data2 = ?, data3 = ?, data4 = ?, \
             data5 = ?, data6 = ?, data7 = ? WHERE id = ?",
            params_from_iter(args),
        )?;

        replace_grams_tx(
            &tx,
            &self.ngrams,
            IndexKey::property(existing.task_id, property_id),
            searchable.as_deref(),
        )?;
        touch_owner_tx(&tx, existing.task_id, trusted)?;
        tx.commit()?;

        self.notify([Collection::Properties, Collection::Tasks]);
        Ok(())
    }

    #[instrument(skip(self))]
    pub fn delete_property(&mut self, property_id: i64, trusted: bool) -> Result<(), StoreError> {
        let tx = self.conn.transaction()?;
        let Some(existing) = load_property_tx(&tx, property_id)? else {
            return Err(StoreError::UnknownId);
        };

        tx.execute(
            "DELETE FROM search_associations WHERE property_id = ?1",
            params![property_id],
        )?;
        tx.execute("DELETE FROM properties WHERE id = ?1", params![property_id])?;
        touch_owner_tx(&tx, existing.task_id, trusted)?;
        tx.commit()?;

        self.notify([Collection::Properties, Collection::Tasks]);
        Ok(())
    }

    pub fn properties_of(&self, task_id: i64) -> Result<Vec<PropertyRow>, StoreError> {
        let sql = format!("SELECT {PROPERTY_COLUMNS} FROM properties WHERE task_id = ?1 ORDER BY id");
        let mut stmt = self.conn.prepare(&sql)?;
        let rows = stmt.query_map(params![task_id], property_row)?;
        let mut out = Vec::new();
        for row in rows {
            out.push(row?);
        }
        Ok(out)
    }
}
