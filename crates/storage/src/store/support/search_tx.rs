#![forbid(unsafe_code)]

use super::super::StoreError;
use rusqlite::{Connection, params};
use std::collections::BTreeSet;
use tp_core::model::ContentType;
use tp_core::ngrams::NGramGenerator;
use tracing::debug;

/// The association key whose rows are replaced as a unit.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(in crate::store) struct IndexKey {
    pub task_id: i64,
    pub property_id: Option<i64>,
    pub content_type: ContentType,
}

impl IndexKey {
    pub fn task_text(task_id: i64, content_type: ContentType) -> Self {
        Self {
            task_id,
            property_id: None,
            content_type,
        }
    }

    pub fn property(task_id: i64, property_id: i64) -> Self {
        Self {
            task_id,
            property_id: Some(property_id),
            content_type: ContentType::Property,
        }
    }
}

fn ngram_id_tx(conn: &Connection, text: &str) -> Result<i64, StoreError> {
    conn.execute(
        "INSERT INTO ngrams(text) VALUES (?1) ON CONFLICT(text) DO NOTHING",
        params![text],
    )?;
    Ok(conn.query_row(
        "SELECT id FROM ngrams WHERE text = ?1",
        params![text],
        |row| row.get::<_, i64>(0),
    )?)
}

/// Deletes every association under `key` and re-inserts the grams of `text`.
///
/// Returns the number of grams indexed.
pub(in crate::store) fn replace_grams_tx(
    conn: &Connection,
    ngrams: &NGramGenerator,
    key: IndexKey,
    text: Option<&str>,
) -> Result<usize, StoreError> {
    conn.execute(
        "DELETE FROM search_associations WHERE task_id = ?1 AND content_type = ?2 AND property_id IS ?3",
        params![key.task_id, key.content_type.as_str(), key.property_id],
    )?;

    let grams = match text.map(str::trim) {
        Some(text) if !text.is_empty() => ngrams.grams(text),
        _ => BTreeSet::new(),
    };

    for gram in &grams {
        let ngram_id = ngram_id_tx(conn, gram)?;
        conn.execute(
            "INSERT OR IGNORE INTO search_associations(ngram_id, task_id, property_id, content_type) \
             VALUES (?1, ?2, ?3, ?4)",
            params![
                ngram_id,
                key.task_id,
                key.property_id,
                key.content_type.as_str()
            ],
        )?;
    }

    debug!(
        task_id = key.task_id,
        property_id = key.property_id,
        content_type = key.content_type.as_str(),
        grams = grams.len(),
        "rebuilt search associations"
    );
    Ok(grams.len())
}

pub(in crate::store) fn delete_task_associations_tx(
    conn: &Connection,
    task_id: i64,
) -> Result<usize, StoreError> {
    Ok(conn.execute(
        "DELETE FROM search_associations WHERE task_id = ?1",
        params![task_id],
    )?)
}

pub(in crate::store) fn task_grams_tx(
    conn: &Connection,
    task_id: i64,
    content_type: ContentType,
) -> Result<BTreeSet<String>, StoreError> {
    let mut stmt = conn.prepare(
        "SELECT n.text FROM search_associations a JOIN ngrams n ON n.id = a.ngram_id \
         WHERE a.task_id = ?1 AND a.content_type = ?2",
    )?;
    let rows = stmt.query_map(params![task_id, content_type.as_str()], |row| {
        row.get::<_, String>(0)
    })?;
    let mut out = BTreeSet::new();
    for row in rows {
        out.insert(row?);
    }
    Ok(out)
}
