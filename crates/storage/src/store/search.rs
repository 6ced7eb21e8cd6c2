#![forbid(unsafe_code)]

//! Query evaluation over the n-gram index.
//!
//! A task's relevance is the share of distinct query grams it matches,
//! capped at one. Short queries match grams by prefix instead of equality
//! so that a two-letter query still finds longer words.

use super::{SearchHit, SearchOrder, SearchRequest, SqliteStore, StoreError};
use rusqlite::params_from_iter;
use rusqlite::types::Value;
use tracing::{debug, instrument};

fn escape_like(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for ch in value.chars() {
        if matches!(ch, '\\' | '%' | '_') {
            out.push('\\');
        }
        out.push(ch);
    }
    out
}

fn order_clause(order: SearchOrder) -> &'static str {
    match order {
        SearchOrder::Due => "t.due IS NULL, t.due ASC, ",
        SearchOrder::Start => "t.dtstart IS NULL, t.dtstart ASC, ",
        SearchOrder::Title => "t.title COLLATE NOCASE ASC, ",
        SearchOrder::Id => "",
    }
}

impl SqliteStore {
    pub fn search(&self, query: &str) -> Result<Vec<SearchHit>, StoreError> {
        self.search_with(&SearchRequest::new(query))
    }

    #[instrument(skip_all, fields(query = %request.query, list_id = request.list_id))]
    pub fn search_with(&self, request: &SearchRequest) -> Result<Vec<SearchHit>, StoreError> {
        let query = request.query.trim();
        let grams = self.ngrams.grams(query);
        if grams.is_empty() {
            return Ok(Vec::new());
        }

        let prefix = query.chars().count() < self.config.search.prefix_query_below;
        let limit = request.limit.unwrap_or(self.config.search.default_limit);

        // Placeholders are positional; `args` follows their textual order.
        let mut args: Vec<Value> = Vec::new();
        args.push(Value::Real(grams.len() as f64));

        let gram_filter = if prefix {
            grams
                .iter()
                .map(|gram| {
                    args.push(Value::Text(format!("{}%", escape_like(gram))));
                    "n.text LIKE ? ESCAPE '\\'"
                })
                .collect::<Vec<_>>()
                .join(" OR ")
        } else {
            let placeholders = grams
                .iter()
                .map(|gram| {
                    args.push(Value::Text(gram.clone()));
                    "?"
                })
                .collect::<Vec<_>>()
                .join(", ");
            format!("n.text IN ({placeholders})")
        };

        let list_filter = match request.list_id {
            Some(list_id) => {
                args.push(Value::Integer(list_id));
                " AND t.list_id = ?"
            }
            None => "",
        };

        args.push(Value::Real(self.config.search.min_relevance));
        args.push(Value::Integer(i64::try_from(limit).unwrap_or(i64::MAX)));

        let sql = format!(
            r#"
            SELECT a.task_id, MIN(1.0, COUNT(DISTINCT a.ngram_id) / ?) AS relevance
            FROM search_associations a
            JOIN ngrams n ON n.id = a.ngram_id
            JOIN tasks t ON t.id = a.task_id
            WHERE ({gram_filter}) AND ifnull(t.deleted, 0) = 0{list_filter}
            GROUP BY a.task_id
            HAVING relevance > ?
            ORDER BY relevance DESC, {order}a.task_id ASC
            LIMIT ?
            "#,
            order = order_clause(request.order),
        );

        let mut stmt = self.conn.prepare(&sql)?;
        let rows = stmt.query_map(params_from_iter(args), |row| {
            Ok(SearchHit {
                task_id: row.get(0)?,
                relevance: row.get(1)?,
            })
        })?;
        let mut out = Vec::new();
        for row in rows {
            out.push(row?);
        }

        debug!(grams = grams.len(), prefix, hits = out.len(), "search evaluated");
        Ok(out)
    }
}
