#![forbid(unsafe_code)]

pub(super) const SQL: &str = r#"
        CREATE TABLE IF NOT EXISTS instances (
          task_id INTEGER PRIMARY KEY,
          instance_start INTEGER,
          instance_due INTEGER,
          instance_duration INTEGER,
          instance_start_sorting INTEGER,
          instance_due_sorting INTEGER,
          FOREIGN KEY(task_id) REFERENCES tasks(id) ON DELETE CASCADE
        );

        CREATE TABLE IF NOT EXISTS ngrams (
          id INTEGER PRIMARY KEY AUTOINCREMENT,
          text TEXT NOT NULL UNIQUE
        );

        CREATE TABLE IF NOT EXISTS search_associations (
          ngram_id INTEGER NOT NULL,
          task_id INTEGER NOT NULL,
          property_id INTEGER,
          content_type TEXT NOT NULL CHECK(content_type IN ('title', 'description', 'property')),
          FOREIGN KEY(ngram_id) REFERENCES ngrams(id) ON DELETE CASCADE,
          FOREIGN KEY(task_id) REFERENCES tasks(id) ON DELETE CASCADE,
          FOREIGN KEY(property_id) REFERENCES properties(id) ON DELETE CASCADE
        );
"#;
