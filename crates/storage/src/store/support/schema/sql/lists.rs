#![forbid(unsafe_code)]

pub(super) const SQL: &str = r#"
        CREATE TABLE IF NOT EXISTS store_meta (
          key TEXT PRIMARY KEY,
          value TEXT NOT NULL
        );

        CREATE TABLE IF NOT EXISTS task_lists (
          id INTEGER PRIMARY KEY AUTOINCREMENT,
          name TEXT NOT NULL,
          color INTEGER,
          account_name TEXT NOT NULL,
          account_type TEXT NOT NULL,
          visible INTEGER NOT NULL DEFAULT 1,
          sync_enabled INTEGER NOT NULL DEFAULT 1,
          sync_id TEXT
        );
"#;
