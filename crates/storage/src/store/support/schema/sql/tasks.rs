#![forbid(unsafe_code)]

pub(super) const SQL: &str = r#"
        CREATE TABLE IF NOT EXISTS tasks (
          id INTEGER PRIMARY KEY AUTOINCREMENT,
          list_id INTEGER NOT NULL,
          title TEXT,
          description TEXT,
          dtstart INTEGER,
          due INTEGER,
          duration TEXT,
          tz TEXT,
          is_allday INTEGER DEFAULT 0,
          status INTEGER,
          percent_complete INTEGER,
          priority INTEGER,
          classification INTEGER,
          completed INTEGER,
          completed_is_allday INTEGER DEFAULT 0,
          created INTEGER,
          last_modified INTEGER,
          is_new INTEGER DEFAULT 1,
          is_closed INTEGER DEFAULT 0,
          has_alarms INTEGER DEFAULT 0,
          has_properties INTEGER DEFAULT 0,
          deleted INTEGER DEFAULT 0,
          dirty INTEGER DEFAULT 0,
          uid TEXT,
          rrule TEXT,
          rdate TEXT,
          exdate TEXT,
          original_instance_id INTEGER,
          original_instance_sync_id TEXT,
          sync_id TEXT,
          sync_version TEXT,
          sync1 TEXT,
          sync2 TEXT,
          sync3 TEXT,
          sync4 TEXT,
          sync5 TEXT,
          sync6 TEXT,
          sync7 TEXT,
          sync8 TEXT,
          FOREIGN KEY(list_id) REFERENCES task_lists(id) ON DELETE CASCADE,
          CHECK(original_instance_id IS NULL OR original_instance_sync_id IS NULL)
        );
"#;
