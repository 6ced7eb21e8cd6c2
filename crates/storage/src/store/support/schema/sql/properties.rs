#![forbid(unsafe_code)]

// data columns are untyped; handlers decide what each slot holds.
pub(super) const SQL: &str = r#"
        CREATE TABLE IF NOT EXISTS properties (
          id INTEGER PRIMARY KEY AUTOINCREMENT,
          task_id INTEGER NOT NULL,
          mimetype TEXT NOT NULL,
          data0, data1, data2, data3, data4, data5, data6, data7,
          FOREIGN KEY(task_id) REFERENCES tasks(id) ON DELETE CASCADE
        );
"#;
