#![forbid(unsafe_code)]

pub(super) const SQL: &str = r#"
        CREATE INDEX IF NOT EXISTS idx_tasks_list ON tasks(list_id, id);
        CREATE INDEX IF NOT EXISTS idx_tasks_original_instance ON tasks(original_instance_id) WHERE original_instance_id IS NOT NULL;
        CREATE INDEX IF NOT EXISTS idx_properties_task ON properties(task_id, mimetype);
        CREATE INDEX IF NOT EXISTS idx_instances_start_sorting ON instances(instance_start_sorting);
        CREATE INDEX IF NOT EXISTS idx_instances_due_sorting ON instances(instance_due_sorting);
        CREATE UNIQUE INDEX IF NOT EXISTS idx_search_associations_unique
          ON search_associations(task_id, ifnull(property_id, 0), content_type, ngram_id);
        CREATE INDEX IF NOT EXISTS idx_search_associations_ngram ON search_associations(ngram_id, task_id);
"#;
