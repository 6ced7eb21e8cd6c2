#![forbid(unsafe_code)]

use std::sync::{Arc, Mutex};
use tempfile::TempDir;
use tp_core::model::{Collection, TaskField, TaskValues};
use tp_storage::{
    AlarmHandler, AutoUpdate, CategoryHandler, ChangeObserver, PropertyData, PropertyRequest,
    ProcessorChain, ProcessorContext, RelationHandler, SqliteStore, StoreConfig, StoreError,
    TaskChangeSet, TaskListRequest, TaskProcessor, Validator,
};

fn open_store() -> (TempDir, SqliteStore) {
    let dir = TempDir::new().expect("temp dir");
    let store = SqliteStore::open(dir.path()).expect("open store");
    (dir, store)
}

fn list(store: &mut SqliteStore, account_type: &str) -> i64 {
    store
        .create_list(TaskListRequest::new("Inbox", "owner", account_type), true)
        .expect("create list")
}

fn insert_trusted(store: &mut SqliteStore, list_id: i64) -> i64 {
    store
        .run_insert(
            TaskValues::new()
                .with(TaskField::ListId, list_id)
                .with(TaskField::Title, "plan trip"),
            true,
        )
        .expect("insert task")
}

fn alarm(task_id: i64, minutes_before: i64) -> PropertyRequest {
    PropertyRequest {
        task_id,
        mimetype: AlarmHandler::MIMETYPE.to_string(),
        data: PropertyData::new()
            .with(0, minutes_before)
            .with(1, 1)
            .with(3, 1),
    }
}

#[derive(Default)]
struct Recorder(Mutex<Vec<Collection>>);

impl Recorder {
    fn take(&self) -> Vec<Collection> {
        std::mem::take(&mut *self.0.lock().expect("recorder lock"))
    }
}

impl ChangeObserver for Recorder {
    fn on_change(&self, collection: Collection) {
        self.0.lock().expect("recorder lock").push(collection);
    }
}

#[test]
fn property_writes_maintain_task_flags() {
    let (_dir, mut store) = open_store();
    let list_id = list(&mut store, "caldav");
    let task_id = insert_trusted(&mut store, list_id);

    let alarm_id = store
        .insert_property(alarm(task_id, 15), false)
        .expect("insert alarm");
    let task = store.get_task(task_id).unwrap().unwrap();
    assert!(task.flag(TaskField::HasAlarms).unwrap());
    assert!(task.flag(TaskField::HasProperties).unwrap());
    assert!(task.flag(TaskField::Dirty).unwrap());

    let rows = store.properties_of(task_id).unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].id, alarm_id);
    assert_eq!(rows[0].data.slot(0).as_integer(), Some(15));

    store
        .insert_property(
            PropertyRequest {
                task_id,
                mimetype: CategoryHandler::MIMETYPE.to_string(),
                data: PropertyData::new().with(1, "Travel"),
            },
            true,
        )
        .expect("insert category");
    assert_eq!(
        store
            .search("travel")
            .unwrap()
            .iter()
            .map(|hit| hit.task_id)
            .collect::<Vec<_>>(),
        vec![task_id]
    );

    store.delete_property(alarm_id, true).expect("delete alarm");
    let task = store.get_task(task_id).unwrap().unwrap();
    assert!(!task.flag(TaskField::HasAlarms).unwrap());
    assert!(task.flag(TaskField::HasProperties).unwrap());
}

#[test]
fn property_validation_rejects_bad_rows() {
    let (_dir, mut store) = open_store();
    let list_id = list(&mut store, "caldav");
    let task_id = insert_trusted(&mut store, list_id);

    let err = store.insert_property(alarm(task_id, -5), false).unwrap_err();
    assert_eq!(err.code(), "INVARIANT_VIOLATION");

    let err = store
        .insert_property(
            PropertyRequest {
                task_id,
                mimetype: CategoryHandler::MIMETYPE.to_string(),
                data: PropertyData::new(),
            },
            false,
        )
        .unwrap_err();
    assert_eq!(err.code(), "INVARIANT_VIOLATION");

    let err = store
        .insert_property(
            PropertyRequest {
                task_id,
                mimetype: "attachment".to_string(),
                data: PropertyData::new(),
            },
            false,
        )
        .unwrap_err();
    assert!(matches!(err, StoreError::InvalidInput(_)));

    let err = store.insert_property(alarm(9_999, 5), false).unwrap_err();
    assert!(matches!(err, StoreError::UnknownId));

    assert!(store.properties_of(task_id).unwrap().is_empty());
    let task = store.get_task(task_id).unwrap().unwrap();
    assert!(!task.flag(TaskField::HasProperties).unwrap());
}

fn relation(task_id: i64, data: PropertyData) -> PropertyRequest {
    PropertyRequest {
        task_id,
        mimetype: RelationHandler::MIMETYPE.to_string(),
        data,
    }
}

#[test]
fn relations_resolve_the_missing_task_reference() {
    let (_dir, mut store) = open_store();
    let list_id = list(&mut store, "caldav");
    let child = insert_trusted(&mut store, list_id);
    let parent = store
        .run_insert(
            TaskValues::new()
                .with(TaskField::ListId, list_id)
                .with(TaskField::Uid, "parent-uid"),
            true,
        )
        .expect("insert parent");

    let by_id = store
        .insert_property(relation(child, PropertyData::new().with(0, parent).with(3, 0)), false)
        .expect("relate by id");
    let by_uid = store
        .insert_property(
            relation(child, PropertyData::new().with(1, "parent-uid").with(3, 0)),
            false,
        )
        .expect("relate by uid");
    let dangling = store
        .insert_property(
            relation(child, PropertyData::new().with(1, "unknown-uid").with(3, 2)),
            false,
        )
        .expect("relate to a task not synced yet");

    let rows = store.properties_of(child).unwrap();
    let row = |id: i64| rows.iter().find(|row| row.id == id).expect("relation row");
    for id in [by_id, by_uid] {
        assert_eq!(row(id).data.slot(0).as_integer(), Some(parent));
        assert_eq!(row(id).data.slot(1).as_text(), Some("parent-uid"));
        assert!(row(id).data.slot(2).is_null());
    }
    assert!(row(dangling).data.slot(0).is_null());
    assert_eq!(row(dangling).data.slot(1).as_text(), Some("unknown-uid"));

    let task = store.get_task(child).unwrap().unwrap();
    assert!(task.flag(TaskField::HasProperties).unwrap());
    assert!(!task.flag(TaskField::HasAlarms).unwrap());
}

#[test]
fn relations_need_exactly_one_reference() {
    let (_dir, mut store) = open_store();
    let list_id = list(&mut store, "caldav");
    let task_id = insert_trusted(&mut store, list_id);

    for data in [
        PropertyData::new().with(3, 0),
        PropertyData::new().with(0, task_id).with(1, "uid").with(3, 0),
        PropertyData::new()
            .with(1, "uid")
            .with(2, "https://example.com/tasks/1")
            .with(3, 1),
        PropertyData::new().with(2, "https://example.com/tasks/1").with(3, 7),
    ] {
        let err = store
            .insert_property(relation(task_id, data), false)
            .unwrap_err();
        assert_eq!(err.code(), "INVARIANT_VIOLATION");
    }

    let uri = store
        .insert_property(
            relation(
                task_id,
                PropertyData::new().with(2, "https://example.com/tasks/1").with(3, 1),
            ),
            false,
        )
        .expect("relate by uri");
    store
        .update_property(uri, PropertyData::new().with(0, task_id).with(2, "x").with(3, 1), false)
        .unwrap_err();
    assert_eq!(
        store.properties_of(task_id).unwrap()[0].data.slot(2).as_text(),
        Some("https://example.com/tasks/1")
    );
}

#[test]
fn observers_hear_each_collection_once_per_operation() {
    let (_dir, mut store) = open_store();
    let recorder = Arc::new(Recorder::default());
    store.subscribe(recorder.clone());

    let list_id = list(&mut store, "caldav");
    assert_eq!(recorder.take(), vec![Collection::Lists]);

    let first = insert_trusted(&mut store, list_id);
    let second = insert_trusted(&mut store, list_id);
    assert_eq!(
        recorder.take(),
        vec![
            Collection::Tasks,
            Collection::Instances,
            Collection::Tasks,
            Collection::Instances
        ]
    );

    store
        .run_update(
            &[first, second],
            TaskValues::new().with(TaskField::Priority, 3),
            false,
        )
        .expect("bulk update");
    assert_eq!(
        recorder.take(),
        vec![Collection::Tasks, Collection::Instances]
    );

    store
        .insert_property(alarm(first, 10), true)
        .expect("insert alarm");
    assert_eq!(
        recorder.take(),
        vec![Collection::Tasks, Collection::Properties]
    );

    let _ = store
        .run_update(
            &[first],
            TaskValues::new().with(TaskField::Priority, 42),
            false,
        )
        .unwrap_err();
    assert!(recorder.take().is_empty());

    assert_eq!(store.run_update(&[404], TaskValues::new(), true).unwrap(), 0);
    assert!(recorder.take().is_empty());
}

struct TitleDefault;

impl TaskProcessor for TitleDefault {
    fn name(&self) -> &'static str {
        "title_default"
    }

    fn before_insert(
        &self,
        _ctx: &ProcessorContext<'_>,
        task: &mut TaskChangeSet,
        _trusted: bool,
    ) -> Result<(), StoreError> {
        if task.value_of(TaskField::Title).is_null() {
            task.set(TaskField::Title, "untitled")?;
        }
        Ok(())
    }
}

#[test]
fn custom_chains_run_only_their_processors() {
    let dir = TempDir::new().expect("temp dir");
    let chain = ProcessorChain::empty()
        .with(Validator)
        .with(AutoUpdate)
        .with(TitleDefault);
    assert_eq!(chain.names(), vec!["validator", "auto_update", "title_default"]);

    let mut store =
        SqliteStore::open_with(dir.path(), StoreConfig::default(), chain).expect("open store");
    let list_id = list(&mut store, "caldav");
    let task_id = store
        .run_insert(TaskValues::new().with(TaskField::ListId, list_id), false)
        .expect("insert");

    let task = store.get_task(task_id).unwrap().unwrap();
    assert_eq!(task.text(TaskField::Title).unwrap(), Some("untitled"));
    assert!(task.flag(TaskField::IsNew).unwrap());
    assert!(store.get_instance(task_id).unwrap().is_none());
    assert!(store.search("untitled").unwrap().is_empty());

    let err = store
        .run_insert(TaskValues::new().with(TaskField::ListId, 77), false)
        .unwrap_err();
    assert!(matches!(err, StoreError::UnknownList(77)));
}

#[test]
fn config_file_selects_database_and_local_account() {
    let dir = TempDir::new().expect("temp dir");
    let config_path = dir.path().join("store.json");
    std::fs::write(
        &config_path,
        r#"{ "database_file": "custom.db", "local_account_type": "device" }"#,
    )
    .expect("write config");
    let config = StoreConfig::from_json_file(&config_path).expect("load config");

    let mut store = SqliteStore::open_with(dir.path(), config, ProcessorChain::standard())
        .expect("open store");
    assert!(dir.path().join("custom.db").exists());
    assert!(!dir.path().join("tasks.db").exists());
    assert_eq!(store.config().local_account_type, "device");
    assert_eq!(store.storage_dir(), dir.path());

    let device = list(&mut store, "device");
    let legacy_local = list(&mut store, "local");
    let purged = store
        .run_insert(TaskValues::new().with(TaskField::ListId, device), false)
        .expect("insert device task");
    let kept = store
        .run_insert(TaskValues::new().with(TaskField::ListId, legacy_local), false)
        .expect("insert local task");

    store.run_delete(&[purged, kept], false).expect("delete");
    assert!(store.get_task(purged).unwrap().is_none());
    assert!(store.get_task(kept).unwrap().is_some());
}

#[test]
fn invalid_config_is_rejected_before_opening() {
    let dir = TempDir::new().expect("temp dir");
    let mut config = StoreConfig::default();
    config.search.min_relevance = 1.5;

    let err = SqliteStore::open_with(dir.path(), config, ProcessorChain::standard()).unwrap_err();
    assert_eq!(err.code(), "CONFIG");
    assert!(!dir.path().join("tasks.db").exists());
}
