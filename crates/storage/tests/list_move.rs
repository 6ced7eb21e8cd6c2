#![forbid(unsafe_code)]

use tempfile::TempDir;
use tp_core::model::{TaskField, TaskValues};
use tp_storage::{SqliteStore, TaskListRequest};

fn open_store() -> (TempDir, SqliteStore) {
    let dir = TempDir::new().expect("temp dir");
    let store = SqliteStore::open(dir.path()).expect("open store");
    (dir, store)
}

fn synced_list(store: &mut SqliteStore, name: &str) -> i64 {
    store
        .create_list(
            TaskListRequest::new(name, "alice@example.com", "caldav"),
            true,
        )
        .expect("create list")
}

fn load(store: &SqliteStore, task_id: i64) -> TaskValues {
    store
        .get_task(task_id)
        .expect("get task")
        .expect("task exists")
}

fn int(values: &TaskValues, field: TaskField) -> Option<i64> {
    values.integer(field).expect("integer column")
}

fn text(values: &TaskValues, field: TaskField) -> Option<String> {
    values
        .text(field)
        .expect("text column")
        .map(str::to_string)
}

fn move_to(store: &mut SqliteStore, task_id: i64, list_id: i64) {
    store
        .run_update(
            &[task_id],
            TaskValues::new().with(TaskField::ListId, list_id),
            false,
        )
        .expect("move task");
}

#[test]
fn never_synced_task_moves_without_tombstone() {
    let (_dir, mut store) = open_store();
    let list_a = synced_list(&mut store, "A");
    let list_b = synced_list(&mut store, "B");

    let task_id = store
        .run_insert(
            TaskValues::new()
                .with(TaskField::ListId, list_a)
                .with(TaskField::Title, "draft"),
            false,
        )
        .expect("insert");
    move_to(&mut store, task_id, list_b);

    assert!(store.task_ids_in_list(list_a).unwrap().is_empty());
    assert_eq!(store.task_ids_in_list(list_b).unwrap(), vec![task_id]);
    let task = load(&store, task_id);
    assert_eq!(text(&task, TaskField::ListName).as_deref(), Some("B"));
}

#[test]
fn synced_task_leaves_one_tombstone_in_the_old_list() {
    let (_dir, mut store) = open_store();
    let list_a = synced_list(&mut store, "A");
    let list_b = synced_list(&mut store, "B");

    let task_id = store
        .run_insert(
            TaskValues::new()
                .with(TaskField::ListId, list_a)
                .with(TaskField::Title, "file taxes")
                .with(TaskField::SyncId, "remote-17")
                .with(TaskField::SyncVersion, "etag-3")
                .with(TaskField::Sync1, "href"),
            true,
        )
        .expect("sync adapter insert");
    move_to(&mut store, task_id, list_b);

    let left_behind = store.task_ids_in_list(list_a).unwrap();
    assert_eq!(left_behind.len(), 1);
    let tombstone_id = left_behind[0];
    assert_ne!(tombstone_id, task_id);

    let tombstone = load(&store, tombstone_id);
    assert!(tombstone.flag(TaskField::Deleted).unwrap());
    assert!(tombstone.flag(TaskField::Dirty).unwrap());
    assert_eq!(text(&tombstone, TaskField::SyncId).as_deref(), Some("remote-17"));
    assert_eq!(text(&tombstone, TaskField::SyncVersion).as_deref(), Some("etag-3"));
    assert_eq!(text(&tombstone, TaskField::Title).as_deref(), Some("file taxes"));

    let moved = load(&store, task_id);
    assert_eq!(int(&moved, TaskField::ListId), Some(list_b));
    assert!(moved.flag(TaskField::Dirty).unwrap());
    assert_eq!(text(&moved, TaskField::SyncId), None);
    assert_eq!(text(&moved, TaskField::SyncVersion), None);
    assert_eq!(text(&moved, TaskField::Sync1), None);
    assert_eq!(text(&moved, TaskField::Title).as_deref(), Some("file taxes"));

    // The tombstone stays out of search results.
    let hits = store.search("file taxes").unwrap();
    assert_eq!(
        hits.iter().map(|hit| hit.task_id).collect::<Vec<_>>(),
        vec![task_id]
    );
}

#[test]
fn moving_to_the_same_list_is_a_no_op() {
    let (_dir, mut store) = open_store();
    let list_a = synced_list(&mut store, "A");

    let task_id = store
        .run_insert(
            TaskValues::new()
                .with(TaskField::ListId, list_a)
                .with(TaskField::SyncId, "remote-1"),
            true,
        )
        .expect("insert");
    move_to(&mut store, task_id, list_a);

    assert_eq!(store.task_ids_in_list(list_a).unwrap(), vec![task_id]);
    let task = load(&store, task_id);
    assert_eq!(text(&task, TaskField::SyncId).as_deref(), Some("remote-1"));
}

#[test]
fn trusted_callers_move_rows_directly() {
    let (_dir, mut store) = open_store();
    let list_a = synced_list(&mut store, "A");
    let list_b = synced_list(&mut store, "B");

    let task_id = store
        .run_insert(
            TaskValues::new()
                .with(TaskField::ListId, list_a)
                .with(TaskField::SyncId, "remote-1"),
            true,
        )
        .expect("insert");
    store
        .run_update(
            &[task_id],
            TaskValues::new().with(TaskField::ListId, list_b),
            true,
        )
        .expect("trusted move");

    assert!(store.task_ids_in_list(list_a).unwrap().is_empty());
    let task = load(&store, task_id);
    assert_eq!(text(&task, TaskField::SyncId).as_deref(), Some("remote-1"));
}

#[test]
fn moving_to_an_unknown_list_fails() {
    let (_dir, mut store) = open_store();
    let list_a = synced_list(&mut store, "A");
    let task_id = store
        .run_insert(TaskValues::new().with(TaskField::ListId, list_a), false)
        .expect("insert");

    let err = store
        .run_update(
            &[task_id],
            TaskValues::new().with(TaskField::ListId, 9_999),
            false,
        )
        .unwrap_err();
    assert_eq!(err.code(), "UNKNOWN_LIST");
    assert_eq!(store.task_ids_in_list(list_a).unwrap(), vec![task_id]);
}

#[test]
fn exception_move_carries_the_whole_recurrence_set() {
    let (_dir, mut store) = open_store();
    let list_a = synced_list(&mut store, "A");
    let list_b = synced_list(&mut store, "B");

    let master = store
        .run_insert(
            TaskValues::new()
                .with(TaskField::ListId, list_a)
                .with(TaskField::Title, "weekly review")
                .with(TaskField::Rrule, "FREQ=WEEKLY")
                .with(TaskField::SyncId, "master-sync"),
            true,
        )
        .expect("insert master");
    let exception = |sync_id: &str| {
        TaskValues::new()
            .with(TaskField::ListId, list_a)
            .with(TaskField::Title, "weekly review")
            .with(TaskField::OriginalInstanceId, master)
            .with(TaskField::SyncId, sync_id)
    };
    let first = store
        .run_insert(exception("first-sync"), true)
        .expect("insert first exception");
    let second = store
        .run_insert(exception("second-sync"), true)
        .expect("insert second exception");

    move_to(&mut store, second, list_b);

    let mut moved = store.task_ids_in_list(list_b).unwrap();
    moved.sort_unstable();
    assert_eq!(moved, vec![master, first, second]);
    for task_id in [master, first, second] {
        let task = load(&store, task_id);
        assert_eq!(text(&task, TaskField::SyncId), None, "task {task_id}");
        assert!(task.flag(TaskField::Dirty).unwrap());
        assert!(
            int(&task, TaskField::LastModifiedAt).is_some(),
            "task {task_id} not stamped"
        );
    }
    assert_eq!(
        int(&load(&store, first), TaskField::OriginalInstanceId),
        Some(master)
    );

    // Tombstones are created master first, then exceptions by id.
    let tombstones = store.task_ids_in_list(list_a).unwrap();
    assert_eq!(tombstones.len(), 3);
    let (master_tombstone, exception_tombstones) = (tombstones[0], &tombstones[1..]);

    let master_row = load(&store, master_tombstone);
    assert_eq!(text(&master_row, TaskField::SyncId).as_deref(), Some("master-sync"));
    assert_eq!(text(&master_row, TaskField::Rrule).as_deref(), Some("FREQ=WEEKLY"));
    assert!(master_row.flag(TaskField::Deleted).unwrap());

    let sync_ids: Vec<_> = exception_tombstones
        .iter()
        .map(|id| {
            let row = load(&store, *id);
            assert!(row.flag(TaskField::Deleted).unwrap());
            assert_eq!(int(&row, TaskField::OriginalInstanceId), Some(master_tombstone));
            text(&row, TaskField::SyncId)
        })
        .collect();
    assert_eq!(
        sync_ids,
        vec![Some("first-sync".to_string()), Some("second-sync".to_string())]
    );
}
