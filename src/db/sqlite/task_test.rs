//! Tests for SqliteTaskRepository.

use chrono::{Duration, NaiveDate, NaiveDateTime};

use crate::db::{
    Database, DbError, ListFilter, NewTag, NewTask, NewTaskList, SqliteDatabase, TagRepository,
    TaskFilter, TaskListRepository, TaskPatch, TaskRepository,
};

async fn setup_db() -> SqliteDatabase {
    let db = SqliteDatabase::in_memory()
        .await
        .expect("Failed to create in-memory database");
    db.migrate().await.expect("Migration should succeed");
    db
}

async fn make_tags(db: &SqliteDatabase, names: &[&str]) {
    for name in names {
        db.tags()
            .create(&NewTag::new(*name))
            .await
            .expect("Create tag should succeed");
    }
}

fn day(d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 6, d).unwrap()
}

fn due(d: u32, h: u32) -> NaiveDateTime {
    day(d).and_hms_opt(h, 30, 0).unwrap()
}

#[tokio::test(flavor = "multi_thread")]
async fn task_create_and_get() {
    let db = setup_db().await;
    let tasks = db.tasks();

    let mut new_task = NewTask::new("Complete the implementation").due(due(3, 9));
    new_task.description = Some("All modules".to_string());
    new_task.priority = 2;

    let created = tasks.create(&new_task).await.expect("Create should succeed");
    assert!(created.task.id > 0);
    assert!(!created.task.completed);
    assert!(created.task.completed_at.is_none());
    assert_eq!(created.task.created_at, created.task.updated_at);

    let retrieved = tasks
        .get(created.task.id)
        .await
        .expect("Get should succeed");
    assert_eq!(retrieved.task.title, "Complete the implementation");
    assert_eq!(retrieved.task.description, Some("All modules".to_string()));
    assert_eq!(retrieved.task.priority, 2);
    assert_eq!(retrieved.task.due_date, Some(due(3, 9)));
    assert!(retrieved.task.list_id.is_none());
    assert!(retrieved.tags.is_empty());
    assert!(retrieved.subtasks.is_empty());
}

#[tokio::test(flavor = "multi_thread")]
async fn task_create_defaults_priority_to_lowest() {
    let db = setup_db().await;
    let created = db
        .tasks()
        .create(&NewTask::new("Defaults"))
        .await
        .expect("Create should succeed");
    assert_eq!(created.task.priority, 4);
}

#[tokio::test(flavor = "multi_thread")]
async fn task_create_empty_title_is_rejected_before_storage() {
    let db = setup_db().await;

    let err = db.tasks().create(&NewTask::new("")).await.unwrap_err();
    assert!(matches!(err, DbError::Validation { .. }));

    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM tasks")
        .fetch_one(db.pool())
        .await
        .unwrap();
    assert_eq!(count, 0);
}

#[tokio::test(flavor = "multi_thread")]
async fn task_create_with_unknown_list_is_rejected() {
    let db = setup_db().await;

    let err = db
        .tasks()
        .create(&NewTask::new("Orphan").in_list(42))
        .await
        .unwrap_err();
    assert!(matches!(err, DbError::Validation { .. }));
}

#[tokio::test(flavor = "multi_thread")]
async fn task_create_skips_unknown_tags() {
    let db = setup_db().await;
    make_tags(&db, &["Urgent"]).await;

    let created = db
        .tasks()
        .create(&NewTask::new("Tagged").with_tags(["Urgent", "Nonexistent", "Urgent"]))
        .await
        .expect("Create should succeed");

    assert_eq!(created.tag_names(), vec!["Urgent"]);

    // No tag was auto-created
    let tags = db.tags().list().await.unwrap();
    assert_eq!(tags.len(), 1);
}

#[tokio::test(flavor = "multi_thread")]
async fn task_get_nonexistent_returns_not_found() {
    let db = setup_db().await;

    let result = db.tasks().get(9999).await;
    assert!(matches!(result, Err(DbError::NotFound { .. })));
}

#[tokio::test(flavor = "multi_thread")]
async fn task_list_is_newest_first() {
    let db = setup_db().await;
    let tasks = db.tasks();

    let first = tasks.create(&NewTask::new("First")).await.unwrap();
    let second = tasks.create(&NewTask::new("Second")).await.unwrap();
    let third = tasks.create(&NewTask::new("Third")).await.unwrap();

    let result = tasks.list(&TaskFilter::default()).await.unwrap();
    let ids: Vec<_> = result.iter().map(|t| t.task.id).collect();
    assert_eq!(ids, vec![third.task.id, second.task.id, first.task.id]);
}

#[tokio::test(flavor = "multi_thread")]
async fn task_list_inbox_and_list_filters() {
    let db = setup_db().await;
    let work = db
        .task_lists()
        .create(&NewTaskList::new("Work"))
        .await
        .unwrap();
    let home = db
        .task_lists()
        .create(&NewTaskList::new("Home"))
        .await
        .unwrap();

    let tasks = db.tasks();
    tasks.create(&NewTask::new("Inbox one")).await.unwrap();
    tasks.create(&NewTask::new("Inbox two")).await.unwrap();
    tasks
        .create(&NewTask::new("Work task").in_list(work.id))
        .await
        .unwrap();
    tasks
        .create(&NewTask::new("Home task").in_list(home.id))
        .await
        .unwrap();

    let inbox = tasks.list(&TaskFilter::inbox()).await.unwrap();
    assert_eq!(inbox.len(), 2);
    assert!(inbox.iter().all(|t| t.task.list_id.is_none()));

    let in_work = tasks.list(&TaskFilter::for_list(work.id)).await.unwrap();
    assert_eq!(in_work.len(), 1);
    assert_eq!(in_work[0].task.title, "Work task");

    let everything = tasks
        .list(&TaskFilter {
            list: ListFilter::Any,
            ..Default::default()
        })
        .await
        .unwrap();
    assert_eq!(everything.len(), 4);
}

#[tokio::test(flavor = "multi_thread")]
async fn task_list_tag_filter_never_duplicates() {
    let db = setup_db().await;
    make_tags(&db, &["Urgent", "Meeting"]).await;
    let tags = db.tags().list().await.unwrap();
    let urgent = tags.iter().find(|t| t.name == "Urgent").unwrap().id;
    let meeting = tags.iter().find(|t| t.name == "Meeting").unwrap().id;

    let tasks = db.tasks();
    tasks
        .create(&NewTask::new("Both").with_tags(["Urgent", "Meeting"]))
        .await
        .unwrap();
    tasks
        .create(&NewTask::new("Only meeting").with_tags(["Meeting"]))
        .await
        .unwrap();
    tasks.create(&NewTask::new("None")).await.unwrap();

    let urgent_tasks = tasks.list(&TaskFilter::for_tag(urgent)).await.unwrap();
    assert_eq!(urgent_tasks.len(), 1);
    assert_eq!(urgent_tasks[0].task.title, "Both");

    let meeting_tasks = tasks.list(&TaskFilter::for_tag(meeting)).await.unwrap();
    assert_eq!(meeting_tasks.len(), 2);
}

#[tokio::test(flavor = "multi_thread")]
async fn task_list_due_date_filters() {
    let db = setup_db().await;
    let tasks = db.tasks();

    tasks
        .create(&NewTask::new("Early").due(due(1, 8)))
        .await
        .unwrap();
    tasks
        .create(&NewTask::new("Morning").due(due(2, 8)))
        .await
        .unwrap();
    tasks
        .create(&NewTask::new("Evening").due(due(2, 20)))
        .await
        .unwrap();
    tasks
        .create(&NewTask::new("Later").due(due(5, 12)))
        .await
        .unwrap();
    tasks.create(&NewTask::new("Undated")).await.unwrap();

    let on_day = tasks.list(&TaskFilter::due_on(day(2))).await.unwrap();
    let mut titles: Vec<_> = on_day.iter().map(|t| t.task.title.as_str()).collect();
    titles.sort();
    assert_eq!(titles, vec!["Evening", "Morning"]);

    let upcoming = tasks.list(&TaskFilter::due_from(day(2))).await.unwrap();
    assert_eq!(upcoming.len(), 3);
    assert!(upcoming.iter().all(|t| t.task.title != "Early"));

    // Both date predicates apply together
    let both = tasks
        .list(&TaskFilter {
            due_date: Some(day(5)),
            due_after: Some(day(2)),
            ..Default::default()
        })
        .await
        .unwrap();
    assert_eq!(both.len(), 1);
    assert_eq!(both[0].task.title, "Later");
}

#[tokio::test(flavor = "multi_thread")]
async fn task_get_nests_subtasks_recursively() {
    let db = setup_db().await;
    let tasks = db.tasks();

    let root = tasks.create(&NewTask::new("Root")).await.unwrap();
    let child = tasks
        .create(&NewTask::new("Child").with_parent(root.task.id))
        .await
        .unwrap();
    tasks
        .create(&NewTask::new("Grandchild").with_parent(child.task.id))
        .await
        .unwrap();

    let tree = tasks.get(root.task.id).await.unwrap();
    assert_eq!(tree.subtasks.len(), 1);
    assert_eq!(tree.subtasks[0].task.title, "Child");
    assert_eq!(tree.subtasks[0].subtasks.len(), 1);
    assert_eq!(tree.subtasks[0].subtasks[0].task.title, "Grandchild");
}

#[tokio::test(flavor = "multi_thread")]
async fn task_create_with_unknown_parent_is_rejected() {
    let db = setup_db().await;
    let err = db
        .tasks()
        .create(&NewTask::new("Lost").with_parent(77))
        .await
        .unwrap_err();
    assert!(matches!(err, DbError::Validation { .. }));
}

#[tokio::test(flavor = "multi_thread")]
async fn task_update_partial_fields() {
    let db = setup_db().await;
    let list = db
        .task_lists()
        .create(&NewTaskList::new("Work"))
        .await
        .unwrap();
    let tasks = db.tasks();

    let created = tasks
        .create(&NewTask::new("Original").due(due(4, 10)))
        .await
        .unwrap();

    let patch = TaskPatch {
        title: Some("Updated title".to_string()),
        priority: Some(1),
        list_id: Some(Some(list.id)),
        ..Default::default()
    };
    let updated = tasks.update(created.task.id, &patch).await.unwrap();

    assert_eq!(updated.task.title, "Updated title");
    assert_eq!(updated.task.priority, 1);
    assert_eq!(updated.task.list_id, Some(list.id));
    assert_eq!(updated.task.due_date, Some(due(4, 10)));
    assert_eq!(updated.task.created_at, created.task.created_at);
    assert!(updated.task.updated_at >= created.task.updated_at);

    let cleared = tasks
        .update(
            created.task.id,
            &TaskPatch {
                due_date: Some(None),
                list_id: Some(None),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert!(cleared.task.due_date.is_none());
    assert!(cleared.task.list_id.is_none());
    assert_eq!(cleared.task.title, "Updated title");
}

#[tokio::test(flavor = "multi_thread")]
async fn task_update_replaces_tag_set() {
    let db = setup_db().await;
    make_tags(&db, &["Urgent", "Meeting"]).await;
    let tasks = db.tasks();

    let created = tasks
        .create(&NewTask::new("Prepare slides").with_tags(["Urgent", "Meeting"]))
        .await
        .unwrap();
    assert_eq!(created.tags.len(), 2);

    let patch = TaskPatch {
        tags: Some(vec!["Urgent".to_string()]),
        ..Default::default()
    };
    let updated = tasks.update(created.task.id, &patch).await.unwrap();
    assert_eq!(updated.tag_names(), vec!["Urgent"]);

    // Omitting tags leaves them alone
    let untouched = tasks
        .update(
            created.task.id,
            &TaskPatch {
                description: Some(Some("notes".to_string())),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(untouched.tag_names(), vec!["Urgent"]);

    // An empty list clears them
    let cleared = tasks
        .update(
            created.task.id,
            &TaskPatch {
                tags: Some(vec![]),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert!(cleared.tags.is_empty());
}

#[tokio::test(flavor = "multi_thread")]
async fn task_update_nonexistent_returns_not_found() {
    let db = setup_db().await;
    let patch = TaskPatch {
        title: Some("Nope".to_string()),
        ..Default::default()
    };
    let err = db.tasks().update(9999, &patch).await.unwrap_err();
    assert!(matches!(err, DbError::NotFound { .. }));
}

#[tokio::test(flavor = "multi_thread")]
async fn task_update_rejects_invalid_priority() {
    let db = setup_db().await;
    let created = db.tasks().create(&NewTask::new("Task")).await.unwrap();

    let err = db
        .tasks()
        .update(
            created.task.id,
            &TaskPatch {
                priority: Some(9),
                ..Default::default()
            },
        )
        .await
        .unwrap_err();
    assert!(matches!(err, DbError::Validation { .. }));

    let unchanged = db.tasks().get(created.task.id).await.unwrap();
    assert_eq!(unchanged.task.priority, 4);
}

#[tokio::test(flavor = "multi_thread")]
async fn task_update_failure_rolls_back_everything() {
    let db = setup_db().await;
    make_tags(&db, &["Urgent"]).await;
    let created = db
        .tasks()
        .create(&NewTask::new("Keep me").with_tags(["Urgent"]))
        .await
        .unwrap();

    // Title and tags change, but the list does not exist
    let patch = TaskPatch {
        title: Some("Changed".to_string()),
        tags: Some(vec![]),
        list_id: Some(Some(404)),
        ..Default::default()
    };
    assert!(db.tasks().update(created.task.id, &patch).await.is_err());

    let after = db.tasks().get(created.task.id).await.unwrap();
    assert_eq!(after.task.title, "Keep me");
    assert_eq!(after.tag_names(), vec!["Urgent"]);
}

#[tokio::test(flavor = "multi_thread")]
async fn task_toggle_sets_and_clears_completed_at() {
    let db = setup_db().await;
    let tasks = db.tasks();
    let created = tasks.create(&NewTask::new("Toggle me")).await.unwrap();

    let done = tasks.toggle(created.task.id, true).await.unwrap();
    assert!(done.task.completed);
    assert!(done.task.completed_at.is_some());

    let reopened = tasks.toggle(created.task.id, false).await.unwrap();
    assert!(!reopened.task.completed);
    assert!(reopened.task.completed_at.is_none());
}

#[tokio::test(flavor = "multi_thread")]
async fn task_toggle_nonexistent_returns_not_found() {
    let db = setup_db().await;
    let err = db.tasks().toggle(9999, true).await.unwrap_err();
    assert!(matches!(err, DbError::NotFound { .. }));
}

#[tokio::test(flavor = "multi_thread")]
async fn task_patch_completed_behaves_like_toggle() {
    let db = setup_db().await;
    let tasks = db.tasks();
    let created = tasks.create(&NewTask::new("Patch done")).await.unwrap();

    let done = tasks
        .update(
            created.task.id,
            &TaskPatch {
                completed: Some(true),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert!(done.task.completed_at.is_some());
}

#[tokio::test(flavor = "multi_thread")]
async fn task_delete_removes_task_and_tag_links() {
    let db = setup_db().await;
    make_tags(&db, &["Urgent"]).await;
    let tasks = db.tasks();
    let created = tasks
        .create(&NewTask::new("To Delete").with_tags(["Urgent"]))
        .await
        .unwrap();

    tasks.delete(created.task.id).await.expect("Delete should succeed");

    assert!(tasks.get(created.task.id).await.is_err());

    let links: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM task_tags")
        .fetch_one(db.pool())
        .await
        .unwrap();
    assert_eq!(links, 0);

    let tags = db.tags().list().await.unwrap();
    assert_eq!(tags[0].task_count, 0);
}

#[tokio::test(flavor = "multi_thread")]
async fn task_delete_nonexistent_returns_not_found() {
    let db = setup_db().await;
    db.tasks().create(&NewTask::new("Survivor")).await.unwrap();

    let err = db.tasks().delete(9999).await.unwrap_err();
    assert!(matches!(err, DbError::NotFound { .. }));

    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM tasks")
        .fetch_one(db.pool())
        .await
        .unwrap();
    assert_eq!(count, 1);
}

#[tokio::test(flavor = "multi_thread")]
async fn task_delete_leaves_subtasks_dangling() {
    let db = setup_db().await;
    let tasks = db.tasks();
    let parent = tasks.create(&NewTask::new("Parent")).await.unwrap();
    let child = tasks
        .create(&NewTask::new("Child").with_parent(parent.task.id))
        .await
        .unwrap();

    tasks.delete(parent.task.id).await.unwrap();

    let orphan = tasks.get(child.task.id).await.unwrap();
    assert_eq!(orphan.task.parent_id, Some(parent.task.id));
}

#[tokio::test(flavor = "multi_thread")]
async fn task_parent_cycle_is_serialized_finitely() {
    let db = setup_db().await;
    let tasks = db.tasks();
    let a = tasks.create(&NewTask::new("A")).await.unwrap();
    let b = tasks
        .create(&NewTask::new("B").with_parent(a.task.id))
        .await
        .unwrap();

    // Close the loop: A becomes a child of B
    tasks
        .update(
            a.task.id,
            &TaskPatch {
                parent_id: Some(Some(b.task.id)),
                ..Default::default()
            },
        )
        .await
        .unwrap();

    let tree = tasks.get(a.task.id).await.unwrap();
    assert_eq!(tree.subtasks.len(), 1);
    assert_eq!(tree.subtasks[0].task.id, b.task.id);
    assert!(tree.subtasks[0].subtasks.is_empty());

    // A self-reference is cut the same way
    tasks
        .update(
            b.task.id,
            &TaskPatch {
                parent_id: Some(Some(b.task.id)),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    let looped = tasks.get(b.task.id).await.unwrap();
    assert_eq!(looped.subtasks.len(), 1);
    assert_eq!(looped.subtasks[0].task.id, a.task.id);
    assert!(looped.subtasks[0].subtasks.is_empty());

    assert_eq!(tasks.list(&TaskFilter::default()).await.unwrap().len(), 2);
}

#[tokio::test(flavor = "multi_thread")]
async fn task_deep_chain_is_capped() {
    let db = setup_db().await;
    let tasks = db.tasks();

    let root = tasks.create(&NewTask::new("Level 0")).await.unwrap();
    let mut parent_id = root.task.id;
    for level in 1..=(crate::db::MAX_SUBTASK_DEPTH + 3) {
        let child = tasks
            .create(&NewTask::new(format!("Level {}", level)).with_parent(parent_id))
            .await
            .unwrap();
        parent_id = child.task.id;
    }

    let tree = tasks.get(root.task.id).await.unwrap();
    let mut depth = 0;
    let mut node = &tree;
    while let Some(next) = node.subtasks.first() {
        depth += 1;
        node = next;
    }
    assert_eq!(depth, crate::db::MAX_SUBTASK_DEPTH);
}

#[tokio::test(flavor = "multi_thread")]
async fn task_timestamps_are_recent() {
    let db = setup_db().await;
    let before = crate::db::utils::current_timestamp() - Duration::seconds(5);
    let created = db.tasks().create(&NewTask::new("Now")).await.unwrap();
    assert!(created.task.created_at >= before);
}
