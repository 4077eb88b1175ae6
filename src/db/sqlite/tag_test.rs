//! Tests for SqliteTagRepository.

use crate::db::{
    Database, DbError, NewTag, NewTask, SqliteDatabase, TagRepository, TaskRepository,
};

async fn setup_db() -> SqliteDatabase {
    let db = SqliteDatabase::in_memory()
        .await
        .expect("Failed to create in-memory database");
    db.migrate().await.expect("Migration should succeed");
    db
}

#[tokio::test(flavor = "multi_thread")]
async fn tag_create_and_get() {
    let db = setup_db().await;
    let repo = db.tags();

    let created = repo
        .create(&NewTag::new("Urgent").colored("#e74c3c"))
        .await
        .expect("Create should succeed");
    assert_eq!(created.color, "#e74c3c");
    assert_eq!(created.task_count, 0);

    let fetched = repo.get(created.id).await.unwrap().expect("Tag should exist");
    assert_eq!(fetched, created);
}

#[tokio::test(flavor = "multi_thread")]
async fn tag_create_defaults_color() {
    let db = setup_db().await;
    let created = db.tags().create(&NewTag::new("Idea")).await.unwrap();
    assert_eq!(created.color, "#4a90e2");
}

#[tokio::test(flavor = "multi_thread")]
async fn tag_create_duplicate_name_conflicts() {
    let db = setup_db().await;
    let repo = db.tags();

    repo.create(&NewTag::new("Urgent")).await.unwrap();
    let err = repo.create(&NewTag::new("Urgent")).await.unwrap_err();

    match err {
        DbError::Conflict {
            entity_type,
            message,
        } => {
            assert_eq!(entity_type, "Tag");
            assert!(message.contains("Urgent"));
        }
        other => panic!("Expected Conflict, got {:?}", other),
    }

    assert_eq!(repo.list().await.unwrap().len(), 1);
}

#[tokio::test(flavor = "multi_thread")]
async fn tag_names_are_case_sensitive() {
    let db = setup_db().await;
    let repo = db.tags();

    repo.create(&NewTag::new("urgent")).await.unwrap();
    repo.create(&NewTag::new("Urgent")).await.unwrap();

    assert_eq!(repo.list().await.unwrap().len(), 2);
}

#[tokio::test(flavor = "multi_thread")]
async fn tag_create_empty_name_is_rejected() {
    let db = setup_db().await;
    let err = db.tags().create(&NewTag::new("")).await.unwrap_err();
    assert!(matches!(err, DbError::Validation { .. }));
}

#[tokio::test(flavor = "multi_thread")]
async fn tag_get_missing_returns_none() {
    let db = setup_db().await;
    assert!(db.tags().get(9999).await.unwrap().is_none());
}

#[tokio::test(flavor = "multi_thread")]
async fn tag_list_is_sorted_by_name() {
    let db = setup_db().await;
    let repo = db.tags();

    for name in ["Meeting", "Idea", "Urgent", "Important"] {
        repo.create(&NewTag::new(name)).await.unwrap();
    }

    let names: Vec<_> = repo
        .list()
        .await
        .unwrap()
        .into_iter()
        .map(|t| t.name)
        .collect();
    assert_eq!(names, vec!["Idea", "Important", "Meeting", "Urgent"]);
}

#[tokio::test(flavor = "multi_thread")]
async fn tag_task_count_reflects_links() {
    let db = setup_db().await;
    let urgent = db.tags().create(&NewTag::new("Urgent")).await.unwrap();

    let tasks = db.tasks();
    tasks
        .create(&NewTask::new("One").with_tags(["Urgent"]))
        .await
        .unwrap();
    tasks
        .create(&NewTask::new("Two").with_tags(["Urgent"]))
        .await
        .unwrap();

    let counted = db.tags().get(urgent.id).await.unwrap().unwrap();
    assert_eq!(counted.task_count, 2);
}
