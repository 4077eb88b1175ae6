//! Tests for domain models.

use chrono::NaiveDate;
use serde_json::json;

use crate::db::{
    DEFAULT_PRIORITY, DbError, ListFilter, NewTask, PromptInput, Tag, Task, TaskDetail,
    TaskFilter, TaskPatch,
};

fn at(h: u32) -> chrono::NaiveDateTime {
    NaiveDate::from_ymd_opt(2025, 1, 1)
        .unwrap()
        .and_hms_opt(h, 0, 0)
        .unwrap()
}

fn make_task() -> Task {
    Task {
        id: 1,
        title: "Write report".to_string(),
        description: Some("Q1 numbers".to_string()),
        created_at: at(8),
        updated_at: at(8),
        due_date: Some(at(17)),
        completed: false,
        completed_at: None,
        priority: 2,
        list_id: Some(3),
        parent_id: None,
    }
}

#[test]
fn new_task_defaults() {
    let task = NewTask::new("Buy milk");
    assert_eq!(task.priority, DEFAULT_PRIORITY);
    assert!(task.tags.is_empty());
    assert!(task.list_id.is_none());
    assert!(task.validate().is_ok());
}

#[test]
fn new_task_rejects_blank_title() {
    let err = NewTask::new("   ").validate().unwrap_err();
    assert!(matches!(err, DbError::Validation { .. }));
}

#[test]
fn new_task_rejects_out_of_range_priority() {
    let mut task = NewTask::new("Something");
    task.priority = 5;
    assert!(matches!(
        task.validate(),
        Err(DbError::Validation { .. })
    ));
    task.priority = 0;
    assert!(task.validate().is_err());
}

#[test]
fn set_completed_stamps_and_clears() {
    let mut task = make_task();

    task.set_completed(true, at(10));
    assert!(task.completed);
    assert_eq!(task.completed_at, Some(at(10)));

    // Already done: the original stamp is kept
    task.set_completed(true, at(11));
    assert_eq!(task.completed_at, Some(at(10)));

    task.set_completed(false, at(12));
    assert!(!task.completed);
    assert!(task.completed_at.is_none());
}

#[test]
fn patch_leaves_absent_fields_untouched() {
    let mut task = make_task();
    let patch = TaskPatch {
        title: Some("Write final report".to_string()),
        ..Default::default()
    };

    patch.merge_into(&mut task, at(9));

    assert_eq!(task.title, "Write final report");
    assert_eq!(task.description, Some("Q1 numbers".to_string()));
    assert_eq!(task.list_id, Some(3));
    assert_eq!(task.priority, 2);
    assert_eq!(task.updated_at, at(9));
    assert_eq!(task.created_at, at(8));
}

#[test]
fn patch_null_clears_optional_fields() {
    let mut task = make_task();
    let patch = TaskPatch {
        description: Some(None),
        due_date: Some(None),
        list_id: Some(None),
        ..Default::default()
    };

    patch.merge_into(&mut task, at(9));

    assert!(task.description.is_none());
    assert!(task.due_date.is_none());
    assert!(task.list_id.is_none());
}

#[test]
fn patch_completed_keeps_completion_invariant() {
    let mut task = make_task();
    let patch = TaskPatch {
        completed: Some(true),
        ..Default::default()
    };
    patch.merge_into(&mut task, at(9));
    assert!(task.completed);
    assert_eq!(task.completed_at, Some(at(9)));
}

#[test]
fn patch_validation() {
    let blank = TaskPatch {
        title: Some(String::new()),
        ..Default::default()
    };
    assert!(blank.validate().is_err());

    let bad_priority = TaskPatch {
        priority: Some(7),
        ..Default::default()
    };
    assert!(bad_priority.validate().is_err());

    assert!(TaskPatch::default().validate().is_ok());
}

#[test]
fn task_filter_constructors() {
    assert_eq!(TaskFilter::default().list, ListFilter::Any);
    assert_eq!(TaskFilter::inbox().list, ListFilter::Inbox);
    assert_eq!(TaskFilter::for_list(4).list, ListFilter::List(4));
    assert_eq!(TaskFilter::for_tag(2).tag_id, Some(2));
}

#[test]
fn prompt_input_requires_name_and_content() {
    let input = PromptInput {
        prompt_name: String::new(),
        ai_selection: json!(["gpt-4"]),
        prompt_content: "content".to_string(),
    };
    assert!(input.validate().is_err());
}

#[test]
fn prompt_input_requires_structured_selection() {
    let mut input = PromptInput {
        prompt_name: "name".to_string(),
        ai_selection: json!("gpt-4"),
        prompt_content: "content".to_string(),
    };
    assert!(input.validate().is_err());

    input.ai_selection = json!({"model": "gpt-4"});
    assert!(input.validate().is_ok());

    input.ai_selection = json!([]);
    assert!(input.validate().is_ok());
}

#[test]
fn task_detail_serializes_flat_with_nested_relations() {
    let detail = TaskDetail {
        task: make_task(),
        tags: vec![Tag {
            id: 7,
            name: "Urgent".to_string(),
            color: "#e74c3c".to_string(),
            created_at: at(1),
            task_count: 1,
        }],
        subtasks: vec![],
    };

    let value = serde_json::to_value(&detail).unwrap();
    assert_eq!(value["id"], 1);
    assert_eq!(value["title"], "Write report");
    assert_eq!(value["created_at"], "2025-01-01T08:00:00");
    assert!(value["completed_at"].is_null());
    assert_eq!(value["tags"][0]["name"], "Urgent");
    assert!(value["subtasks"].as_array().unwrap().is_empty());
    assert_eq!(detail.tag_names(), vec!["Urgent"]);
}
