//! Sample data for a fresh store.

use chrono::{Duration, NaiveDateTime};
use tracing::info;

use crate::db::utils::current_timestamp;
use crate::db::{
    Database, DbError, DbResult, Id, NewTag, NewTask, NewTaskList, TagRepository,
    TaskListRepository, TaskRepository,
};

/// Counts of the rows created by [`seed_sample_data`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SeedSummary {
    pub lists: usize,
    pub tags: usize,
    pub tasks: usize,
}

const SAMPLE_LISTS: &[(&str, &str, &str)] = &[
    ("Work", "#4a90e2", "briefcase"),
    ("Personal", "#50e3c2", "user"),
    ("Shopping", "#f5a623", "shopping-cart"),
];

const SAMPLE_TAGS: &[(&str, &str)] = &[
    ("Urgent", "#e74c3c"),
    ("Important", "#f5a623"),
    ("Meeting", "#4a90e2"),
    ("Idea", "#50e3c2"),
];

struct SampleTask {
    title: &'static str,
    description: Option<&'static str>,
    /// Days from now; `None` leaves the task undated.
    due_in_days: Option<i64>,
    /// Index into `SAMPLE_LISTS`; `None` puts the task in the Inbox.
    list: Option<usize>,
    priority: i64,
    tags: &'static [&'static str],
}

const SAMPLE_TASKS: &[SampleTask] = &[
    SampleTask {
        title: "Prepare presentation for client meeting",
        description: Some("Create slides and gather metrics for Q1 review"),
        due_in_days: Some(2),
        list: Some(0),
        priority: 1,
        tags: &["Urgent", "Meeting"],
    },
    SampleTask {
        title: "Review team's code submissions",
        description: Some("Go through PRs and provide feedback"),
        due_in_days: Some(1),
        list: Some(0),
        priority: 2,
        tags: &["Important"],
    },
    SampleTask {
        title: "Weekly team sync",
        description: Some("Discuss project progress and blockers"),
        due_in_days: Some(0),
        list: Some(0),
        priority: 2,
        tags: &["Meeting"],
    },
    SampleTask {
        title: "Gym workout",
        description: Some("30 min cardio + strength training"),
        due_in_days: Some(0),
        list: Some(1),
        priority: 3,
        tags: &[],
    },
    SampleTask {
        title: "Read 'Deep Work' book",
        description: Some("Complete chapters 3-4"),
        due_in_days: None,
        list: Some(1),
        priority: 4,
        tags: &[],
    },
    SampleTask {
        title: "Plan weekend trip",
        description: Some("Book accommodations and plan activities"),
        due_in_days: Some(5),
        list: Some(1),
        priority: 3,
        tags: &["Important"],
    },
    SampleTask {
        title: "Buy groceries",
        description: Some("Milk, eggs, bread, fruits"),
        due_in_days: Some(0),
        list: Some(2),
        priority: 2,
        tags: &["Urgent"],
    },
    SampleTask {
        title: "Get new running shoes",
        description: Some("Check Nike and Adidas stores"),
        due_in_days: None,
        list: Some(2),
        priority: 4,
        tags: &[],
    },
    SampleTask {
        title: "Schedule dentist appointment",
        description: None,
        due_in_days: Some(7),
        list: None,
        priority: 3,
        tags: &[],
    },
    SampleTask {
        title: "New app idea",
        description: Some("Create a meal planning app with AI suggestions"),
        due_in_days: None,
        list: None,
        priority: 4,
        tags: &["Idea"],
    },
];

/// Populate an empty store with a few lists, tags and tasks.
///
/// Refuses to run when any list or tag already exists, so it never
/// duplicates data or trips over the unique tag names.
pub async fn seed_sample_data<D: Database>(db: &D) -> DbResult<SeedSummary> {
    if !db.task_lists().list().await?.is_empty() || !db.tags().list().await?.is_empty() {
        return Err(DbError::validation(
            "Store already contains lists or tags; refusing to seed",
        ));
    }

    let mut summary = SeedSummary::default();

    let mut list_ids: Vec<Id> = Vec::with_capacity(SAMPLE_LISTS.len());
    for (name, color, icon) in SAMPLE_LISTS {
        let list = db
            .task_lists()
            .create(&NewTaskList::new(*name).styled(*color, *icon))
            .await?;
        list_ids.push(list.id);
        summary.lists += 1;
    }

    for (name, color) in SAMPLE_TAGS {
        db.tags().create(&NewTag::new(*name).colored(*color)).await?;
        summary.tags += 1;
    }

    let now = current_timestamp();
    for sample in SAMPLE_TASKS {
        db.tasks().create(&sample.to_new_task(&list_ids, now)).await?;
        summary.tasks += 1;
    }

    info!(
        lists = summary.lists,
        tags = summary.tags,
        tasks = summary.tasks,
        "seeded sample data"
    );
    Ok(summary)
}

impl SampleTask {
    fn to_new_task(&self, list_ids: &[Id], now: NaiveDateTime) -> NewTask {
        let mut task = NewTask::new(self.title).with_tags(self.tags.iter().copied());
        task.description = self.description.map(str::to_string);
        task.priority = self.priority;
        task.due_date = self.due_in_days.map(|days| now + Duration::days(days));
        task.list_id = self.list.and_then(|i| list_ids.get(i).copied());
        task
    }
}
