use chrono::NaiveDate;
use gigbook_core::db::open_db_in_memory;
use gigbook_core::{
    Priority, RecurrencePattern, SqliteTaskRepository, TaskListQuery, TaskRepository, TaskService,
    TaskServiceError, TaskStatus, TaskTemplate,
};

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn weekly_template(count: u32) -> TaskTemplate {
    let mut template = TaskTemplate::new("send report");
    template.is_recurring = true;
    template.recurring_pattern = RecurrencePattern::Weekly;
    template.recurrence_count = count;
    template.due_date = Some(date(2024, 1, 1));
    template
}

#[test]
fn one_shot_template_creates_single_visible_task() {
    let mut conn = open_db_in_memory().unwrap();
    let repo = SqliteTaskRepository::try_new(&mut conn).unwrap();
    let mut service = TaskService::new(repo);

    let template = TaskTemplate::new("file taxes");
    let created = service
        .create_from_template(&template, date(2024, 1, 1))
        .unwrap();

    assert_eq!(created.len(), 1);
    assert_eq!(created[0].title, "file taxes");
    assert_eq!(created[0].recurrence_uuid, None);

    let listed = service.list_tasks(&TaskListQuery::default()).unwrap();
    assert_eq!(listed.len(), 1);
    assert!(listed[0].is_visible);
}

#[test]
fn recurring_template_persists_full_chain_with_one_visible_instance() {
    let mut conn = open_db_in_memory().unwrap();
    let repo = SqliteTaskRepository::try_new(&mut conn).unwrap();
    let mut service = TaskService::new(repo);

    let created = service
        .create_from_template(&weekly_template(3), date(2023, 12, 15))
        .unwrap();
    assert_eq!(created.len(), 3);

    let visible = service.list_tasks(&TaskListQuery::default()).unwrap();
    assert_eq!(visible.len(), 1);
    assert_eq!(visible[0].title, "send report (1/3)");
    assert_eq!(visible[0].due_date, Some(date(2024, 1, 1)));

    let all = service
        .list_tasks(&TaskListQuery {
            include_hidden: true,
            ..TaskListQuery::default()
        })
        .unwrap();
    assert_eq!(all.len(), 3);
}

#[test]
fn completing_an_instance_reveals_only_the_next_one() {
    let mut conn = open_db_in_memory().unwrap();
    let repo = SqliteTaskRepository::try_new(&mut conn).unwrap();
    let mut service = TaskService::new(repo);

    let created = service
        .create_from_template(&weekly_template(3), date(2024, 1, 1))
        .unwrap();
    let first = created[0].uuid;

    let completed = service.set_status(first, TaskStatus::Completed).unwrap();
    assert_eq!(completed.status, TaskStatus::Completed);

    let visible = service
        .list_tasks(&TaskListQuery {
            status: Some(TaskStatus::Pending),
            ..TaskListQuery::default()
        })
        .unwrap();
    assert_eq!(visible.len(), 1);
    assert_eq!(visible[0].instance_number, 2);
    assert_eq!(visible[0].title, "send report (2/3)");

    let third = service.get_task(created[2].uuid).unwrap().unwrap();
    assert!(!third.is_visible);
}

#[test]
fn completing_the_last_instance_is_a_clean_no_op() {
    let mut conn = open_db_in_memory().unwrap();
    let repo = SqliteTaskRepository::try_new(&mut conn).unwrap();
    let mut service = TaskService::new(repo);

    let created = service
        .create_from_template(&weekly_template(2), date(2024, 1, 1))
        .unwrap();

    service
        .set_status(created[0].uuid, TaskStatus::Completed)
        .unwrap();
    let last = service
        .set_status(created[1].uuid, TaskStatus::Completed)
        .unwrap();
    assert_eq!(last.status, TaskStatus::Completed);

    let pending = service
        .list_tasks(&TaskListQuery {
            status: Some(TaskStatus::Pending),
            ..TaskListQuery::default()
        })
        .unwrap();
    assert!(pending.is_empty());
}

#[test]
fn illegal_transitions_are_rejected_and_leave_storage_untouched() {
    let mut conn = open_db_in_memory().unwrap();
    let repo = SqliteTaskRepository::try_new(&mut conn).unwrap();
    let mut service = TaskService::new(repo);

    let created = service
        .create_from_template(&TaskTemplate::new("write proposal"), date(2024, 1, 1))
        .unwrap();
    let id = created[0].uuid;

    service.set_status(id, TaskStatus::Completed).unwrap();

    let err = service.set_status(id, TaskStatus::InProgress).unwrap_err();
    assert!(matches!(
        err,
        TaskServiceError::InvalidTransition {
            from: TaskStatus::Completed,
            to: TaskStatus::InProgress,
        }
    ));

    let stored = service.get_task(id).unwrap().unwrap();
    assert_eq!(stored.status, TaskStatus::Completed);
}

#[test]
fn requesting_the_current_status_is_a_no_op() {
    let mut conn = open_db_in_memory().unwrap();
    let repo = SqliteTaskRepository::try_new(&mut conn).unwrap();
    let mut service = TaskService::new(repo);

    let created = service
        .create_from_template(&TaskTemplate::new("invoice follow-up"), date(2024, 1, 1))
        .unwrap();
    let id = created[0].uuid;

    service.set_status(id, TaskStatus::Completed).unwrap();
    let again = service.set_status(id, TaskStatus::Completed).unwrap();
    assert_eq!(again.status, TaskStatus::Completed);
}

#[test]
fn cancelling_from_in_progress_is_allowed() {
    let mut conn = open_db_in_memory().unwrap();
    let repo = SqliteTaskRepository::try_new(&mut conn).unwrap();
    let mut service = TaskService::new(repo);

    let created = service
        .create_from_template(&TaskTemplate::new("site audit"), date(2024, 1, 1))
        .unwrap();
    let id = created[0].uuid;

    service.set_status(id, TaskStatus::InProgress).unwrap();
    let cancelled = service.set_status(id, TaskStatus::Cancelled).unwrap();
    assert_eq!(cancelled.status, TaskStatus::Cancelled);
}

#[test]
fn deleting_one_instance_leaves_siblings_untouched() {
    let mut conn = open_db_in_memory().unwrap();
    let repo = SqliteTaskRepository::try_new(&mut conn).unwrap();
    let mut service = TaskService::new(repo);

    let created = service
        .create_from_template(&weekly_template(3), date(2024, 1, 1))
        .unwrap();

    service.delete_task(created[1].uuid).unwrap();

    let all = service
        .list_tasks(&TaskListQuery {
            include_hidden: true,
            ..TaskListQuery::default()
        })
        .unwrap();
    assert_eq!(all.len(), 2);
    let numbers: Vec<u32> = all.iter().map(|task| task.instance_number).collect();
    assert!(numbers.contains(&1));
    assert!(numbers.contains(&3));
}

#[test]
fn stats_count_statuses_priorities_and_overdue() {
    let mut conn = open_db_in_memory().unwrap();
    let mut repo = SqliteTaskRepository::try_new(&mut conn).unwrap();

    let mut overdue = TaskTemplate::new("late deliverable");
    overdue.due_date = Some(date(2024, 1, 1));
    overdue.priority = Priority::High;
    let mut on_time = TaskTemplate::new("future deliverable");
    on_time.due_date = Some(date(2024, 3, 1));

    let batch: Vec<_> = [&overdue, &on_time]
        .iter()
        .flat_map(|template| gigbook_core::expand(template, date(2024, 1, 1)))
        .collect();
    repo.create_tasks(&batch).unwrap();

    let service = TaskService::new(repo);
    let stats = service.task_stats(date(2024, 2, 1)).unwrap();

    assert_eq!(stats.total, 2);
    assert_eq!(stats.pending, 2);
    assert_eq!(stats.overdue, 1);
    let high = stats
        .by_priority
        .iter()
        .find(|count| count.priority == Priority::High)
        .unwrap();
    assert_eq!(high.count, 1);
}

#[test]
fn update_task_cannot_reveal_a_hidden_instance() {
    let mut conn = open_db_in_memory().unwrap();
    let repo = SqliteTaskRepository::try_new(&mut conn).unwrap();
    let mut service = TaskService::new(repo);

    let created = service
        .create_from_template(&weekly_template(2), date(2024, 1, 1))
        .unwrap();

    let mut edited = created[1].clone();
    edited.title = "send report later".to_string();
    edited.is_visible = true;

    let stored = service.update_task(&edited).unwrap();
    assert_eq!(stored.title, "send report later");
    assert!(!stored.is_visible);

    let visible = service.list_tasks(&TaskListQuery::default()).unwrap();
    assert_eq!(visible.len(), 1);
    assert_eq!(visible[0].instance_number, 1);
}

#[test]
fn priority_stats_are_ordered_low_to_urgent() {
    let mut conn = open_db_in_memory().unwrap();
    let mut repo = SqliteTaskRepository::try_new(&mut conn).unwrap();

    let batch: Vec<_> = [
        (Priority::Urgent, "escalation"),
        (Priority::Low, "cleanup"),
        (Priority::High, "launch prep"),
        (Priority::Medium, "weekly report"),
    ]
    .iter()
    .flat_map(|(priority, title)| {
        let mut template = TaskTemplate::new(*title);
        template.priority = *priority;
        gigbook_core::expand(&template, date(2024, 1, 1))
    })
    .collect();
    repo.create_tasks(&batch).unwrap();

    let service = TaskService::new(repo);
    let stats = service.task_stats(date(2024, 1, 1)).unwrap();

    let order: Vec<Priority> = stats
        .by_priority
        .iter()
        .map(|count| count.priority)
        .collect();
    assert_eq!(
        order,
        vec![
            Priority::Low,
            Priority::Medium,
            Priority::High,
            Priority::Urgent,
        ]
    );
}

#[test]
fn update_task_preserves_stored_status_and_grouping() {
    let mut conn = open_db_in_memory().unwrap();
    let repo = SqliteTaskRepository::try_new(&mut conn).unwrap();
    let mut service = TaskService::new(repo);

    let created = service
        .create_from_template(&weekly_template(2), date(2024, 1, 1))
        .unwrap();
    service
        .set_status(created[0].uuid, TaskStatus::InProgress)
        .unwrap();

    let mut edited = created[0].clone();
    edited.title = "send weekly report".to_string();
    edited.status = TaskStatus::Pending;
    edited.recurrence_uuid = None;

    let stored = service.update_task(&edited).unwrap();
    assert_eq!(stored.title, "send weekly report");
    assert_eq!(stored.status, TaskStatus::InProgress);
    assert_eq!(stored.recurrence_uuid, created[0].recurrence_uuid);
}
