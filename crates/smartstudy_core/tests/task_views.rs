mod common;

use common::{create_subject, create_task, setup, subject_ref};
use proptest::prelude::*;
use smartstudy_core::ordering::compare_due_then_priority;
use smartstudy_core::service::task_service::completion_message;
use smartstudy_core::{
    upcoming_tasks, Priority, SqliteTaskRepository, SubjectScope, Task, TaskAction, TaskDraft,
    TaskService, TaskServiceError, TaskValidationError, ToUserMessage,
};
use std::cmp::Ordering;

fn service(conn: &rusqlite::Connection) -> TaskService<SqliteTaskRepository<'_>> {
    TaskService::new(SqliteTaskRepository::try_new(conn).unwrap())
}

#[test]
fn save_task_denormalizes_subject_and_defaults_due_date() {
    let conn = setup();
    let physics = create_subject(&conn, "Physics", "10");

    let saved = service(&conn)
        .save_task(
            TaskDraft {
                subject: Some(subject_ref(&physics)),
                title: "Revise kinematics".to_string(),
                description: "Chapters 1-3".to_string(),
                ..TaskDraft::default()
            },
            1_234,
        )
        .unwrap();

    assert!(saved.id.is_some());
    assert_eq!(saved.subject_name, "Physics");
    assert_eq!(saved.due_date, 1_234);
    assert_eq!(saved.priority, Priority::Medium);
    assert!(!saved.is_completed);
}

#[test]
fn save_task_rejects_missing_subject_and_bad_titles() {
    let conn = setup();
    let tasks = service(&conn);

    let err = tasks
        .save_task(
            TaskDraft {
                title: "Revise kinematics".to_string(),
                ..TaskDraft::default()
            },
            0,
        )
        .unwrap_err();
    assert!(matches!(
        err,
        TaskServiceError::Invalid(TaskValidationError::SubjectRequired)
    ));

    let err = tasks
        .save_task(
            TaskDraft {
                title: "   ".to_string(),
                ..TaskDraft::default()
            },
            0,
        )
        .unwrap_err();
    assert!(matches!(
        err,
        TaskServiceError::Invalid(TaskValidationError::TitleBlank)
    ));
}

#[test]
fn storage_failures_name_the_failed_action() {
    let conn = setup();
    let physics = create_subject(&conn, "Physics", "10");
    let tasks = service(&conn);
    conn.execute_batch("DROP TABLE tasks;").unwrap();

    let err = tasks
        .save_task(
            TaskDraft {
                subject: Some(subject_ref(&physics)),
                title: "Lab report".to_string(),
                ..TaskDraft::default()
            },
            0,
        )
        .unwrap_err();
    assert!(matches!(
        err,
        TaskServiceError::Repo {
            action: TaskAction::Add,
            ..
        }
    ));
    assert!(err.to_user_message().text.starts_with("Couldn't add task. "));
}

#[test]
fn unknown_stored_priority_reads_back_as_medium() {
    let conn = setup();
    conn.execute(
        "INSERT INTO tasks (task_subject_id, title, related_to_subject, priority, due_date)
         VALUES (1, 'Odd priority', 'Physics', 9, 0);",
        [],
    )
    .unwrap();

    let tasks = service(&conn).upcoming_tasks(SubjectScope::All).unwrap();
    assert_eq!(tasks[0].priority, Priority::Medium);
}

#[test]
fn toggling_completion_moves_task_between_views() {
    let conn = setup();
    let physics = create_subject(&conn, "Physics", "10");
    let task = create_task(&conn, &physics, "Lab report", 100, Priority::High);
    let tasks = service(&conn);
    let scope = SubjectScope::Subject(physics.id.unwrap());

    let toggled = tasks.toggle_completion(task.id.unwrap()).unwrap();
    assert!(toggled.is_completed);
    assert_eq!(completion_message(&toggled).text, "Saved in completed tasks");

    let views = tasks.task_views(scope).unwrap();
    assert!(views.upcoming.is_empty());
    assert_eq!(views.completed, vec![toggled.clone()]);

    let back = tasks.toggle_completion(task.id.unwrap()).unwrap();
    assert_eq!(completion_message(&back).text, "Saved in incomplete tasks");
    assert_eq!(tasks.upcoming_tasks(scope).unwrap().len(), 1);
    assert!(tasks.completed_tasks(scope).unwrap().is_empty());
}

#[test]
fn delete_task_and_missing_ids() {
    let conn = setup();
    let physics = create_subject(&conn, "Physics", "10");
    let task = create_task(&conn, &physics, "Lab report", 100, Priority::High);
    let tasks = service(&conn);
    let id = task.id.unwrap();

    assert_eq!(tasks.delete_task(id).unwrap().text, "Task deleted");
    assert!(tasks.get_task(id).unwrap().is_none());

    let err = tasks.delete_task(id).unwrap_err();
    assert!(matches!(
        err,
        TaskServiceError::TaskNotFound {
            action: TaskAction::Delete,
            id: missing,
        } if missing == id
    ));
    assert_eq!(
        err.to_user_message().text,
        format!("Couldn't delete task. Task not found: {id}")
    );

    let err = tasks.toggle_completion(id).unwrap_err();
    assert_eq!(err.action(), Some(TaskAction::Update));
    assert_eq!(
        err.to_user_message().text,
        format!("Couldn't update task. Task not found: {id}")
    );
}

#[test]
fn upcoming_view_is_scoped_and_ordered() {
    let conn = setup();
    let physics = create_subject(&conn, "Physics", "10");
    let biology = create_subject(&conn, "Biology", "10");
    create_task(&conn, &physics, "Later task", 300, Priority::High);
    create_task(&conn, &physics, "Soon low", 100, Priority::Low);
    create_task(&conn, &biology, "Soon biology", 100, Priority::Medium);
    create_task(&conn, &physics, "Soon high", 100, Priority::High);

    let tasks = service(&conn);
    let titles = |list: Vec<Task>| list.into_iter().map(|t| t.title).collect::<Vec<_>>();

    assert_eq!(
        titles(tasks.upcoming_tasks(SubjectScope::All).unwrap()),
        vec!["Soon high", "Soon biology", "Soon low", "Later task"]
    );
    assert_eq!(
        titles(
            tasks
                .upcoming_tasks(SubjectScope::Subject(physics.id.unwrap()))
                .unwrap()
        ),
        vec!["Soon high", "Soon low", "Later task"]
    );
}

fn arb_task() -> impl Strategy<Value = Task> {
    (0i64..50, 0i64..4, any::<bool>(), 0i64..1000).prop_map(|(due, priority, done, id)| Task {
        id: Some(id),
        subject_id: 1,
        title: format!("task {id}"),
        description: String::new(),
        subject_name: "Physics".to_string(),
        priority: Priority::from_i64(priority),
        due_date: due,
        is_completed: done,
    })
}

proptest! {
    #[test]
    fn upcoming_view_is_sorted_and_complete(tasks in prop::collection::vec(arb_task(), 0..40)) {
        let upcoming = upcoming_tasks(&tasks);

        prop_assert!(upcoming.iter().all(|task| !task.is_completed));
        prop_assert_eq!(
            upcoming.len(),
            tasks.iter().filter(|task| !task.is_completed).count()
        );
        for pair in upcoming.windows(2) {
            prop_assert!(pair[0].due_date <= pair[1].due_date);
            if pair[0].due_date == pair[1].due_date {
                prop_assert!(pair[0].priority >= pair[1].priority);
            }
            prop_assert_ne!(compare_due_then_priority(&pair[0], &pair[1]), Ordering::Greater);
        }
    }
}
