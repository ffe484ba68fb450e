mod common;

use common::{create_subject, create_task, setup, subject_ref};
use smartstudy_core::{
    ChangeFeed, DashboardSnapshot, Priority, SessionService, SqliteSessionRepository,
    SqliteSubjectRepository, SqliteTaskRepository, SubjectDetail, SubjectDraft, SubjectService,
    Table, TableChange, TaskService,
};

#[test]
fn empty_database_has_an_empty_dashboard() {
    let conn = setup();
    let snapshot = DashboardSnapshot::load(&conn).unwrap();

    assert_eq!(snapshot.subject_count, 0);
    assert_eq!(snapshot.total_goal_hours, 0.0);
    assert_eq!(snapshot.total_studied_hours, 0.0);
    assert!(snapshot.subjects.is_empty());
    assert!(snapshot.upcoming_tasks.is_empty());
    assert!(snapshot.recent_sessions.is_empty());
}

#[test]
fn dashboard_aggregates_across_subjects() {
    let conn = setup();
    let physics = create_subject(&conn, "Physics", "10");
    let biology = create_subject(&conn, "Biology", "5");
    create_task(&conn, &physics, "Lab report", 200, Priority::Low);
    create_task(&conn, &biology, "Cell diagram", 100, Priority::High);

    let sessions = SessionService::new(SqliteSessionRepository::try_new(&conn).unwrap());
    sessions
        .save_session(Some(&subject_ref(&physics)), 3_600, 1)
        .unwrap();
    sessions
        .save_session(Some(&subject_ref(&biology)), 1_800, 2)
        .unwrap();

    let snapshot = DashboardSnapshot::load(&conn).unwrap();
    assert_eq!(snapshot.subject_count, 2);
    assert_eq!(snapshot.total_goal_hours, 15.0);
    assert_eq!(snapshot.total_studied_hours, 1.5);
    assert_eq!(
        snapshot
            .upcoming_tasks
            .iter()
            .map(|task| task.title.as_str())
            .collect::<Vec<_>>(),
        vec!["Cell diagram", "Lab report"]
    );
    assert_eq!(snapshot.recent_sessions[0].subject_name, "Biology");
}

#[test]
fn subject_detail_splits_tasks_and_clamps_progress() {
    let conn = setup();
    let physics = create_subject(&conn, "Physics", "2");
    let done = create_task(&conn, &physics, "Lab report", 200, Priority::Low);
    create_task(&conn, &physics, "Read optics", 100, Priority::Medium);
    TaskService::new(SqliteTaskRepository::try_new(&conn).unwrap())
        .toggle_completion(done.id.unwrap())
        .unwrap();

    let sessions = SessionService::new(SqliteSessionRepository::try_new(&conn).unwrap());
    let id = physics.id.unwrap();

    let detail = SubjectDetail::load(&conn, id).unwrap().unwrap();
    assert_eq!(detail.progress, 0.0);
    assert_eq!(detail.upcoming_tasks.len(), 1);
    assert_eq!(detail.completed_tasks[0].title, "Lab report");

    sessions
        .save_session(Some(&subject_ref(&physics)), 3_600, 1)
        .unwrap();
    let detail = SubjectDetail::load(&conn, id).unwrap().unwrap();
    assert_eq!(detail.studied_hours, 1.0);
    assert_eq!(detail.progress, 0.5);

    sessions
        .save_session(Some(&subject_ref(&physics)), 7_200, 2)
        .unwrap();
    let detail = SubjectDetail::load(&conn, id).unwrap().unwrap();
    assert_eq!(detail.progress, 1.0);
    assert_eq!(detail.recent_sessions.len(), 2);

    assert!(SubjectDetail::load(&conn, id + 1).unwrap().is_none());
}

#[test]
fn services_publish_changes_after_successful_writes() {
    let conn = setup();
    let feed = ChangeFeed::new();
    let subscription = feed.subscribe();

    let subjects = SubjectService::new(SqliteSubjectRepository::try_new(&conn).unwrap())
        .with_feed(feed.clone());
    let sessions = SessionService::new(SqliteSessionRepository::try_new(&conn).unwrap())
        .with_feed(feed.clone());

    let physics = subjects
        .create_subject(SubjectDraft {
            name: "Physics".to_string(),
            goal_hours: "10".to_string(),
            colors: Vec::new(),
        })
        .unwrap();
    assert_eq!(
        subscription.drain(),
        vec![TableChange {
            table: Table::Subjects
        }]
    );

    // Rejected and failed writes stay silent.
    sessions
        .save_session(Some(&subject_ref(&physics)), 10, 1)
        .unwrap();
    assert!(subjects
        .create_subject(SubjectDraft {
            name: String::new(),
            goal_hours: "10".to_string(),
            colors: Vec::new(),
        })
        .is_err());
    assert!(subscription.drain().is_empty());

    sessions
        .save_session(Some(&subject_ref(&physics)), 60, 2)
        .unwrap();
    assert!(subscription.touched_any(&[Table::Sessions]));

    subjects.delete_subject(physics.id.unwrap()).unwrap();
    let tables: Vec<Table> = subscription
        .drain()
        .into_iter()
        .map(|change| change.table)
        .collect();
    assert!(tables.contains(&Table::Tasks));
    assert!(tables.contains(&Table::Sessions));
    assert!(tables.contains(&Table::Subjects));
}

#[test]
fn dropped_subscriptions_are_pruned() {
    let feed = ChangeFeed::new();
    let kept = feed.subscribe();
    drop(feed.subscribe());

    assert_eq!(feed.subscriber_count(), 2);
    assert_eq!(feed.publish(Table::Tasks), 1);
    assert_eq!(feed.subscriber_count(), 1);
    assert_eq!(kept.drain().len(), 1);
}
