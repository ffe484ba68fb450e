#![allow(dead_code)]

use rusqlite::Connection;
use smartstudy_core::db::open_db_in_memory;
use smartstudy_core::{
    Priority, SqliteSubjectRepository, SqliteTaskRepository, Subject, SubjectDraft, SubjectRef,
    SubjectService, Task, TaskDraft, TaskService,
};

pub fn setup() -> Connection {
    open_db_in_memory().unwrap()
}

pub fn create_subject(conn: &Connection, name: &str, goal_hours: &str) -> Subject {
    let service = SubjectService::new(SqliteSubjectRepository::try_new(conn).unwrap());
    service
        .create_subject(SubjectDraft {
            name: name.to_string(),
            goal_hours: goal_hours.to_string(),
            colors: vec![0xFF00_FF00, 0xFF00_00FF],
        })
        .unwrap()
}

pub fn subject_ref(subject: &Subject) -> SubjectRef {
    subject.subject_ref().unwrap()
}

pub fn create_task(
    conn: &Connection,
    subject: &Subject,
    title: &str,
    due_date: i64,
    priority: Priority,
) -> Task {
    let service = TaskService::new(SqliteTaskRepository::try_new(conn).unwrap());
    service
        .save_task(
            TaskDraft {
                subject: Some(subject_ref(subject)),
                title: title.to_string(),
                priority,
                due_date: Some(due_date),
                ..TaskDraft::default()
            },
            0,
        )
        .unwrap()
}

pub fn row_count(conn: &Connection, table: &str) -> i64 {
    conn.query_row(&format!("SELECT COUNT(*) FROM {table};"), [], |row| row.get(0))
        .unwrap()
}
