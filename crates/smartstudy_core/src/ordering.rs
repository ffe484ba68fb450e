//! Derived task views.
//!
//! Both views sort by due date ascending, then priority descending. The sort
//! is stable, so tasks with equal keys keep their input order.

use crate::model::task::Task;
use std::cmp::{Ordering, Reverse};

/// Incomplete and completed tasks derived from one task list.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaskViews {
    pub upcoming: Vec<Task>,
    pub completed: Vec<Task>,
}

impl TaskViews {
    pub fn from_tasks(tasks: &[Task]) -> Self {
        Self {
            upcoming: upcoming_tasks(tasks),
            completed: completed_tasks(tasks),
        }
    }
}

/// Incomplete tasks, soonest due first.
pub fn upcoming_tasks(tasks: &[Task]) -> Vec<Task> {
    sorted_where(tasks, |task| !task.is_completed)
}

pub fn completed_tasks(tasks: &[Task]) -> Vec<Task> {
    sorted_where(tasks, |task| task.is_completed)
}

/// Comparator shared by both views.
pub fn compare_due_then_priority(a: &Task, b: &Task) -> Ordering {
    (a.due_date, Reverse(a.priority)).cmp(&(b.due_date, Reverse(b.priority)))
}

fn sorted_where(tasks: &[Task], keep: impl Fn(&Task) -> bool) -> Vec<Task> {
    let mut selected: Vec<Task> = tasks.iter().filter(|task| keep(task)).cloned().collect();
    selected.sort_by(compare_due_then_priority);
    selected
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::task::Priority;

    fn task(id: i64, due_date: i64, priority: Priority, is_completed: bool) -> Task {
        Task {
            id: Some(id),
            subject_id: 1,
            title: format!("task {id}"),
            description: String::new(),
            subject_name: "Maths".to_string(),
            priority,
            due_date,
            is_completed,
        }
    }

    fn ids(tasks: &[Task]) -> Vec<i64> {
        tasks.iter().filter_map(|task| task.id).collect()
    }

    #[test]
    fn upcoming_sorts_by_due_date_then_higher_priority_first() {
        let tasks = vec![
            task(1, 300, Priority::Low, false),
            task(2, 100, Priority::Low, false),
            task(3, 100, Priority::High, false),
            task(4, 200, Priority::Medium, true),
            task(5, 100, Priority::Medium, false),
        ];

        let views = TaskViews::from_tasks(&tasks);
        assert_eq!(ids(&views.upcoming), vec![3, 5, 2, 1]);
        assert_eq!(ids(&views.completed), vec![4]);
    }

    #[test]
    fn equal_keys_keep_input_order() {
        let tasks = vec![
            task(9, 100, Priority::High, false),
            task(4, 100, Priority::High, false),
        ];
        assert_eq!(ids(&upcoming_tasks(&tasks)), vec![9, 4]);
    }

    #[test]
    fn empty_input_yields_empty_views() {
        assert_eq!(TaskViews::from_tasks(&[]), TaskViews::default());
    }
}
