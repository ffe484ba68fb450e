//! In-process change feed for table writes.
//!
//! # Responsibility
//! - Tell hosts which table changed so they can re-load read models.
//!
//! # Invariants
//! - Services publish only after a write succeeded.
//! - Dropped subscriptions are pruned on the next publish.

use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Table {
    Subjects,
    Tasks,
    Sessions,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TableChange {
    pub table: Table,
}

/// Cloneable publisher handle. Clones share one subscriber list.
#[derive(Debug, Clone, Default)]
pub struct ChangeFeed {
    subscribers: Arc<Mutex<Vec<Sender<TableChange>>>>,
}

impl ChangeFeed {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe(&self) -> Subscription {
        let (tx, rx) = mpsc::channel();
        self.subscribers
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(tx);
        Subscription { rx }
    }

    /// Sends one change to every live subscriber and returns how many
    /// received it.
    pub fn publish(&self, table: Table) -> usize {
        let change = TableChange { table };
        let mut subscribers = self
            .subscribers
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        subscribers.retain(|tx| tx.send(change).is_ok());
        subscribers.len()
    }

    pub fn subscriber_count(&self) -> usize {
        self.subscribers
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }
}

/// Receiving end handed to one observer.
#[derive(Debug)]
pub struct Subscription {
    rx: Receiver<TableChange>,
}

impl Subscription {
    /// Drains every change queued so far without blocking.
    pub fn drain(&self) -> Vec<TableChange> {
        self.rx.try_iter().collect()
    }

    /// Waits up to `timeout` for the next change.
    pub fn next_timeout(&self, timeout: Duration) -> Option<TableChange> {
        match self.rx.recv_timeout(timeout) {
            Ok(change) => Some(change),
            Err(RecvTimeoutError::Timeout | RecvTimeoutError::Disconnected) => None,
        }
    }

    /// True when any queued change touches one of `tables`. Consumes the
    /// queue.
    pub fn touched_any(&self, tables: &[Table]) -> bool {
        self.drain()
            .iter()
            .any(|change| tables.contains(&change.table))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_subscriber_sees_each_change() {
        let feed = ChangeFeed::new();
        let first = feed.subscribe();
        let second = feed.clone().subscribe();

        assert_eq!(feed.publish(Table::Sessions), 2);
        assert_eq!(first.drain(), vec![TableChange { table: Table::Sessions }]);
        assert!(second.touched_any(&[Table::Sessions, Table::Tasks]));
        assert!(second.drain().is_empty());
    }

    #[test]
    fn dropped_subscriptions_are_pruned() {
        let feed = ChangeFeed::new();
        let kept = feed.subscribe();
        drop(feed.subscribe());

        assert_eq!(feed.publish(Table::Subjects), 1);
        assert_eq!(feed.subscriber_count(), 1);
        assert!(kept.next_timeout(Duration::from_millis(10)).is_some());
    }
}
