//! Toast messages and the client-side notification feed.
//!
//! Toasts are short-lived status lines pushed by mutations and auth flows.
//! Notifications have no backend; [`NotificationFeed`] seeds a fixed set
//! on start and keeps read/delete state in memory.
use chrono::{DateTime, Duration as ChronoDuration, Utc};
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::time::{Duration, Instant};

use crate::form::FieldSpec;
use crate::resources::{Lookups, RecordId, Resource};
use crate::table::{CellValue, Column};

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum ToastLevel {
    Success,
    Info,
    Warning,
    Error,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Toast {
    pub level: ToastLevel,
    pub message: String,
    pub created: Instant,
}

/// Bounded queue of toasts with per-toast expiry.
#[derive(Debug)]
pub struct Toasts {
    queue: VecDeque<Toast>,
    ttl: Duration,
    capacity: usize,
}

impl Default for Toasts {
    fn default() -> Self {
        Self::new(Duration::from_secs(4), 4)
    }
}

impl Toasts {
    pub fn new(ttl: Duration, capacity: usize) -> Self {
        Self {
            queue: VecDeque::new(),
            ttl,
            capacity: capacity.max(1),
        }
    }

    pub fn push(&mut self, level: ToastLevel, message: impl Into<String>) {
        let message = message.into();
        match level {
            ToastLevel::Error => tracing::warn!(%message, "toast"),
            _ => tracing::info!(%message, "toast"),
        }
        if self.queue.len() == self.capacity {
            self.queue.pop_front();
        }
        self.queue.push_back(Toast {
            level,
            message,
            created: Instant::now(),
        });
    }

    pub fn success(&mut self, message: impl Into<String>) {
        self.push(ToastLevel::Success, message);
    }

    pub fn error(&mut self, message: impl Into<String>) {
        self.push(ToastLevel::Error, message);
    }

    pub fn warning(&mut self, message: impl Into<String>) {
        self.push(ToastLevel::Warning, message);
    }

    pub fn info(&mut self, message: impl Into<String>) {
        self.push(ToastLevel::Info, message);
    }

    /// Drop expired toasts.
    pub fn prune(&mut self, now: Instant) {
        let ttl = self.ttl;
        self.queue.retain(|t| now.duration_since(t.created) < ttl);
    }

    pub fn iter(&self) -> impl Iterator<Item = &Toast> {
        self.queue.iter()
    }

    pub fn latest(&self) -> Option<&Toast> {
        self.queue.back()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Notification {
    pub id: RecordId,
    pub title: String,
    pub message: String,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub read: bool,
}

impl Resource for Notification {
    type Draft = serde_json::Value;
    const KEY: &'static str = "notifications";
    const LABEL: &'static str = "Notification";

    fn id(&self) -> RecordId {
        self.id.clone()
    }

    fn display_name(&self) -> String {
        self.title.clone()
    }

    fn columns() -> Vec<Column<Self>> {
        vec![
            Column::new("read", "", |n: &Notification, _: &Lookups| {
                CellValue::text(if n.read { " " } else { "●" })
            })
            .width(2),
            Column::new("title", "Title", |n: &Notification, _: &Lookups| n.title.as_str().into())
                .sortable()
                .width(28),
            Column::new("message", "Message", |n: &Notification, _: &Lookups| n.message.as_str().into()),
            Column::new("createdAt", "Received", |n: &Notification, _: &Lookups| {
                CellValue::text(n.created_at.format("%Y-%m-%d %H:%M").to_string())
            })
            .sortable()
            .width(17),
        ]
    }

    fn form() -> Vec<FieldSpec> {
        Vec::new()
    }

    fn form_values(&self) -> Vec<(&'static str, String)> {
        Vec::new()
    }
}

/// In-memory notification list.
#[derive(Clone, Debug, Default)]
pub struct NotificationFeed {
    items: Vec<Notification>,
}

impl NotificationFeed {
    /// Seed the feed with sample back-office events relative to `now`.
    pub fn seeded(now: DateTime<Utc>) -> Self {
        let samples = [
            ("Loan application submitted", "A new loan application is awaiting review.", 5),
            ("Repayment received", "A repayment was posted against an active loan.", 45),
            ("Member registration", "A new member registration is pending approval.", 180),
            ("Overdue schedule", "One or more repayment schedules are overdue.", 60 * 24),
            ("Monthly statement", "Savings statements for last month are ready.", 60 * 24 * 3),
        ];
        let items = samples
            .iter()
            .enumerate()
            .map(|(i, (title, message, minutes_ago))| Notification {
                id: RecordId::Num(i as i64 + 1),
                title: title.to_string(),
                message: message.to_string(),
                created_at: now - ChronoDuration::minutes(*minutes_ago),
                read: false,
            })
            .collect();
        Self { items }
    }

    pub fn items(&self) -> &[Notification] {
        &self.items
    }

    pub fn unread(&self) -> usize {
        self.items.iter().filter(|n| !n.read).count()
    }

    pub fn mark_read(&mut self, id: &RecordId) -> bool {
        match self.items.iter_mut().find(|n| &n.id == id) {
            Some(n) if !n.read => {
                n.read = true;
                true
            }
            _ => false,
        }
    }

    pub fn mark_all_read(&mut self) -> usize {
        let mut changed = 0;
        for n in self.items.iter_mut().filter(|n| !n.read) {
            n.read = true;
            changed += 1;
        }
        changed
    }

    pub fn remove(&mut self, id: &RecordId) -> bool {
        let before = self.items.len();
        self.items.retain(|n| &n.id != id);
        before != self.items.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn toasts_expire_and_are_bounded() {
        let mut t = Toasts::new(Duration::from_millis(50), 2);
        t.success("one");
        t.error("two");
        t.info("three");
        let msgs: Vec<&str> = t.iter().map(|x| x.message.as_str()).collect();
        assert_eq!(msgs, vec!["two", "three"]);
        t.prune(Instant::now() + Duration::from_millis(100));
        assert!(t.is_empty());
    }

    #[test]
    fn feed_read_state() {
        let mut feed = NotificationFeed::seeded(Utc::now());
        let total = feed.items().len();
        assert_eq!(feed.unread(), total);
        assert!(feed.mark_read(&RecordId::Num(1)));
        assert!(!feed.mark_read(&RecordId::Num(1)));
        assert_eq!(feed.unread(), total - 1);
        assert_eq!(feed.mark_all_read(), total - 1);
        assert!(feed.remove(&RecordId::Num(2)));
        assert_eq!(feed.items().len(), total - 1);
    }
}
