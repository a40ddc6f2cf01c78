//! Ephemeral user-facing notifications.
//!
//! Each notification gets an id from a monotonic counter owned by this
//! state slice (never a process-wide variable, never reused). Removal is
//! idempotent: auto-expiry timers may fire long after a notification was
//! dismissed by hand, and must not error against a missing id.

use std::time::Duration;

use serde::Serialize;

/// Default lifetime before a notification is removed.
pub const DEFAULT_HIDE_AFTER: Duration = Duration::from_millis(5000);

#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum NotificationKind {
    Success,
    Danger,
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct Notification {
    pub id: u64,
    pub kind: NotificationKind,
    pub text: String,
}

/// Notification module state slice.
#[derive(Debug, Clone)]
pub struct NotificationState {
    pub hide_after: Duration,
    next_id: u64,
    notifications: Vec<Notification>,
}

impl NotificationState {
    pub fn new(hide_after: Duration) -> Self {
        Self {
            hide_after,
            next_id: 0,
            notifications: Vec::new(),
        }
    }

    /// Allocate the next id and append the notification. Returns the id so
    /// the caller can schedule its removal.
    pub fn push(&mut self, kind: NotificationKind, text: String) -> u64 {
        self.next_id += 1;
        let id = self.next_id;
        self.notifications.push(Notification { id, kind, text });
        id
    }

    /// Remove by id. A no-op when the id is already gone.
    pub fn remove(&mut self, id: u64) {
        self.notifications.retain(|notification| notification.id != id);
    }

    /// Most recently allocated id. Meaningful right after a push, read
    /// under the same lock.
    pub fn last_id(&self) -> u64 {
        self.next_id
    }

    pub fn notifications(&self) -> &[Notification] {
        &self.notifications
    }
}

impl Default for NotificationState {
    fn default() -> Self {
        Self::new(DEFAULT_HIDE_AFTER)
    }
}
