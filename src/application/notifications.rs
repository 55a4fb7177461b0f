//! Transient operator notifications.
//!
//! Messages stack newest-first and expire after a fixed time to live.

use std::time::{Duration, Instant};

/// Default lifetime of a notification.
pub const DEFAULT_NOTIFICATION_TTL: Duration = Duration::from_secs(5);

/// Severity of a notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationKind {
    Success,
    Info,
    Warning,
    Danger,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub id: u64,
    pub kind: NotificationKind,
    pub message: String,
    pub created_at: Instant,
}

/// Stack of live notifications, newest first.
#[derive(Debug, Clone)]
pub struct Notifications {
    items: Vec<Notification>,
    next_id: u64,
    ttl: Duration,
}

impl Default for Notifications {
    fn default() -> Self {
        Self::with_ttl(DEFAULT_NOTIFICATION_TTL)
    }
}

impl Notifications {
    #[must_use]
    pub fn with_ttl(ttl: Duration) -> Self {
        Self {
            items: Vec::new(),
            next_id: 0,
            ttl,
        }
    }

    /// Push a message stamped with the current time.
    pub fn push(&mut self, kind: NotificationKind, message: impl Into<String>) -> u64 {
        self.push_at(kind, message, Instant::now())
    }

    /// Push a message stamped with `now`.
    pub fn push_at(
        &mut self,
        kind: NotificationKind,
        message: impl Into<String>,
        now: Instant,
    ) -> u64 {
        self.next_id += 1;
        let id = self.next_id;
        self.items.insert(
            0,
            Notification {
                id,
                kind,
                message: message.into(),
                created_at: now,
            },
        );
        id
    }

    /// Drop notifications older than the time to live.
    pub fn expire(&mut self, now: Instant) {
        let ttl = self.ttl;
        self.items
            .retain(|n| now.saturating_duration_since(n.created_at) < ttl);
    }

    /// Dismiss the topmost (newest) notification.
    pub fn dismiss_newest(&mut self) -> Option<Notification> {
        if self.items.is_empty() {
            None
        } else {
            Some(self.items.remove(0))
        }
    }

    #[must_use]
    pub fn items(&self) -> &[Notification] {
        &self.items
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}
