//! Auto-dismissing notification queue
//!
//! Every notification owns one timeout on the shared scheduler. Dismissing
//! early cancels it, dropping the queue cancels all of them.

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use super::scheduler::{SchedulerHandle, TimerId};

/// How long a notification stays up
pub const NOTIFICATION_LIFETIME_MS: f64 = 4000.0;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Success,
    Error,
    Info,
    Loading,
}

impl Severity {
    pub fn label(self) -> &'static str {
        match self {
            Severity::Success => "success",
            Severity::Error => "error",
            Severity::Info => "info",
            Severity::Loading => "loading",
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Notification {
    pub id: u64,
    pub severity: Severity,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}

struct Entry {
    notification: Notification,
    timer: TimerId,
}

pub struct NotificationQueue {
    scheduler: SchedulerHandle,
    entries: Vec<Entry>,
    next_id: u64,
    lifetime_ms: f64,
}

impl NotificationQueue {
    pub fn new(scheduler: SchedulerHandle) -> Self {
        Self::with_lifetime(scheduler, NOTIFICATION_LIFETIME_MS)
    }

    pub fn with_lifetime(scheduler: SchedulerHandle, lifetime_ms: f64) -> Self {
        Self {
            scheduler,
            entries: Vec::new(),
            next_id: 0,
            lifetime_ms,
        }
    }

    /// Post a notification; returns its id
    pub fn push(&mut self, severity: Severity, message: &str, detail: Option<&str>) -> u64 {
        let id = self.next_id;
        self.next_id += 1;
        let timer = self.scheduler.set_timeout(self.lifetime_ms);

        info!(id, severity = severity.label(), message, detail, "Notification");
        self.entries.push(Entry {
            notification: Notification {
                id,
                severity,
                message: message.to_string(),
                detail: detail.map(str::to_string),
            },
            timer,
        });
        id
    }

    /// Remove a notification before it expires
    pub fn dismiss(&mut self, id: u64) -> bool {
        match self.entries.iter().position(|e| e.notification.id == id) {
            Some(pos) => {
                let entry = self.entries.remove(pos);
                self.scheduler.try_cancel(entry.timer);
                debug!(id, "Notification dismissed");
                true
            }
            None => false,
        }
    }

    /// Dispatch a fired timer; expires the matching notification.
    /// Unknown ids are ignored.
    pub fn on_timer(&mut self, timer: TimerId) -> bool {
        match self.entries.iter().position(|e| e.timer == timer) {
            Some(pos) => {
                let entry = self.entries.remove(pos);
                debug!(id = entry.notification.id, "Notification expired");
                true
            }
            None => false,
        }
    }

    /// Oldest first
    pub fn iter(&self) -> impl Iterator<Item = &Notification> {
        self.entries.iter().map(|e| &e.notification)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Drop for NotificationQueue {
    fn drop(&mut self) {
        for entry in self.entries.drain(..) {
            self.scheduler.try_cancel(entry.timer);
        }
    }
}
