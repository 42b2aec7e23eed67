//! # Reminder Store
//!
//! A most-recent-first list of short notes. Reminders are immutable once
//! created; the only mutations are add and delete.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Storage key in the key-value store.
pub const STORE_KEY: &str = "reminders";

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Reminder {
    pub id: String,
    pub text: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default)]
pub struct ReminderList {
    pub reminders: Vec<Reminder>,
}

impl ReminderList {
    pub fn new(reminders: Vec<Reminder>) -> Self {
        Self { reminders }
    }

    /// Prepends a reminder. Blank text is ignored. Returns true when the list changed.
    pub fn add(&mut self, text: &str) -> bool {
        if text.trim().is_empty() {
            return false;
        }
        self.reminders.insert(
            0,
            Reminder {
                id: uuid::Uuid::new_v4().to_string(),
                text: text.to_string(),
                created_at: Utc::now(),
            },
        );
        true
    }

    /// Removes the reminder with `id`. Returns true when the list changed.
    pub fn delete(&mut self, id: &str) -> bool {
        let before = self.reminders.len();
        self.reminders.retain(|r| r.id != id);
        self.reminders.len() != before
    }

    pub fn is_empty(&self) -> bool {
        self.reminders.is_empty()
    }

    pub fn len(&self) -> usize {
        self.reminders.len()
    }
}
