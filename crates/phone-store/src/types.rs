//! Phone record types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use uuid::Uuid;

/// What a history entry records.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum UsageAction {
    /// The number was used to redeem
    Used,
    /// A redeem was attempted
    Tried,
}

/// One entry in a `last_used` / `last_tried` history log.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct HistoryEntry {
    pub timestamp: DateTime<Utc>,
    /// Network address of the client that reported the event
    #[serde(rename = "ip")]
    pub origin: String,
    pub action: UsageAction,
}

/// A stored phone number with its usage metadata.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PhoneRecord {
    pub id: Uuid,

    /// Canonical `DDD-DDD-DDDD` number, unique across the store
    pub number: String,

    pub has_redeem_value: bool,

    #[serde(default)]
    pub last_used: Option<DateTime<Utc>>,

    /// Append-only
    #[serde(default)]
    pub last_used_history: Vec<HistoryEntry>,

    #[serde(default)]
    pub last_tried: Option<DateTime<Utc>>,

    /// Append-only
    #[serde(default)]
    pub last_tried_history: Vec<HistoryEntry>,

    #[serde(default)]
    pub name: Option<String>,

    #[serde(default)]
    pub amount_spent: f64,

    #[serde(default)]
    pub number_of_points: i64,

    #[serde(default)]
    pub notes: Option<String>,

    /// Soft-delete flag. Flagged records are still listed and still count
    /// towards duplicate checks; the delete endpoint removes records outright.
    #[serde(default)]
    pub is_deleted: bool,

    #[serde(default)]
    pub created_ip: Option<String>,

    #[serde(default)]
    pub updated_ip: Option<String>,
}

impl PhoneRecord {
    /// Create a fresh record for an already-normalized number.
    pub fn new(number: String, has_redeem_value: bool, created_ip: Option<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            number,
            has_redeem_value,
            last_used: None,
            last_used_history: Vec::new(),
            last_tried: None,
            last_tried_history: Vec::new(),
            name: None,
            amount_spent: 0.0,
            number_of_points: 0,
            notes: None,
            is_deleted: false,
            created_ip,
            updated_ip: None,
        }
    }

    /// Apply a partial update, appending history for timestamp changes.
    pub fn apply(&mut self, update: PhoneUpdate, origin: &str) {
        if let Some(has_redeem_value) = update.has_redeem_value {
            self.has_redeem_value = has_redeem_value;
        }

        // An explicit null clears the timestamp; history only records events
        if let Some(last_used) = update.last_used {
            self.last_used = last_used;
            if let Some(timestamp) = last_used {
                self.last_used_history.push(HistoryEntry {
                    timestamp,
                    origin: origin.to_string(),
                    action: UsageAction::Used,
                });
            }
        }

        if let Some(last_tried) = update.last_tried {
            self.last_tried = last_tried;
            if let Some(timestamp) = last_tried {
                self.last_tried_history.push(HistoryEntry {
                    timestamp,
                    origin: origin.to_string(),
                    action: UsageAction::Tried,
                });
            }
        }

        if let Some(name) = update.name {
            self.name = name;
        }
        if let Some(amount_spent) = update.amount_spent {
            self.amount_spent = amount_spent;
        }
        if let Some(number_of_points) = update.number_of_points {
            self.number_of_points = number_of_points;
        }
        if let Some(notes) = update.notes {
            self.notes = notes;
        }
        if let Some(is_deleted) = update.is_deleted {
            self.is_deleted = is_deleted;
        }

        self.updated_ip = Some(origin.to_string());
    }
}

/// Fields accepted when creating a record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewPhoneNumber {
    /// Raw number; normalized on creation
    pub number: String,
    pub has_redeem_value: bool,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub notes: Option<String>,
}

/// Partial update. Absent fields are left untouched.
///
/// `last_used`, `last_tried`, `name` and `notes` tell an absent field apart
/// from an explicit `null`, which clears the value.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PhoneUpdate {
    #[serde(default)]
    pub has_redeem_value: Option<bool>,
    #[serde(default, deserialize_with = "present")]
    pub last_used: Option<Option<DateTime<Utc>>>,
    #[serde(default, deserialize_with = "present")]
    pub last_tried: Option<Option<DateTime<Utc>>>,
    #[serde(default, deserialize_with = "present")]
    pub name: Option<Option<String>>,
    #[serde(default)]
    pub amount_spent: Option<f64>,
    #[serde(default)]
    pub number_of_points: Option<i64>,
    #[serde(default, deserialize_with = "present")]
    pub notes: Option<Option<String>>,
    #[serde(default)]
    pub is_deleted: Option<bool>,
}

/// Marks a field as present, keeping an explicit `null` as `Some(None)`.
fn present<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

/// Result of promoting staged numbers into the record store.
#[derive(Debug, Clone, Default)]
pub struct ConfirmOutcome {
    pub added: Vec<PhoneRecord>,
    /// Numbers that already had a record
    pub skipped: Vec<String>,
}
