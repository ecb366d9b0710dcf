use crate::shared::entity::{Entity, ID};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RegistrationStatus {
    /// Unpaid checkout in progress. Reclaimed by the cleanup job once the
    /// expiration window has passed.
    Preliminary,
    Confirmed,
    Cancelled,
}

/// A ticket registration for an `Event`. Anonymous registrations have no
/// `user_id` and cannot be notified.
#[derive(Debug, Clone, PartialEq)]
pub struct Registration {
    pub id: ID,
    pub event_id: ID,
    pub user_id: Option<ID>,
    pub status: RegistrationStatus,
    pub attendee_count: i64,
    pub created: DateTime<Utc>,
}

impl Entity for Registration {
    fn id(&self) -> ID {
        self.id.clone()
    }
}
