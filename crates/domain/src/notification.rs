use crate::shared::entity::{Entity, ID};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NotificationKind {
    Published,
    Cancelled,
    Manual,
}

impl NotificationKind {
    /// Template rendered by the mail transport for this kind of
    /// notification.
    pub fn template_name(&self) -> &'static str {
        match self {
            NotificationKind::Published => "event-published",
            NotificationKind::Cancelled => "event-cancelled",
            NotificationKind::Manual => "event-details",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationJobStatus {
    /// Created by the command layer, waiting to be picked up
    Scheduled,
    Sent,
    SentWithFailures,
}

/// Durable record of one logical notification operation. The record id is
/// stable across scheduler retries; the record is created before the job
/// is scheduled and mutated only by the job itself.
///
/// Once `successful_sends` or `failed_sends` is non-zero the record is
/// write-once: a later invocation for the same id must not send again.
#[derive(Debug, Clone, PartialEq)]
pub struct NotificationJob {
    pub id: ID,
    pub event_id: ID,
    pub kind: NotificationKind,
    /// Cancellation reason or manual-notify note provided by the organizer
    pub reason: Option<String>,
    pub total_recipients: i64,
    pub successful_sends: i64,
    pub failed_sends: i64,
    pub status: NotificationJobStatus,
    pub created: DateTime<Utc>,
    pub sent_at: Option<DateTime<Utc>>,
    /// Optimistic concurrency token, incremented on every persisted write
    pub version: i64,
}

impl NotificationJob {
    pub fn new(
        event_id: ID,
        kind: NotificationKind,
        reason: Option<String>,
        created: DateTime<Utc>,
    ) -> Self {
        Self {
            id: Default::default(),
            event_id,
            kind,
            reason,
            total_recipients: 0,
            successful_sends: 0,
            failed_sends: 0,
            status: NotificationJobStatus::Scheduled,
            created,
            sent_at: None,
            version: 0,
        }
    }

    /// True when a previous invocation already dispatched emails for this
    /// record. Checked before any send.
    pub fn has_recorded_sends(&self) -> bool {
        self.successful_sends > 0 || self.failed_sends > 0
    }

    pub fn update_send_statistics(
        &mut self,
        total_recipients: i64,
        successful_sends: i64,
        failed_sends: i64,
        sent_at: DateTime<Utc>,
    ) {
        self.total_recipients = total_recipients;
        self.successful_sends = successful_sends;
        self.failed_sends = failed_sends;
        self.sent_at = Some(sent_at);
        self.status = if failed_sends > 0 {
            NotificationJobStatus::SentWithFailures
        } else {
            NotificationJobStatus::Sent
        };
    }
}

impl Entity for NotificationJob {
    fn id(&self) -> ID {
        self.id.clone()
    }
}
