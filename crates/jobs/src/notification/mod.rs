mod resolve_recipients;
mod send_event_notifications;

pub use resolve_recipients::{ResolveEventRecipientsUseCase, ResolvedRecipients, SourceWarning};
pub use send_event_notifications::{
    JobOutcome, SendEventNotificationsUseCase, SendStats, SkipReason,
};
