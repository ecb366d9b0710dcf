mod email_group;
mod event;
mod metro_area;
mod notification;
mod recipients;
mod registration;
mod shared;
mod subscriber;
mod user;

pub use email_group::EmailGroup;
pub use event::{
    Address, Event, EventLocation, EventStatus, GeoCoordinate, SignUpCommitment, SignUpItem,
    SignUpList,
};
pub use metro_area::{distance_km, MetroArea};
pub use notification::{NotificationJob, NotificationJobStatus, NotificationKind};
pub use recipients::{Recipient, RecipientSet, RecipientSource, SourceBreakdown};
pub use registration::{Registration, RegistrationStatus};
pub use shared::entity::{Entity, ID};
pub use subscriber::{LocationPreference, NewsletterSubscriber};
pub use user::User;
