mod inmemory;
mod postgres;

pub use inmemory::InMemoryRegistrationRepo;
pub use postgres::PostgresRegistrationRepo;

use crate::repos::shared::repo::DeleteResult;
use chrono::{DateTime, Utc};
use gatherly_domain::{Registration, ID};

#[async_trait::async_trait]
pub trait IRegistrationRepo: Send + Sync {
    async fn insert(&self, registration: &Registration) -> anyhow::Result<()>;
    async fn find_by_event(&self, event_id: &ID) -> anyhow::Result<Vec<Registration>>;
    /// Reclaims unpaid preliminary registrations older than the cutoff
    async fn delete_abandoned_before(&self, cutoff: DateTime<Utc>) -> anyhow::Result<DeleteResult>;
}
