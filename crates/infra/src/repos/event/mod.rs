mod inmemory;
mod postgres;

pub use inmemory::InMemoryEventRepo;
pub use postgres::PostgresEventRepo;

use gatherly_domain::{Event, ID};

#[async_trait::async_trait]
pub trait IEventRepo: Send + Sync {
    async fn insert(&self, event: &Event) -> anyhow::Result<()>;
    async fn save(&self, event: &Event) -> anyhow::Result<()>;
    async fn find(&self, event_id: &ID) -> Option<Event>;
    async fn delete(&self, event_id: &ID) -> Option<Event>;
}
