mod inmemory;
mod postgres;

pub use inmemory::InMemoryEmailGroupRepo;
pub use postgres::PostgresEmailGroupRepo;

use gatherly_domain::{EmailGroup, ID};

#[async_trait::async_trait]
pub trait IEmailGroupRepo: Send + Sync {
    async fn insert(&self, group: &EmailGroup) -> anyhow::Result<()>;
    async fn find_many(&self, group_ids: &[ID]) -> anyhow::Result<Vec<EmailGroup>>;
}
