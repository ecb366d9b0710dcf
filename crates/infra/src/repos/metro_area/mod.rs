mod inmemory;
mod postgres;

pub use inmemory::InMemoryMetroAreaRepo;
pub use postgres::PostgresMetroAreaRepo;

use gatherly_domain::MetroArea;

#[async_trait::async_trait]
pub trait IMetroAreaRepo: Send + Sync {
    async fn insert(&self, metro_area: &MetroArea) -> anyhow::Result<()>;
    /// Exact city + state lookup, case-insensitive. Fallback when an event
    /// has no coordinates.
    async fn find_by_city_state(&self, city: &str, state: &str) -> Option<MetroArea>;
    /// All metro areas of a state, used for the distance based match
    async fn find_by_state(&self, state: &str) -> anyhow::Result<Vec<MetroArea>>;
}
