mod inmemory;
mod postgres;

pub use inmemory::InMemoryNewsletterSubscriberRepo;
pub use postgres::PostgresNewsletterSubscriberRepo;

use gatherly_domain::{NewsletterSubscriber, ID};

#[async_trait::async_trait]
pub trait INewsletterSubscriberRepo: Send + Sync {
    async fn insert(&self, subscriber: &NewsletterSubscriber) -> anyhow::Result<()>;
    async fn find_confirmed_by_metro_areas(
        &self,
        metro_area_ids: &[ID],
    ) -> anyhow::Result<Vec<NewsletterSubscriber>>;
    async fn find_confirmed_by_state(
        &self,
        state: &str,
    ) -> anyhow::Result<Vec<NewsletterSubscriber>>;
    async fn find_confirmed_all_locations(&self) -> anyhow::Result<Vec<NewsletterSubscriber>>;
}
