mod email_group;
mod event;
mod metro_area;
mod notification_job;
mod registration;
mod shared;
mod subscriber;
mod user;

pub use email_group::{IEmailGroupRepo, InMemoryEmailGroupRepo, PostgresEmailGroupRepo};
pub use event::{IEventRepo, InMemoryEventRepo, PostgresEventRepo};
pub use metro_area::{IMetroAreaRepo, InMemoryMetroAreaRepo, PostgresMetroAreaRepo};
pub use notification_job::{
    INotificationJobRepo, InMemoryNotificationJobRepo, PostgresNotificationJobRepo, SaveJobError,
};
pub use registration::{IRegistrationRepo, InMemoryRegistrationRepo, PostgresRegistrationRepo};
pub use shared::repo::DeleteResult;
pub use subscriber::{
    INewsletterSubscriberRepo, InMemoryNewsletterSubscriberRepo, PostgresNewsletterSubscriberRepo,
};
pub use user::{IUserRepo, InMemoryUserRepo, PostgresUserRepo};

use sqlx::postgres::PgPoolOptions;
use std::sync::Arc;
use tracing::info;

#[derive(Clone)]
pub struct Repos {
    pub notification_jobs: Arc<dyn INotificationJobRepo>,
    pub events: Arc<dyn IEventRepo>,
    pub registrations: Arc<dyn IRegistrationRepo>,
    pub users: Arc<dyn IUserRepo>,
    pub email_groups: Arc<dyn IEmailGroupRepo>,
    pub newsletter_subscribers: Arc<dyn INewsletterSubscriberRepo>,
    pub metro_areas: Arc<dyn IMetroAreaRepo>,
}

impl Repos {
    pub async fn create_postgres(connection_string: &str) -> anyhow::Result<Self> {
        info!("DB CHECKING CONNECTION ...");
        let pool = PgPoolOptions::new()
            .max_connections(5)
            .connect(connection_string)
            .await?;
        info!("DB CHECKING CONNECTION ... [done]");

        Ok(Self {
            notification_jobs: Arc::new(PostgresNotificationJobRepo::new(pool.clone())),
            events: Arc::new(PostgresEventRepo::new(pool.clone())),
            registrations: Arc::new(PostgresRegistrationRepo::new(pool.clone())),
            users: Arc::new(PostgresUserRepo::new(pool.clone())),
            email_groups: Arc::new(PostgresEmailGroupRepo::new(pool.clone())),
            newsletter_subscribers: Arc::new(PostgresNewsletterSubscriberRepo::new(pool.clone())),
            metro_areas: Arc::new(PostgresMetroAreaRepo::new(pool)),
        })
    }

    pub fn create_inmemory() -> Self {
        Self {
            notification_jobs: Arc::new(InMemoryNotificationJobRepo::new()),
            events: Arc::new(InMemoryEventRepo::new()),
            registrations: Arc::new(InMemoryRegistrationRepo::new()),
            users: Arc::new(InMemoryUserRepo::new()),
            email_groups: Arc::new(InMemoryEmailGroupRepo::new()),
            newsletter_subscribers: Arc::new(InMemoryNewsletterSubscriberRepo::new()),
            metro_areas: Arc::new(InMemoryMetroAreaRepo::new()),
        }
    }
}
