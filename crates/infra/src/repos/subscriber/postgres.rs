use super::INewsletterSubscriberRepo;
use gatherly_domain::{LocationPreference, NewsletterSubscriber, ID};
use sqlx::{types::Uuid, FromRow, PgPool};

pub struct PostgresNewsletterSubscriberRepo {
    pool: PgPool,
}

impl PostgresNewsletterSubscriberRepo {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, FromRow)]
struct NewsletterSubscriberRaw {
    subscriber_uid: Uuid,
    email: String,
    confirmed: bool,
    metro_area_uid: Option<Uuid>,
    state: Option<String>,
    all_locations: bool,
}

impl Into<NewsletterSubscriber> for NewsletterSubscriberRaw {
    fn into(self) -> NewsletterSubscriber {
        let preference = if let Some(metro_area_uid) = self.metro_area_uid {
            LocationPreference::MetroArea {
                metro_area_id: metro_area_uid.into(),
            }
        } else if let Some(state) = self.state {
            LocationPreference::State { state }
        } else {
            LocationPreference::AllLocations
        };
        NewsletterSubscriber {
            id: self.subscriber_uid.into(),
            email: self.email,
            confirmed: self.confirmed,
            preference,
        }
    }
}

#[async_trait::async_trait]
impl INewsletterSubscriberRepo for PostgresNewsletterSubscriberRepo {
    async fn insert(&self, subscriber: &NewsletterSubscriber) -> anyhow::Result<()> {
        let (metro_area_uid, state, all_locations) = match &subscriber.preference {
            LocationPreference::MetroArea { metro_area_id } => {
                (Some(*metro_area_id.inner_ref()), None, false)
            }
            LocationPreference::State { state } => (None, Some(state.clone()), false),
            LocationPreference::AllLocations => (None, None, true),
        };

        sqlx::query(
            r#"
            INSERT INTO newsletter_subscribers
            (subscriber_uid, email, confirmed, metro_area_uid, state, all_locations)
            VALUES($1, $2, $3, $4, $5, $6)
            "#,
        )
        .bind(subscriber.id.inner_ref())
        .bind(&subscriber.email)
        .bind(subscriber.confirmed)
        .bind(metro_area_uid)
        .bind(state)
        .bind(all_locations)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn find_confirmed_by_metro_areas(
        &self,
        metro_area_ids: &[ID],
    ) -> anyhow::Result<Vec<NewsletterSubscriber>> {
        let metro_area_uids = metro_area_ids
            .iter()
            .map(|id| *id.inner_ref())
            .collect::<Vec<_>>();
        let subscribers = sqlx::query_as::<_, NewsletterSubscriberRaw>(
            r#"
            SELECT * FROM newsletter_subscribers
            WHERE confirmed AND metro_area_uid = ANY($1)
            "#,
        )
        .bind(metro_area_uids)
        .fetch_all(&self.pool)
        .await?;

        Ok(subscribers
            .into_iter()
            .map(|subscriber| subscriber.into())
            .collect())
    }

    async fn find_confirmed_by_state(
        &self,
        state: &str,
    ) -> anyhow::Result<Vec<NewsletterSubscriber>> {
        let subscribers = sqlx::query_as::<_, NewsletterSubscriberRaw>(
            r#"
            SELECT * FROM newsletter_subscribers
            WHERE confirmed AND LOWER(state) = LOWER($1)
            "#,
        )
        .bind(state)
        .fetch_all(&self.pool)
        .await?;

        Ok(subscribers
            .into_iter()
            .map(|subscriber| subscriber.into())
            .collect())
    }

    async fn find_confirmed_all_locations(&self) -> anyhow::Result<Vec<NewsletterSubscriber>> {
        let subscribers = sqlx::query_as::<_, NewsletterSubscriberRaw>(
            r#"
            SELECT * FROM newsletter_subscribers
            WHERE confirmed AND all_locations
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(subscribers
            .into_iter()
            .map(|subscriber| subscriber.into())
            .collect())
    }
}
