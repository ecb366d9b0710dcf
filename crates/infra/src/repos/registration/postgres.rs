use super::IRegistrationRepo;
use crate::repos::shared::repo::DeleteResult;
use chrono::{DateTime, Utc};
use gatherly_domain::{Registration, ID};
use sqlx::{types::Uuid, FromRow, PgPool};

pub struct PostgresRegistrationRepo {
    pool: PgPool,
}

impl PostgresRegistrationRepo {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, FromRow)]
struct RegistrationRaw {
    registration_uid: Uuid,
    event_uid: Uuid,
    user_uid: Option<Uuid>,
    status: String,
    attendee_count: i64,
    created: DateTime<Utc>,
}

impl Into<Registration> for RegistrationRaw {
    fn into(self) -> Registration {
        Registration {
            id: self.registration_uid.into(),
            event_id: self.event_uid.into(),
            user_id: self.user_uid.map(|id| id.into()),
            status: serde_json::from_value(serde_json::Value::String(self.status)).unwrap(),
            attendee_count: self.attendee_count,
            created: self.created,
        }
    }
}

fn status_as_str(registration: &Registration) -> String {
    match serde_json::to_value(registration.status) {
        Ok(serde_json::Value::String(s)) => s,
        _ => String::new(),
    }
}

#[async_trait::async_trait]
impl IRegistrationRepo for PostgresRegistrationRepo {
    async fn insert(&self, registration: &Registration) -> anyhow::Result<()> {
        sqlx::query(
            r#"
            INSERT INTO registrations
            (registration_uid, event_uid, user_uid, status, attendee_count, created)
            VALUES($1, $2, $3, $4, $5, $6)
            "#,
        )
        .bind(registration.id.inner_ref())
        .bind(registration.event_id.inner_ref())
        .bind(registration.user_id.as_ref().map(|id| *id.inner_ref()))
        .bind(status_as_str(registration))
        .bind(registration.attendee_count)
        .bind(registration.created)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn find_by_event(&self, event_id: &ID) -> anyhow::Result<Vec<Registration>> {
        let registrations = sqlx::query_as::<_, RegistrationRaw>(
            r#"
            SELECT * FROM registrations
            WHERE event_uid = $1
            "#,
        )
        .bind(event_id.inner_ref())
        .fetch_all(&self.pool)
        .await?;

        Ok(registrations
            .into_iter()
            .map(|registration| registration.into())
            .collect())
    }

    async fn delete_abandoned_before(&self, cutoff: DateTime<Utc>) -> anyhow::Result<DeleteResult> {
        let res = sqlx::query(
            r#"
            DELETE FROM registrations
            WHERE status = 'preliminary' AND created < $1
            "#,
        )
        .bind(cutoff)
        .execute(&self.pool)
        .await?;

        Ok(DeleteResult {
            deleted_count: res.rows_affected() as i64,
        })
    }
}
