use super::{INotificationJobRepo, SaveJobError};
use chrono::{DateTime, Utc};
use gatherly_domain::{NotificationJob, ID};
use sqlx::{types::Uuid, FromRow, PgPool};

pub struct PostgresNotificationJobRepo {
    pool: PgPool,
}

impl PostgresNotificationJobRepo {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, FromRow)]
struct NotificationJobRaw {
    job_uid: Uuid,
    event_uid: Uuid,
    kind: String,
    reason: Option<String>,
    total_recipients: i64,
    successful_sends: i64,
    failed_sends: i64,
    status: String,
    created: DateTime<Utc>,
    sent_at: Option<DateTime<Utc>>,
    version: i64,
}

impl Into<NotificationJob> for NotificationJobRaw {
    fn into(self) -> NotificationJob {
        NotificationJob {
            id: self.job_uid.into(),
            event_id: self.event_uid.into(),
            kind: serde_json::from_value(serde_json::Value::String(self.kind)).unwrap(),
            reason: self.reason,
            total_recipients: self.total_recipients,
            successful_sends: self.successful_sends,
            failed_sends: self.failed_sends,
            status: serde_json::from_value(serde_json::Value::String(self.status)).unwrap(),
            created: self.created,
            sent_at: self.sent_at,
            version: self.version,
        }
    }
}

fn as_str(value: impl serde::Serialize) -> String {
    match serde_json::to_value(value) {
        Ok(serde_json::Value::String(s)) => s,
        _ => String::new(),
    }
}

#[async_trait::async_trait]
impl INotificationJobRepo for PostgresNotificationJobRepo {
    async fn insert(&self, job: &NotificationJob) -> anyhow::Result<()> {
        sqlx::query(
            r#"
            INSERT INTO notification_jobs
            (job_uid, event_uid, kind, reason, total_recipients, successful_sends, failed_sends, status, created, sent_at, version)
            VALUES($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
            "#,
        )
        .bind(job.id.inner_ref())
        .bind(job.event_id.inner_ref())
        .bind(as_str(job.kind))
        .bind(&job.reason)
        .bind(job.total_recipients)
        .bind(job.successful_sends)
        .bind(job.failed_sends)
        .bind(as_str(job.status))
        .bind(job.created)
        .bind(job.sent_at)
        .bind(job.version)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn find(&self, job_id: &ID) -> Option<NotificationJob> {
        sqlx::query_as::<_, NotificationJobRaw>(
            r#"
            SELECT * FROM notification_jobs
            WHERE job_uid = $1
            "#,
        )
        .bind(job_id.inner_ref())
        .fetch_optional(&self.pool)
        .await
        .ok()
        .flatten()
        .map(|job| job.into())
    }

    async fn find_scheduled(&self, limit: i64) -> Vec<NotificationJob> {
        sqlx::query_as::<_, NotificationJobRaw>(
            r#"
            SELECT * FROM notification_jobs
            WHERE status = 'scheduled' AND successful_sends = 0 AND failed_sends = 0
            ORDER BY created
            LIMIT $1
            "#,
        )
        .bind(limit)
        .fetch_all(&self.pool)
        .await
        .unwrap_or(vec![])
        .into_iter()
        .map(|job| job.into())
        .collect()
    }

    async fn save(&self, job: &NotificationJob) -> Result<(), SaveJobError> {
        let res = sqlx::query(
            r#"
            UPDATE notification_jobs
            SET total_recipients = $1,
                successful_sends = $2,
                failed_sends = $3,
                status = $4,
                sent_at = $5,
                version = version + 1
            WHERE job_uid = $6 AND version = $7
            "#,
        )
        .bind(job.total_recipients)
        .bind(job.successful_sends)
        .bind(job.failed_sends)
        .bind(as_str(job.status))
        .bind(job.sent_at)
        .bind(job.id.inner_ref())
        .bind(job.version)
        .execute(&self.pool)
        .await
        .map_err(|e| SaveJobError::Other(e.into()))?;

        if res.rows_affected() == 0 {
            return Err(SaveJobError::Conflict);
        }
        Ok(())
    }
}
