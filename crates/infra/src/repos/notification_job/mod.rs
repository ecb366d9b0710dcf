mod inmemory;
mod postgres;

pub use inmemory::InMemoryNotificationJobRepo;
pub use postgres::PostgresNotificationJobRepo;

use gatherly_domain::{NotificationJob, ID};
use thiserror::Error;

/// Error from persisting a `NotificationJob` against its expected version.
#[derive(Debug, Error)]
pub enum SaveJobError {
    /// Another writer changed the record since it was loaded
    #[error("Notification job was modified concurrently")]
    Conflict,
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

#[async_trait::async_trait]
pub trait INotificationJobRepo: Send + Sync {
    async fn insert(&self, job: &NotificationJob) -> anyhow::Result<()>;
    async fn find(&self, job_id: &ID) -> Option<NotificationJob>;
    /// Scheduled jobs that have not dispatched anything yet, oldest first
    async fn find_scheduled(&self, limit: i64) -> Vec<NotificationJob>;
    /// Persists the job if the stored version still matches `job.version`.
    /// The stored version is incremented on success.
    async fn save(&self, job: &NotificationJob) -> Result<(), SaveJobError>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use gatherly_domain::NotificationKind;

    #[tokio::test]
    async fn save_rejects_stale_version() {
        let repo = InMemoryNotificationJobRepo::new();
        let job = NotificationJob::new(
            Default::default(),
            NotificationKind::Published,
            None,
            Utc::now(),
        );
        repo.insert(&job).await.unwrap();

        // First writer wins and bumps the stored version
        let mut first = repo.find(&job.id).await.unwrap();
        first.update_send_statistics(2, 2, 0, Utc::now());
        assert!(repo.save(&first).await.is_ok());

        // Second writer still holds the original version
        let mut second = job.clone();
        second.update_send_statistics(2, 1, 1, Utc::now());
        match repo.save(&second).await {
            Err(SaveJobError::Conflict) => {}
            other => panic!("Expected conflict, got: {:?}", other.is_ok()),
        }

        let stored = repo.find(&job.id).await.unwrap();
        assert_eq!(stored.successful_sends, 2);
        assert_eq!(stored.version, 1);
    }

    #[tokio::test]
    async fn find_scheduled_skips_processed_jobs() {
        let repo = InMemoryNotificationJobRepo::new();
        let pending = NotificationJob::new(
            Default::default(),
            NotificationKind::Manual,
            None,
            Utc::now(),
        );
        let mut processed = NotificationJob::new(
            Default::default(),
            NotificationKind::Manual,
            None,
            Utc::now(),
        );
        processed.update_send_statistics(1, 1, 0, Utc::now());

        repo.insert(&pending).await.unwrap();
        repo.insert(&processed).await.unwrap();

        let scheduled = repo.find_scheduled(10).await;
        assert_eq!(scheduled.len(), 1);
        assert_eq!(scheduled[0].id, pending.id);
    }
}
