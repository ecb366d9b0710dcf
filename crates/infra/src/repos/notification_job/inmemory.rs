use super::{INotificationJobRepo, SaveJobError};
use crate::repos::shared::inmemory_repo::*;
use anyhow::anyhow;
use gatherly_domain::{NotificationJob, NotificationJobStatus, ID};

pub struct InMemoryNotificationJobRepo {
    jobs: std::sync::Mutex<Vec<NotificationJob>>,
}

impl InMemoryNotificationJobRepo {
    pub fn new() -> Self {
        Self {
            jobs: std::sync::Mutex::new(Vec::new()),
        }
    }
}

#[async_trait::async_trait]
impl INotificationJobRepo for InMemoryNotificationJobRepo {
    async fn insert(&self, job: &NotificationJob) -> anyhow::Result<()> {
        insert(job, &self.jobs);
        Ok(())
    }

    async fn find(&self, job_id: &ID) -> Option<NotificationJob> {
        find(job_id, &self.jobs)
    }

    async fn find_scheduled(&self, limit: i64) -> Vec<NotificationJob> {
        let mut jobs = find_by(&self.jobs, |j| {
            j.status == NotificationJobStatus::Scheduled && !j.has_recorded_sends()
        });
        jobs.sort_by_key(|j| j.created);
        jobs.truncate(limit as usize);
        jobs
    }

    async fn save(&self, job: &NotificationJob) -> Result<(), SaveJobError> {
        let mut jobs = self.jobs.lock().unwrap();
        let stored = match jobs.iter_mut().find(|j| j.id == job.id) {
            Some(stored) => stored,
            None => {
                return Err(SaveJobError::Other(anyhow!(
                    "Notification job {} does not exist",
                    job.id
                )))
            }
        };
        if stored.version != job.version {
            return Err(SaveJobError::Conflict);
        }
        let mut updated = job.clone();
        updated.version += 1;
        *stored = updated;
        Ok(())
    }
}
