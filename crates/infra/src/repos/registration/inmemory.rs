use super::IRegistrationRepo;
use crate::repos::shared::{inmemory_repo::*, repo::DeleteResult};
use chrono::{DateTime, Utc};
use gatherly_domain::{Registration, RegistrationStatus, ID};

pub struct InMemoryRegistrationRepo {
    registrations: std::sync::Mutex<Vec<Registration>>,
}

impl InMemoryRegistrationRepo {
    pub fn new() -> Self {
        Self {
            registrations: std::sync::Mutex::new(Vec::new()),
        }
    }
}

#[async_trait::async_trait]
impl IRegistrationRepo for InMemoryRegistrationRepo {
    async fn insert(&self, registration: &Registration) -> anyhow::Result<()> {
        insert(registration, &self.registrations);
        Ok(())
    }

    async fn find_by_event(&self, event_id: &ID) -> anyhow::Result<Vec<Registration>> {
        Ok(find_by(&self.registrations, |r| &r.event_id == event_id))
    }

    async fn delete_abandoned_before(&self, cutoff: DateTime<Utc>) -> anyhow::Result<DeleteResult> {
        Ok(delete_by(&self.registrations, |r| {
            r.status == RegistrationStatus::Preliminary && r.created < cutoff
        }))
    }
}
