use super::IEmailGroupRepo;
use crate::repos::shared::inmemory_repo::*;
use gatherly_domain::{EmailGroup, ID};

pub struct InMemoryEmailGroupRepo {
    groups: std::sync::Mutex<Vec<EmailGroup>>,
}

impl InMemoryEmailGroupRepo {
    pub fn new() -> Self {
        Self {
            groups: std::sync::Mutex::new(Vec::new()),
        }
    }
}

#[async_trait::async_trait]
impl IEmailGroupRepo for InMemoryEmailGroupRepo {
    async fn insert(&self, group: &EmailGroup) -> anyhow::Result<()> {
        insert(group, &self.groups);
        Ok(())
    }

    async fn find_many(&self, group_ids: &[ID]) -> anyhow::Result<Vec<EmailGroup>> {
        Ok(find_by(&self.groups, |g| group_ids.contains(&g.id)))
    }
}
