use super::IUserRepo;
use crate::repos::shared::inmemory_repo::*;
use gatherly_domain::{User, ID};

pub struct InMemoryUserRepo {
    users: std::sync::Mutex<Vec<User>>,
}

impl InMemoryUserRepo {
    pub fn new() -> Self {
        Self {
            users: std::sync::Mutex::new(Vec::new()),
        }
    }
}

#[async_trait::async_trait]
impl IUserRepo for InMemoryUserRepo {
    async fn insert(&self, user: &User) -> anyhow::Result<()> {
        insert(user, &self.users);
        Ok(())
    }

    async fn find(&self, user_id: &ID) -> Option<User> {
        find(user_id, &self.users)
    }

    async fn find_many(&self, user_ids: &[ID]) -> anyhow::Result<Vec<User>> {
        Ok(find_by(&self.users, |u| user_ids.contains(&u.id)))
    }

    async fn find_many_by_emails(&self, emails: &[String]) -> anyhow::Result<Vec<User>> {
        let emails = emails
            .iter()
            .map(|email| email.to_lowercase())
            .collect::<Vec<_>>();
        Ok(find_by(&self.users, |u| {
            emails.contains(&u.email.to_lowercase())
        }))
    }
}
