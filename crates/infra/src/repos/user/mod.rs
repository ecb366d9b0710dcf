mod inmemory;
mod postgres;

pub use inmemory::InMemoryUserRepo;
pub use postgres::PostgresUserRepo;

use gatherly_domain::{User, ID};

#[async_trait::async_trait]
pub trait IUserRepo: Send + Sync {
    async fn insert(&self, user: &User) -> anyhow::Result<()>;
    async fn find(&self, user_id: &ID) -> Option<User>;
    /// Bulk lookup for a set of user ids. One event can have thousands of
    /// registrants so emails are never resolved one id at a time.
    async fn find_many(&self, user_ids: &[ID]) -> anyhow::Result<Vec<User>>;
    /// Bulk reverse lookup used to personalize greetings. Emails are
    /// matched case-insensitively.
    async fn find_many_by_emails(&self, emails: &[String]) -> anyhow::Result<Vec<User>>;
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user_factory(email: &str) -> User {
        User {
            id: Default::default(),
            email: email.into(),
            first_name: "Nimal".into(),
            last_name: "Perera".into(),
        }
    }

    #[tokio::test]
    async fn finds_users_by_emails_case_insensitively() {
        let repo = InMemoryUserRepo::new();
        let user = user_factory("Nimal@Example.com");
        repo.insert(&user).await.unwrap();

        let found = repo
            .find_many_by_emails(&["nimal@example.com".to_string()])
            .await
            .unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].id, user.id);
    }

    #[tokio::test]
    async fn finds_many_by_ids() {
        let repo = InMemoryUserRepo::new();
        let user_1 = user_factory("a@x.com");
        let user_2 = user_factory("b@x.com");
        repo.insert(&user_1).await.unwrap();
        repo.insert(&user_2).await.unwrap();

        let found = repo
            .find_many(&[user_1.id.clone(), ID::new()])
            .await
            .unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].email, "a@x.com");
    }
}
