use super::IUserRepo;
use gatherly_domain::{User, ID};
use sqlx::{types::Uuid, FromRow, PgPool};

pub struct PostgresUserRepo {
    pool: PgPool,
}

impl PostgresUserRepo {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, FromRow)]
struct UserRaw {
    user_uid: Uuid,
    email: String,
    first_name: String,
    last_name: String,
}

impl Into<User> for UserRaw {
    fn into(self) -> User {
        User {
            id: self.user_uid.into(),
            email: self.email,
            first_name: self.first_name,
            last_name: self.last_name,
        }
    }
}

#[async_trait::async_trait]
impl IUserRepo for PostgresUserRepo {
    async fn insert(&self, user: &User) -> anyhow::Result<()> {
        sqlx::query(
            r#"
            INSERT INTO users(user_uid, email, first_name, last_name)
            VALUES($1, $2, $3, $4)
            "#,
        )
        .bind(user.id.inner_ref())
        .bind(&user.email)
        .bind(&user.first_name)
        .bind(&user.last_name)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn find(&self, user_id: &ID) -> Option<User> {
        sqlx::query_as::<_, UserRaw>(
            r#"
            SELECT * FROM users
            WHERE user_uid = $1
            "#,
        )
        .bind(user_id.inner_ref())
        .fetch_optional(&self.pool)
        .await
        .ok()
        .flatten()
        .map(|user| user.into())
    }

    async fn find_many(&self, user_ids: &[ID]) -> anyhow::Result<Vec<User>> {
        let user_uids = user_ids.iter().map(|id| *id.inner_ref()).collect::<Vec<_>>();
        let users = sqlx::query_as::<_, UserRaw>(
            r#"
            SELECT * FROM users
            WHERE user_uid = ANY($1)
            "#,
        )
        .bind(user_uids)
        .fetch_all(&self.pool)
        .await?;

        Ok(users.into_iter().map(|user| user.into()).collect())
    }

    async fn find_many_by_emails(&self, emails: &[String]) -> anyhow::Result<Vec<User>> {
        let emails = emails
            .iter()
            .map(|email| email.to_lowercase())
            .collect::<Vec<_>>();
        let users = sqlx::query_as::<_, UserRaw>(
            r#"
            SELECT * FROM users
            WHERE LOWER(email) = ANY($1)
            "#,
        )
        .bind(emails)
        .fetch_all(&self.pool)
        .await?;

        Ok(users.into_iter().map(|user| user.into()).collect())
    }
}
