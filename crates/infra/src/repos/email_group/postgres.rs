use super::IEmailGroupRepo;
use gatherly_domain::{EmailGroup, ID};
use sqlx::{types::Uuid, FromRow, PgPool};

pub struct PostgresEmailGroupRepo {
    pool: PgPool,
}

impl PostgresEmailGroupRepo {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, FromRow)]
struct EmailGroupRaw {
    group_uid: Uuid,
    name: String,
    emails: Vec<String>,
}

impl Into<EmailGroup> for EmailGroupRaw {
    fn into(self) -> EmailGroup {
        EmailGroup {
            id: self.group_uid.into(),
            name: self.name,
            emails: self.emails,
        }
    }
}

#[async_trait::async_trait]
impl IEmailGroupRepo for PostgresEmailGroupRepo {
    async fn insert(&self, group: &EmailGroup) -> anyhow::Result<()> {
        sqlx::query(
            r#"
            INSERT INTO email_groups(group_uid, name, emails)
            VALUES($1, $2, $3)
            "#,
        )
        .bind(group.id.inner_ref())
        .bind(&group.name)
        .bind(&group.emails)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn find_many(&self, group_ids: &[ID]) -> anyhow::Result<Vec<EmailGroup>> {
        let group_uids = group_ids
            .iter()
            .map(|id| *id.inner_ref())
            .collect::<Vec<_>>();
        let groups = sqlx::query_as::<_, EmailGroupRaw>(
            r#"
            SELECT * FROM email_groups
            WHERE group_uid = ANY($1)
            "#,
        )
        .bind(group_uids)
        .fetch_all(&self.pool)
        .await?;

        Ok(groups.into_iter().map(|group| group.into()).collect())
    }
}
