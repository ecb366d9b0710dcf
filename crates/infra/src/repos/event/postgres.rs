use super::IEventRepo;
use chrono::{DateTime, Utc};
use gatherly_domain::{Event, ID};
use sqlx::{
    types::{Json, Uuid},
    FromRow, PgPool,
};

pub struct PostgresEventRepo {
    pool: PgPool,
}

impl PostgresEventRepo {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, FromRow)]
struct EventRaw {
    event_uid: Uuid,
    title: String,
    description: String,
    status: String,
    start_time: DateTime<Utc>,
    end_time: DateTime<Utc>,
    organizer_uid: Uuid,
    location: Option<serde_json::Value>,
    ticket_price: Option<f64>,
    email_group_uids: Vec<Uuid>,
    sign_up_lists: serde_json::Value,
    organizer_contact_name: Option<String>,
    organizer_contact_email: Option<String>,
    organizer_contact_phone: Option<String>,
}

impl Into<Event> for EventRaw {
    fn into(self) -> Event {
        Event {
            id: self.event_uid.into(),
            title: self.title,
            description: self.description,
            status: serde_json::from_value(serde_json::Value::String(self.status)).unwrap(),
            start_date: self.start_time,
            end_date: self.end_time,
            organizer_id: self.organizer_uid.into(),
            location: self
                .location
                .map(|location| serde_json::from_value(location).unwrap()),
            ticket_price: self.ticket_price,
            email_group_ids: self.email_group_uids.into_iter().map(|id| id.into()).collect(),
            sign_up_lists: serde_json::from_value(self.sign_up_lists).unwrap(),
            organizer_contact_name: self.organizer_contact_name,
            organizer_contact_email: self.organizer_contact_email,
            organizer_contact_phone: self.organizer_contact_phone,
        }
    }
}

fn status_as_str(event: &Event) -> String {
    match serde_json::to_value(event.status) {
        Ok(serde_json::Value::String(s)) => s,
        _ => String::new(),
    }
}

#[async_trait::async_trait]
impl IEventRepo for PostgresEventRepo {
    async fn insert(&self, event: &Event) -> anyhow::Result<()> {
        sqlx::query(
            r#"
            INSERT INTO events(
                event_uid,
                title,
                description,
                status,
                start_time,
                end_time,
                organizer_uid,
                location,
                ticket_price,
                email_group_uids,
                sign_up_lists,
                organizer_contact_name,
                organizer_contact_email,
                organizer_contact_phone
            )
            VALUES($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14)
            "#,
        )
        .bind(event.id.inner_ref())
        .bind(&event.title)
        .bind(&event.description)
        .bind(status_as_str(event))
        .bind(event.start_date)
        .bind(event.end_date)
        .bind(event.organizer_id.inner_ref())
        .bind(
            event
                .location
                .as_ref()
                .map(|location| Json(location.clone())),
        )
        .bind(event.ticket_price)
        .bind(
            event
                .email_group_ids
                .iter()
                .map(|id| *id.inner_ref())
                .collect::<Vec<_>>(),
        )
        .bind(Json(event.sign_up_lists.clone()))
        .bind(&event.organizer_contact_name)
        .bind(&event.organizer_contact_email)
        .bind(&event.organizer_contact_phone)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn save(&self, event: &Event) -> anyhow::Result<()> {
        sqlx::query(
            r#"
            UPDATE events
            SET title = $2,
                description = $3,
                status = $4,
                start_time = $5,
                end_time = $6,
                location = $7,
                ticket_price = $8,
                email_group_uids = $9,
                sign_up_lists = $10,
                organizer_contact_name = $11,
                organizer_contact_email = $12,
                organizer_contact_phone = $13
            WHERE event_uid = $1
            "#,
        )
        .bind(event.id.inner_ref())
        .bind(&event.title)
        .bind(&event.description)
        .bind(status_as_str(event))
        .bind(event.start_date)
        .bind(event.end_date)
        .bind(
            event
                .location
                .as_ref()
                .map(|location| Json(location.clone())),
        )
        .bind(event.ticket_price)
        .bind(
            event
                .email_group_ids
                .iter()
                .map(|id| *id.inner_ref())
                .collect::<Vec<_>>(),
        )
        .bind(Json(event.sign_up_lists.clone()))
        .bind(&event.organizer_contact_name)
        .bind(&event.organizer_contact_email)
        .bind(&event.organizer_contact_phone)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn find(&self, event_id: &ID) -> Option<Event> {
        sqlx::query_as::<_, EventRaw>(
            r#"
            SELECT * FROM events
            WHERE event_uid = $1
            "#,
        )
        .bind(event_id.inner_ref())
        .fetch_optional(&self.pool)
        .await
        .ok()
        .flatten()
        .map(|event| event.into())
    }

    async fn delete(&self, event_id: &ID) -> Option<Event> {
        sqlx::query_as::<_, EventRaw>(
            r#"
            DELETE FROM events
            WHERE event_uid = $1
            RETURNING *
            "#,
        )
        .bind(event_id.inner_ref())
        .fetch_optional(&self.pool)
        .await
        .ok()
        .flatten()
        .map(|event| event.into())
    }
}
