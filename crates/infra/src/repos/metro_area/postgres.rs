use super::IMetroAreaRepo;
use gatherly_domain::MetroArea;
use sqlx::{types::Uuid, FromRow, PgPool};

pub struct PostgresMetroAreaRepo {
    pool: PgPool,
}

impl PostgresMetroAreaRepo {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, FromRow)]
struct MetroAreaRaw {
    metro_area_uid: Uuid,
    name: String,
    city: String,
    state: String,
    center_latitude: f64,
    center_longitude: f64,
    radius_miles: f64,
}

impl Into<MetroArea> for MetroAreaRaw {
    fn into(self) -> MetroArea {
        MetroArea {
            id: self.metro_area_uid.into(),
            name: self.name,
            city: self.city,
            state: self.state,
            center_latitude: self.center_latitude,
            center_longitude: self.center_longitude,
            radius_miles: self.radius_miles,
        }
    }
}

#[async_trait::async_trait]
impl IMetroAreaRepo for PostgresMetroAreaRepo {
    async fn insert(&self, metro_area: &MetroArea) -> anyhow::Result<()> {
        sqlx::query(
            r#"
            INSERT INTO metro_areas
            (metro_area_uid, name, city, state, center_latitude, center_longitude, radius_miles)
            VALUES($1, $2, $3, $4, $5, $6, $7)
            "#,
        )
        .bind(metro_area.id.inner_ref())
        .bind(&metro_area.name)
        .bind(&metro_area.city)
        .bind(&metro_area.state)
        .bind(metro_area.center_latitude)
        .bind(metro_area.center_longitude)
        .bind(metro_area.radius_miles)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn find_by_city_state(&self, city: &str, state: &str) -> Option<MetroArea> {
        sqlx::query_as::<_, MetroAreaRaw>(
            r#"
            SELECT * FROM metro_areas
            WHERE LOWER(city) = LOWER($1) AND LOWER(state) = LOWER($2)
            "#,
        )
        .bind(city)
        .bind(state)
        .fetch_optional(&self.pool)
        .await
        .ok()
        .flatten()
        .map(|metro_area| metro_area.into())
    }

    async fn find_by_state(&self, state: &str) -> anyhow::Result<Vec<MetroArea>> {
        let metro_areas = sqlx::query_as::<_, MetroAreaRaw>(
            r#"
            SELECT * FROM metro_areas
            WHERE LOWER(state) = LOWER($1)
            "#,
        )
        .bind(state)
        .fetch_all(&self.pool)
        .await?;

        Ok(metro_areas
            .into_iter()
            .map(|metro_area| metro_area.into())
            .collect())
    }
}
