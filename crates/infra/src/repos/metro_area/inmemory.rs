use super::IMetroAreaRepo;
use crate::repos::shared::inmemory_repo::*;
use gatherly_domain::MetroArea;

pub struct InMemoryMetroAreaRepo {
    metro_areas: std::sync::Mutex<Vec<MetroArea>>,
}

impl InMemoryMetroAreaRepo {
    pub fn new() -> Self {
        Self {
            metro_areas: std::sync::Mutex::new(Vec::new()),
        }
    }
}

#[async_trait::async_trait]
impl IMetroAreaRepo for InMemoryMetroAreaRepo {
    async fn insert(&self, metro_area: &MetroArea) -> anyhow::Result<()> {
        insert(metro_area, &self.metro_areas);
        Ok(())
    }

    async fn find_by_city_state(&self, city: &str, state: &str) -> Option<MetroArea> {
        find_by(&self.metro_areas, |m| {
            m.city.eq_ignore_ascii_case(city) && m.state.eq_ignore_ascii_case(state)
        })
        .into_iter()
        .next()
    }

    async fn find_by_state(&self, state: &str) -> anyhow::Result<Vec<MetroArea>> {
        Ok(find_by(&self.metro_areas, |m| {
            m.state.eq_ignore_ascii_case(state)
        }))
    }
}
