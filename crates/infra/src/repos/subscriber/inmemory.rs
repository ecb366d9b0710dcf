use super::INewsletterSubscriberRepo;
use crate::repos::shared::inmemory_repo::*;
use gatherly_domain::{LocationPreference, NewsletterSubscriber, ID};

pub struct InMemoryNewsletterSubscriberRepo {
    subscribers: std::sync::Mutex<Vec<NewsletterSubscriber>>,
}

impl InMemoryNewsletterSubscriberRepo {
    pub fn new() -> Self {
        Self {
            subscribers: std::sync::Mutex::new(Vec::new()),
        }
    }
}

#[async_trait::async_trait]
impl INewsletterSubscriberRepo for InMemoryNewsletterSubscriberRepo {
    async fn insert(&self, subscriber: &NewsletterSubscriber) -> anyhow::Result<()> {
        insert(subscriber, &self.subscribers);
        Ok(())
    }

    async fn find_confirmed_by_metro_areas(
        &self,
        metro_area_ids: &[ID],
    ) -> anyhow::Result<Vec<NewsletterSubscriber>> {
        Ok(find_by(&self.subscribers, |s| {
            s.confirmed
                && match &s.preference {
                    LocationPreference::MetroArea { metro_area_id } => {
                        metro_area_ids.contains(metro_area_id)
                    }
                    _ => false,
                }
        }))
    }

    async fn find_confirmed_by_state(
        &self,
        state: &str,
    ) -> anyhow::Result<Vec<NewsletterSubscriber>> {
        Ok(find_by(&self.subscribers, |s| {
            s.confirmed
                && match &s.preference {
                    LocationPreference::State { state: subscribed } => {
                        subscribed.eq_ignore_ascii_case(state)
                    }
                    _ => false,
                }
        }))
    }

    async fn find_confirmed_all_locations(&self) -> anyhow::Result<Vec<NewsletterSubscriber>> {
        Ok(find_by(&self.subscribers, |s| {
            s.confirmed && s.preference == LocationPreference::AllLocations
        }))
    }
}
