use crate::shared::entity::{Entity, ID};
use serde::{Deserialize, Serialize};

/// Where a newsletter subscriber wants to hear about events.
/// The tiers are additive when matching an event location: a metro area
/// subscriber is also reachable through the state and all-locations tiers
/// of other subscribers, and the final recipient set deduplicates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum LocationPreference {
    MetroArea { metro_area_id: ID },
    State { state: String },
    AllLocations,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewsletterSubscriber {
    pub id: ID,
    pub email: String,
    /// Only confirmed (double opt-in) subscribers receive notifications
    pub confirmed: bool,
    pub preference: LocationPreference,
}

impl Entity for NewsletterSubscriber {
    fn id(&self) -> ID {
        self.id.clone()
    }
}
