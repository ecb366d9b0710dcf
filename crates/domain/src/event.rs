use crate::shared::entity::{Entity, ID};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EventStatus {
    Draft,
    Published,
    Active,
    Cancelled,
    Completed,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Address {
    pub street: String,
    pub city: String,
    pub state: String,
    pub zip: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoCoordinate {
    pub latitude: f64,
    pub longitude: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventLocation {
    pub address: Address,
    pub coordinates: Option<GeoCoordinate>,
}

/// A user's pledge to bring / do one item on a sign-up list,
/// tracked independently of ticket registration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SignUpCommitment {
    pub user_id: ID,
    pub quantity: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SignUpItem {
    pub name: String,
    pub commitments: Vec<SignUpCommitment>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SignUpList {
    pub name: String,
    pub items: Vec<SignUpItem>,
}

/// Read-only projection of a community event with the fields needed to
/// resolve recipients and render notification templates. The event store
/// itself is owned by the platform's command layer.
#[derive(Debug, Clone, PartialEq)]
pub struct Event {
    pub id: ID,
    pub title: String,
    pub description: String,
    pub status: EventStatus,
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
    pub organizer_id: ID,
    pub location: Option<EventLocation>,
    /// Ticket price in dollars. `None` or `0` means a free event.
    pub ticket_price: Option<f64>,
    /// Organizer-curated `EmailGroup`s attached to this event
    pub email_group_ids: Vec<ID>,
    pub sign_up_lists: Vec<SignUpList>,
    pub organizer_contact_name: Option<String>,
    pub organizer_contact_email: Option<String>,
    pub organizer_contact_phone: Option<String>,
}

impl Event {
    pub fn is_free(&self) -> bool {
        match self.ticket_price {
            Some(price) => price <= 0.0,
            None => true,
        }
    }

    pub fn has_organizer_contact(&self) -> bool {
        self.organizer_contact_name.is_some()
            || self.organizer_contact_email.is_some()
            || self.organizer_contact_phone.is_some()
    }

    /// Human readable location for templates. Events without a street or
    /// city are treated as online events.
    pub fn location_string(&self) -> String {
        let address = match &self.location {
            Some(location) => &location.address,
            None => return "Online Event".to_string(),
        };

        if address.street.trim().is_empty() && address.city.trim().is_empty() {
            return "Online Event".to_string();
        }

        let mut parts = Vec::new();
        for part in &[&address.street, &address.city, &address.state] {
            if !part.trim().is_empty() {
                parts.push(part.as_str());
            }
        }
        parts.join(", ")
    }

    /// City and state used for the tiered newsletter subscriber match.
    /// `None` when the event has no usable location.
    pub fn match_location(&self) -> Option<&Address> {
        match &self.location {
            Some(location)
                if !location.address.city.trim().is_empty()
                    && !location.address.state.trim().is_empty() =>
            {
                Some(&location.address)
            }
            _ => None,
        }
    }

    pub fn coordinates(&self) -> Option<GeoCoordinate> {
        self.location.as_ref().and_then(|l| l.coordinates)
    }

    /// Unique user ids committed to any item on any of the event's
    /// sign-up lists.
    pub fn committed_user_ids(&self) -> Vec<ID> {
        let mut user_ids = Vec::new();
        for list in &self.sign_up_lists {
            for item in &list.items {
                for commitment in &item.commitments {
                    if !user_ids.contains(&commitment.user_id) {
                        user_ids.push(commitment.user_id.clone());
                    }
                }
            }
        }
        user_ids
    }
}

impl Entity for Event {
    fn id(&self) -> ID {
        self.id.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn event_factory() -> Event {
        Event {
            id: Default::default(),
            title: "Summer Food Festival".into(),
            description: "Annual food festival".into(),
            status: EventStatus::Published,
            start_date: Utc::now(),
            end_date: Utc::now(),
            organizer_id: Default::default(),
            location: None,
            ticket_price: None,
            email_group_ids: Vec::new(),
            sign_up_lists: Vec::new(),
            organizer_contact_name: None,
            organizer_contact_email: None,
            organizer_contact_phone: None,
        }
    }

    #[test]
    fn free_when_price_missing_or_zero() {
        let mut event = event_factory();
        assert!(event.is_free());
        event.ticket_price = Some(0.0);
        assert!(event.is_free());
        event.ticket_price = Some(25.0);
        assert!(!event.is_free());
    }

    #[test]
    fn location_string_falls_back_to_online_event() {
        let mut event = event_factory();
        assert_eq!(event.location_string(), "Online Event");

        event.location = Some(EventLocation {
            address: Address {
                street: "".into(),
                city: "".into(),
                state: "OH".into(),
                zip: "".into(),
            },
            coordinates: None,
        });
        assert_eq!(event.location_string(), "Online Event");

        event.location = Some(EventLocation {
            address: Address {
                street: "123 Main St".into(),
                city: "Cleveland".into(),
                state: "OH".into(),
                zip: "44101".into(),
            },
            coordinates: None,
        });
        assert_eq!(event.location_string(), "123 Main St, Cleveland, OH");
    }

    #[test]
    fn committed_user_ids_are_unique_across_lists() {
        let user_1 = ID::new();
        let user_2 = ID::new();
        let mut event = event_factory();
        event.sign_up_lists = vec![
            SignUpList {
                name: "Potluck".into(),
                items: vec![
                    SignUpItem {
                        name: "Dessert".into(),
                        commitments: vec![
                            SignUpCommitment {
                                user_id: user_1.clone(),
                                quantity: 2,
                            },
                            SignUpCommitment {
                                user_id: user_2.clone(),
                                quantity: 1,
                            },
                        ],
                    },
                    SignUpItem {
                        name: "Drinks".into(),
                        commitments: vec![SignUpCommitment {
                            user_id: user_1.clone(),
                            quantity: 1,
                        }],
                    },
                ],
            },
            SignUpList {
                name: "Volunteers".into(),
                items: vec![SignUpItem {
                    name: "Setup crew".into(),
                    commitments: vec![SignUpCommitment {
                        user_id: user_2.clone(),
                        quantity: 1,
                    }],
                }],
            },
        ];

        let user_ids = event.committed_user_ids();
        assert_eq!(user_ids.len(), 2);
        assert!(user_ids.contains(&user_1));
        assert!(user_ids.contains(&user_2));
    }

    #[test]
    fn match_location_requires_city_and_state() {
        let mut event = event_factory();
        assert!(event.match_location().is_none());

        event.location = Some(EventLocation {
            address: Address {
                street: "123 Main St".into(),
                city: "Cleveland".into(),
                state: " ".into(),
                zip: "44101".into(),
            },
            coordinates: None,
        });
        assert!(event.match_location().is_none());

        event.location = Some(EventLocation {
            address: Address {
                street: "123 Main St".into(),
                city: "Cleveland".into(),
                state: "OH".into(),
                zip: "44101".into(),
            },
            coordinates: None,
        });
        assert!(event.match_location().is_some());
    }
}
