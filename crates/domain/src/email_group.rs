use crate::shared::entity::{Entity, ID};

/// An organizer-curated static list of recipient addresses that can be
/// attached to one or more events.
#[derive(Debug, Clone, PartialEq)]
pub struct EmailGroup {
    pub id: ID,
    pub name: String,
    pub emails: Vec<String>,
}

impl Entity for EmailGroup {
    fn id(&self) -> ID {
        self.id.clone()
    }
}
