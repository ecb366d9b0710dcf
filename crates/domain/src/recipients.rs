use std::collections::HashMap;

/// Which source produced a recipient. Retained for diagnostics only,
/// never for dedup keying.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RecipientSource {
    Registration,
    SignUpCommitment,
    EmailGroup,
    LocationSubscriber,
}

/// Raw per-source counts collected while building a `RecipientSet`.
/// Counts are taken before deduplication and do not affect the final
/// unique recipient count.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SourceBreakdown {
    pub registrations: usize,
    pub sign_up_commitments: usize,
    pub email_groups: usize,
    pub location_subscribers: usize,
}

impl SourceBreakdown {
    fn count(&mut self, source: RecipientSource) {
        match source {
            RecipientSource::Registration => self.registrations += 1,
            RecipientSource::SignUpCommitment => self.sign_up_commitments += 1,
            RecipientSource::EmailGroup => self.email_groups += 1,
            RecipientSource::LocationSubscriber => self.location_subscribers += 1,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Recipient {
    /// Address with the casing it was first seen with
    pub email: String,
    /// First source that produced this address
    pub source: RecipientSource,
}

/// Unique set of notification recipients, keyed case-insensitively on the
/// email address. Built fresh on every job run and never persisted.
#[derive(Debug, Default)]
pub struct RecipientSet {
    entries: HashMap<String, Recipient>,
    breakdown: SourceBreakdown,
}

impl RecipientSet {
    pub fn new() -> Self {
        Default::default()
    }

    /// Adds an address. Returns true when the address was not in the set
    /// yet. Blank addresses are ignored; duplicates still count towards
    /// the per-source breakdown.
    pub fn add(&mut self, email: &str, source: RecipientSource) -> bool {
        let email = email.trim();
        if email.is_empty() {
            return false;
        }
        self.breakdown.count(source);

        let key = email.to_lowercase();
        if self.entries.contains_key(&key) {
            return false;
        }
        self.entries.insert(
            key,
            Recipient {
                email: email.to_string(),
                source,
            },
        );
        true
    }

    pub fn extend<I, S>(&mut self, emails: I, source: RecipientSource)
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        for email in emails {
            self.add(email.as_ref(), source);
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn contains(&self, email: &str) -> bool {
        self.entries.contains_key(&email.trim().to_lowercase())
    }

    pub fn breakdown(&self) -> &SourceBreakdown {
        &self.breakdown
    }

    pub fn iter(&self) -> impl Iterator<Item = &Recipient> {
        self.entries.values()
    }

    pub fn emails(&self) -> Vec<String> {
        self.entries.values().map(|r| r.email.clone()).collect()
    }
}
