use crate::shared::usecase::UseCase;
use gatherly_domain::{
    Event, NewsletterSubscriber, RecipientSet, RecipientSource, RegistrationStatus, ID,
};
use gatherly_infra::GatherlyContext;
use tracing::{info, warn};

/// Consolidates notification recipients for an event from confirmed
/// registrations, sign-up commitments, attached email groups and
/// location matched newsletter subscribers. Every source is consulted
/// independently; a failing source contributes zero recipients and a
/// warning instead of aborting the others.
#[derive(Debug)]
pub struct ResolveEventRecipientsUseCase {
    pub event_id: ID,
}

#[derive(Debug)]
pub struct ResolvedRecipients {
    pub recipients: RecipientSet,
    /// Sources that failed to resolve on this run
    pub warnings: Vec<SourceWarning>,
}

#[derive(Debug, Clone)]
pub struct SourceWarning {
    pub source: RecipientSource,
    pub reason: String,
}

#[derive(Debug)]
pub enum UseCaseError {
    /// Every consulted source failed, there is nothing to dispatch to
    AllSourcesFailed(Vec<SourceWarning>),
}

#[async_trait::async_trait]
impl UseCase for ResolveEventRecipientsUseCase {
    type Response = ResolvedRecipients;

    type Error = UseCaseError;

    const NAME: &'static str = "ResolveEventRecipients";

    async fn execute(&mut self, ctx: &GatherlyContext) -> Result<Self::Response, Self::Error> {
        let event = match ctx.repos.events.find(&self.event_id).await {
            Some(event) => event,
            None => {
                warn!(event_id = %self.event_id, "Event not found, resolving zero recipients");
                return Ok(ResolvedRecipients {
                    recipients: RecipientSet::new(),
                    warnings: Vec::new(),
                });
            }
        };

        let mut recipients = RecipientSet::new();
        let mut warnings = Vec::new();
        let mut consulted = 0;

        consulted += 1;
        if let Err(e) = add_registration_recipients(&event, &mut recipients, ctx).await {
            warnings.push(source_warning(RecipientSource::Registration, e));
        }

        consulted += 1;
        if let Err(e) = add_sign_up_recipients(&event, &mut recipients, ctx).await {
            warnings.push(source_warning(RecipientSource::SignUpCommitment, e));
        }

        consulted += 1;
        if let Err(e) = add_email_group_recipients(&event, &mut recipients, ctx).await {
            warnings.push(source_warning(RecipientSource::EmailGroup, e));
        }

        // Newsletter subscribers are only consulted for located events
        if event.match_location().is_some() {
            consulted += 1;
            if let Err(e) = add_location_subscribers(&event, &mut recipients, ctx).await {
                warnings.push(source_warning(RecipientSource::LocationSubscriber, e));
            }
        } else {
            info!(event_id = %event.id, "Event has no usable location, skipping newsletter subscribers");
        }

        if !warnings.is_empty() && warnings.len() == consulted && recipients.is_empty() {
            return Err(UseCaseError::AllSourcesFailed(warnings));
        }

        info!(
            event_id = %event.id,
            unique_recipients = recipients.len(),
            breakdown = ?recipients.breakdown(),
            "Resolved notification recipients"
        );

        Ok(ResolvedRecipients {
            recipients,
            warnings,
        })
    }
}

fn source_warning(source: RecipientSource, error: anyhow::Error) -> SourceWarning {
    warn!(source = ?source, error = %error, "Recipient source failed to resolve");
    SourceWarning {
        source,
        reason: error.to_string(),
    }
}

/// Confirmed registrations that belong to a user account. Anonymous
/// registrations have no address on file and are skipped. Emails are
/// resolved with one bulk query, an event can have thousands of
/// registrants.
async fn add_registration_recipients(
    event: &Event,
    recipients: &mut RecipientSet,
    ctx: &GatherlyContext,
) -> anyhow::Result<()> {
    let registrations = ctx.repos.registrations.find_by_event(&event.id).await?;

    let mut user_ids = Vec::new();
    for registration in registrations {
        if registration.status != RegistrationStatus::Confirmed {
            continue;
        }
        let user_id = match registration.user_id {
            Some(user_id) => user_id,
            None => continue,
        };
        if !user_ids.contains(&user_id) {
            user_ids.push(user_id);
        }
    }
    if user_ids.is_empty() {
        return Ok(());
    }

    let users = ctx.repos.users.find_many(&user_ids).await?;
    info!(
        event_id = %event.id,
        registrations = user_ids.len(),
        resolved_emails = users.len(),
        "Resolved confirmed registration recipients"
    );
    recipients.extend(
        users.into_iter().map(|u| u.email),
        RecipientSource::Registration,
    );
    Ok(())
}

/// Users committed to items on the event's sign-up lists
async fn add_sign_up_recipients(
    event: &Event,
    recipients: &mut RecipientSet,
    ctx: &GatherlyContext,
) -> anyhow::Result<()> {
    let user_ids = event.committed_user_ids();
    if user_ids.is_empty() {
        return Ok(());
    }

    let users = ctx.repos.users.find_many(&user_ids).await?;
    info!(
        event_id = %event.id,
        committed_users = user_ids.len(),
        resolved_emails = users.len(),
        "Resolved sign-up commitment recipients"
    );
    recipients.extend(
        users.into_iter().map(|u| u.email),
        RecipientSource::SignUpCommitment,
    );
    Ok(())
}

async fn add_email_group_recipients(
    event: &Event,
    recipients: &mut RecipientSet,
    ctx: &GatherlyContext,
) -> anyhow::Result<()> {
    if event.email_group_ids.is_empty() {
        return Ok(());
    }

    let groups = ctx
        .repos
        .email_groups
        .find_many(&event.email_group_ids)
        .await?;
    let mut email_count = 0;
    for group in &groups {
        email_count += group.emails.len();
        recipients.extend(&group.emails, RecipientSource::EmailGroup);
    }
    info!(
        event_id = %event.id,
        groups = groups.len(),
        emails = email_count,
        "Resolved email group recipients"
    );
    Ok(())
}

/// Tiered location match: metro area, then state, then the all-locations
/// opt-in. The tiers are additive; overlap collapses in the recipient set.
async fn add_location_subscribers(
    event: &Event,
    recipients: &mut RecipientSet,
    ctx: &GatherlyContext,
) -> anyhow::Result<()> {
    let address = match event.match_location() {
        Some(address) => address,
        None => return Ok(()),
    };

    let metro_subscribers = metro_area_subscribers(event, &address.city, &address.state, ctx).await?;
    let state_subscribers = ctx
        .repos
        .newsletter_subscribers
        .find_confirmed_by_state(&address.state)
        .await?;
    let all_locations_subscribers = ctx
        .repos
        .newsletter_subscribers
        .find_confirmed_all_locations()
        .await?;

    info!(
        event_id = %event.id,
        metro = metro_subscribers.len(),
        state = state_subscribers.len(),
        all_locations = all_locations_subscribers.len(),
        "Resolved newsletter subscriber tiers"
    );

    for subscriber in metro_subscribers
        .iter()
        .chain(state_subscribers.iter())
        .chain(all_locations_subscribers.iter())
    {
        recipients.add(&subscriber.email, RecipientSource::LocationSubscriber);
    }
    Ok(())
}

/// Metro tier. With coordinates on the event every metro area of the
/// state whose radius covers the event matches (an event in Aurora, OH
/// reaches Cleveland metro subscribers); without coordinates the metro is
/// matched by exact city + state.
async fn metro_area_subscribers(
    event: &Event,
    city: &str,
    state: &str,
    ctx: &GatherlyContext,
) -> anyhow::Result<Vec<NewsletterSubscriber>> {
    let metro_area_ids: Vec<ID> = match event.coordinates() {
        Some(coordinates) => {
            let state_metros = ctx.repos.metro_areas.find_by_state(state).await?;
            state_metros
                .into_iter()
                .filter(|metro| metro.covers(&coordinates))
                .map(|metro| metro.id)
                .collect()
        }
        None => match ctx.repos.metro_areas.find_by_city_state(city, state).await {
            Some(metro) => vec![metro.id],
            None => Vec::new(),
        },
    };

    if metro_area_ids.is_empty() {
        return Ok(Vec::new());
    }

    ctx.repos
        .newsletter_subscribers
        .find_confirmed_by_metro_areas(&metro_area_ids)
        .await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::usecase::execute;
    use chrono::Utc;
    use gatherly_domain::{
        Address, EmailGroup, EventLocation, EventStatus, GeoCoordinate, LocationPreference,
        MetroArea, NewsletterSubscriber, Registration, SignUpCommitment, SignUpItem, SignUpList,
        User,
    };
    use gatherly_infra::{setup_inmemory_context, IEmailGroupRepo, IUserRepo};
    use std::sync::Arc;

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

    fn located(mut event: Event, city: &str, state: &str, coordinates: Option<GeoCoordinate>) -> Event {
        event.location = Some(EventLocation {
            address: Address {
                street: "123 Main St".into(),
                city: city.into(),
                state: state.into(),
                zip: "44101".into(),
            },
            coordinates,
        });
        event
    }

    async fn insert_user(ctx: &GatherlyContext, email: &str) -> User {
        let user = User {
            id: Default::default(),
            email: email.into(),
            first_name: "Nimal".into(),
            last_name: "Perera".into(),
        };
        ctx.repos.users.insert(&user).await.unwrap();
        user
    }

    async fn insert_registration(
        ctx: &GatherlyContext,
        event_id: &ID,
        user_id: Option<ID>,
        status: RegistrationStatus,
    ) {
        let registration = Registration {
            id: Default::default(),
            event_id: event_id.clone(),
            user_id,
            status,
            attendee_count: 1,
            created: Utc::now(),
        };
        ctx.repos.registrations.insert(&registration).await.unwrap();
    }

    async fn insert_subscriber(
        ctx: &GatherlyContext,
        email: &str,
        preference: LocationPreference,
    ) {
        let subscriber = NewsletterSubscriber {
            id: Default::default(),
            email: email.into(),
            confirmed: true,
            preference,
        };
        ctx.repos
            .newsletter_subscribers
            .insert(&subscriber)
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn consolidates_recipients_from_all_sources() {
        let ctx = setup_inmemory_context();

        let user_a = insert_user(&ctx, "a@x.com").await;
        let user_b = insert_user(&ctx, "b@x.com").await;
        let user_c = insert_user(&ctx, "c@x.com").await;

        let mut event = located(event_factory(), "Cleveland", "OH", None);
        event.sign_up_lists = vec![SignUpList {
            name: "Potluck".into(),
            items: vec![SignUpItem {
                name: "Dessert".into(),
                commitments: vec![SignUpCommitment {
                    user_id: user_c.id.clone(),
                    quantity: 1,
                }],
            }],
        }];
        ctx.repos.events.insert(&event).await.unwrap();

        insert_registration(&ctx, &event.id, Some(user_a.id.clone()), RegistrationStatus::Confirmed).await;
        insert_registration(&ctx, &event.id, Some(user_b.id.clone()), RegistrationStatus::Confirmed).await;

        // b@x.com overlaps with a registration, d@x.com is new
        insert_subscriber(&ctx, "b@x.com", LocationPreference::State { state: "OH".into() }).await;
        insert_subscriber(&ctx, "d@x.com", LocationPreference::AllLocations).await;

        let usecase = ResolveEventRecipientsUseCase {
            event_id: event.id.clone(),
        };
        let res = execute(usecase, &ctx).await.unwrap();

        assert!(res.warnings.is_empty());
        assert_eq!(res.recipients.len(), 4);
        for email in &["a@x.com", "b@x.com", "c@x.com", "d@x.com"] {
            assert!(res.recipients.contains(email), "missing {}", email);
        }
        let breakdown = res.recipients.breakdown();
        assert_eq!(breakdown.registrations, 2);
        assert_eq!(breakdown.sign_up_commitments, 1);
        assert_eq!(breakdown.location_subscribers, 2);
    }

    #[tokio::test]
    async fn excludes_anonymous_and_unconfirmed_registrations() {
        let ctx = setup_inmemory_context();

        let confirmed = insert_user(&ctx, "confirmed@x.com").await;
        let preliminary = insert_user(&ctx, "preliminary@x.com").await;

        let event = event_factory();
        ctx.repos.events.insert(&event).await.unwrap();

        insert_registration(&ctx, &event.id, Some(confirmed.id.clone()), RegistrationStatus::Confirmed).await;
        insert_registration(&ctx, &event.id, Some(preliminary.id.clone()), RegistrationStatus::Preliminary).await;
        insert_registration(&ctx, &event.id, None, RegistrationStatus::Confirmed).await;

        let usecase = ResolveEventRecipientsUseCase {
            event_id: event.id.clone(),
        };
        let res = execute(usecase, &ctx).await.unwrap();

        assert_eq!(res.recipients.len(), 1);
        assert!(res.recipients.contains("confirmed@x.com"));
    }

    #[tokio::test]
    async fn resolves_email_groups_attached_to_the_event() {
        let ctx = setup_inmemory_context();

        let group = EmailGroup {
            id: Default::default(),
            name: "Board members".into(),
            emails: vec!["board1@x.com".into(), "board2@x.com".into()],
        };
        ctx.repos.email_groups.insert(&group).await.unwrap();

        let other_group = EmailGroup {
            id: Default::default(),
            name: "Vendors".into(),
            emails: vec!["vendor@x.com".into()],
        };
        ctx.repos.email_groups.insert(&other_group).await.unwrap();

        let mut event = event_factory();
        event.email_group_ids = vec![group.id.clone()];
        ctx.repos.events.insert(&event).await.unwrap();

        let usecase = ResolveEventRecipientsUseCase {
            event_id: event.id.clone(),
        };
        let res = execute(usecase, &ctx).await.unwrap();

        assert_eq!(res.recipients.len(), 2);
        assert!(res.recipients.contains("board1@x.com"));
        assert!(!res.recipients.contains("vendor@x.com"));
    }

    #[tokio::test]
    async fn skips_newsletter_subscribers_without_event_location() {
        let ctx = setup_inmemory_context();

        insert_subscriber(&ctx, "anywhere@x.com", LocationPreference::AllLocations).await;

        let event = event_factory();
        ctx.repos.events.insert(&event).await.unwrap();

        let usecase = ResolveEventRecipientsUseCase {
            event_id: event.id.clone(),
        };
        let res = execute(usecase, &ctx).await.unwrap();

        assert!(res.recipients.is_empty());
    }

    #[tokio::test]
    async fn matches_metro_subscribers_by_distance_when_coordinates_present() {
        let ctx = setup_inmemory_context();

        let cleveland = MetroArea {
            id: Default::default(),
            name: "Cleveland".into(),
            city: "Cleveland".into(),
            state: "OH".into(),
            center_latitude: 41.4993,
            center_longitude: -81.6944,
            radius_miles: 50.0,
        };
        let columbus = MetroArea {
            id: Default::default(),
            name: "Columbus".into(),
            city: "Columbus".into(),
            state: "OH".into(),
            center_latitude: 39.9612,
            center_longitude: -82.9988,
            radius_miles: 40.0,
        };
        ctx.repos.metro_areas.insert(&cleveland).await.unwrap();
        ctx.repos.metro_areas.insert(&columbus).await.unwrap();

        insert_subscriber(
            &ctx,
            "cleveland@x.com",
            LocationPreference::MetroArea {
                metro_area_id: cleveland.id.clone(),
            },
        )
        .await;
        insert_subscriber(
            &ctx,
            "columbus@x.com",
            LocationPreference::MetroArea {
                metro_area_id: columbus.id.clone(),
            },
        )
        .await;

        // Event in Aurora, OH: inside the Cleveland radius, far from Columbus
        let event = located(
            event_factory(),
            "Aurora",
            "OH",
            Some(GeoCoordinate {
                latitude: 41.3173,
                longitude: -81.3460,
            }),
        );
        ctx.repos.events.insert(&event).await.unwrap();

        let usecase = ResolveEventRecipientsUseCase {
            event_id: event.id.clone(),
        };
        let res = execute(usecase, &ctx).await.unwrap();

        assert!(res.recipients.contains("cleveland@x.com"));
        assert!(!res.recipients.contains("columbus@x.com"));
    }

    #[tokio::test]
    async fn matches_metro_subscribers_by_exact_city_without_coordinates() {
        let ctx = setup_inmemory_context();

        let cleveland = MetroArea {
            id: Default::default(),
            name: "Cleveland".into(),
            city: "Cleveland".into(),
            state: "OH".into(),
            center_latitude: 41.4993,
            center_longitude: -81.6944,
            radius_miles: 50.0,
        };
        ctx.repos.metro_areas.insert(&cleveland).await.unwrap();
        insert_subscriber(
            &ctx,
            "cleveland@x.com",
            LocationPreference::MetroArea {
                metro_area_id: cleveland.id.clone(),
            },
        )
        .await;

        let event = located(event_factory(), "cleveland", "oh", None);
        ctx.repos.events.insert(&event).await.unwrap();

        let usecase = ResolveEventRecipientsUseCase {
            event_id: event.id.clone(),
        };
        let res = execute(usecase, &ctx).await.unwrap();

        assert!(res.recipients.contains("cleveland@x.com"));
    }

    #[tokio::test]
    async fn missing_event_resolves_to_zero_recipients() {
        let ctx = setup_inmemory_context();

        let usecase = ResolveEventRecipientsUseCase {
            event_id: ID::new(),
        };
        let res = execute(usecase, &ctx).await.unwrap();

        assert!(res.recipients.is_empty());
        assert!(res.warnings.is_empty());
    }

    struct FailingUserRepo;

    #[async_trait::async_trait]
    impl IUserRepo for FailingUserRepo {
        async fn insert(&self, _user: &User) -> anyhow::Result<()> {
            Err(anyhow::anyhow!("User store unavailable"))
        }
        async fn find(&self, _user_id: &ID) -> Option<User> {
            None
        }
        async fn find_many(&self, _user_ids: &[ID]) -> anyhow::Result<Vec<User>> {
            Err(anyhow::anyhow!("User store unavailable"))
        }
        async fn find_many_by_emails(&self, _emails: &[String]) -> anyhow::Result<Vec<User>> {
            Err(anyhow::anyhow!("User store unavailable"))
        }
    }

    #[tokio::test]
    async fn failing_source_becomes_warning_and_other_sources_still_resolve() {
        let mut ctx = setup_inmemory_context();

        let group = EmailGroup {
            id: Default::default(),
            name: "Board members".into(),
            emails: vec!["board@x.com".into()],
        };
        ctx.repos.email_groups.insert(&group).await.unwrap();

        let mut event = event_factory();
        event.email_group_ids = vec![group.id.clone()];
        event.sign_up_lists = vec![SignUpList {
            name: "Potluck".into(),
            items: vec![SignUpItem {
                name: "Dessert".into(),
                commitments: vec![SignUpCommitment {
                    user_id: ID::new(),
                    quantity: 1,
                }],
            }],
        }];
        ctx.repos.events.insert(&event).await.unwrap();
        insert_registration(&ctx, &event.id, Some(ID::new()), RegistrationStatus::Confirmed).await;

        ctx.repos.users = Arc::new(FailingUserRepo);

        let usecase = ResolveEventRecipientsUseCase {
            event_id: event.id.clone(),
        };
        let res = execute(usecase, &ctx).await.unwrap();

        // Registrations and sign-up commitments failed, email groups survived
        assert_eq!(res.warnings.len(), 2);
        assert_eq!(res.recipients.len(), 1);
        assert!(res.recipients.contains("board@x.com"));
        let warned: Vec<_> = res.warnings.iter().map(|w| w.source).collect();
        assert!(warned.contains(&RecipientSource::Registration));
        assert!(warned.contains(&RecipientSource::SignUpCommitment));
    }

    struct FailingEmailGroupRepo;

    #[async_trait::async_trait]
    impl IEmailGroupRepo for FailingEmailGroupRepo {
        async fn insert(&self, _group: &EmailGroup) -> anyhow::Result<()> {
            Err(anyhow::anyhow!("Email group store unavailable"))
        }
        async fn find_many(&self, _group_ids: &[ID]) -> anyhow::Result<Vec<EmailGroup>> {
            Err(anyhow::anyhow!("Email group store unavailable"))
        }
    }

    struct FailingRegistrationRepo;

    #[async_trait::async_trait]
    impl gatherly_infra::IRegistrationRepo for FailingRegistrationRepo {
        async fn insert(&self, _registration: &Registration) -> anyhow::Result<()> {
            Err(anyhow::anyhow!("Registration store unavailable"))
        }
        async fn find_by_event(&self, _event_id: &ID) -> anyhow::Result<Vec<Registration>> {
            Err(anyhow::anyhow!("Registration store unavailable"))
        }
        async fn delete_abandoned_before(
            &self,
            _cutoff: chrono::DateTime<Utc>,
        ) -> anyhow::Result<gatherly_infra::DeleteResult> {
            Err(anyhow::anyhow!("Registration store unavailable"))
        }
    }

    #[tokio::test]
    async fn fails_when_every_consulted_source_fails() {
        let mut ctx = setup_inmemory_context();

        let mut event = event_factory();
        event.email_group_ids = vec![ID::new()];
        event.sign_up_lists = vec![SignUpList {
            name: "Potluck".into(),
            items: vec![SignUpItem {
                name: "Dessert".into(),
                commitments: vec![SignUpCommitment {
                    user_id: ID::new(),
                    quantity: 1,
                }],
            }],
        }];
        ctx.repos.events.insert(&event).await.unwrap();

        ctx.repos.users = Arc::new(FailingUserRepo);
        ctx.repos.email_groups = Arc::new(FailingEmailGroupRepo);
        ctx.repos.registrations = Arc::new(FailingRegistrationRepo);

        let usecase = ResolveEventRecipientsUseCase {
            event_id: event.id.clone(),
        };
        match execute(usecase, &ctx).await {
            Err(UseCaseError::AllSourcesFailed(warnings)) => assert_eq!(warnings.len(), 3),
            other => panic!("Expected all sources failed, got: {:?}", other.is_ok()),
        }
    }
}
