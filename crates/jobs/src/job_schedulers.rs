use crate::cleanup::CleanAbandonedRegistrationsUseCase;
use crate::notification::SendEventNotificationsUseCase;
use crate::shared::usecase::execute;
use gatherly_infra::GatherlyContext;
use std::time::Duration;
use tokio::time::interval;
use tokio_util::sync::CancellationToken;
use tracing::{error, info};

const CLEANUP_INTERVAL_SECS: u64 = 60 * 60;

pub fn start_job_schedulers(ctx: GatherlyContext, shutdown: CancellationToken) {
    start_notification_dispatcher(ctx.clone(), shutdown.clone());
    start_registration_cleanup_job(ctx, shutdown);
}

/// Polls for scheduled notification jobs. Delivery is at-least-once: a
/// record picked up twice (or retried after a crash) is caught by the
/// job's idempotency guard.
fn start_notification_dispatcher(ctx: GatherlyContext, shutdown: CancellationToken) {
    tokio::spawn(async move {
        let mut poll_interval = interval(Duration::from_secs(ctx.config.job_poll_interval_secs));
        loop {
            tokio::select! {
                _ = shutdown.cancelled() => {
                    info!("Notification dispatcher shutting down");
                    break;
                }
                _ = poll_interval.tick() => {
                    dispatch_scheduled_jobs(&ctx, &shutdown).await;
                }
            }
        }
    });
}

async fn dispatch_scheduled_jobs(ctx: &GatherlyContext, shutdown: &CancellationToken) {
    let due_jobs = ctx
        .repos
        .notification_jobs
        .find_scheduled(ctx.config.dispatch_batch_size)
        .await;

    for job in due_jobs {
        let usecase = SendEventNotificationsUseCase {
            job_id: job.id.clone(),
            cancellation: shutdown.child_token(),
        };
        // A failed job stays scheduled and is retried on a later poll
        if let Err(e) = execute(usecase, ctx).await {
            error!(job_id = %job.id, "Notification job failed, will be retried: {:?}", e);
        }
    }
}

fn start_registration_cleanup_job(ctx: GatherlyContext, shutdown: CancellationToken) {
    tokio::spawn(async move {
        let mut cleanup_interval = interval(Duration::from_secs(CLEANUP_INTERVAL_SECS));
        loop {
            tokio::select! {
                _ = shutdown.cancelled() => {
                    info!("Registration cleanup job shutting down");
                    break;
                }
                _ = cleanup_interval.tick() => {
                    if let Err(e) = execute(CleanAbandonedRegistrationsUseCase, &ctx).await {
                        error!("Registration cleanup failed: {:?}", e);
                    }
                }
            }
        }
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use gatherly_domain::{
        Event, EventStatus, NotificationJob, NotificationJobStatus, NotificationKind,
        Registration, RegistrationStatus, User,
    };
    use gatherly_infra::{setup_inmemory_context, InMemoryEmailService};
    use std::sync::Arc;

    #[tokio::test]
    async fn dispatches_scheduled_jobs_and_marks_them_processed() {
        let email = Arc::new(InMemoryEmailService::new());
        let mut ctx = setup_inmemory_context();
        ctx.email = email.clone();

        let user = User {
            id: Default::default(),
            email: "a@x.com".into(),
            first_name: "Amara".into(),
            last_name: "Perera".into(),
        };
        ctx.repos.users.insert(&user).await.unwrap();

        let event = Event {
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
        };
        ctx.repos.events.insert(&event).await.unwrap();
        ctx.repos
            .registrations
            .insert(&Registration {
                id: Default::default(),
                event_id: event.id.clone(),
                user_id: Some(user.id.clone()),
                status: RegistrationStatus::Confirmed,
                attendee_count: 1,
                created: Utc::now(),
            })
            .await
            .unwrap();

        let job = NotificationJob::new(
            event.id.clone(),
            NotificationKind::Published,
            None,
            Utc::now(),
        );
        ctx.repos.notification_jobs.insert(&job).await.unwrap();

        let shutdown = CancellationToken::new();
        dispatch_scheduled_jobs(&ctx, &shutdown).await;

        assert_eq!(email.sent_count(), 1);
        let stored = ctx.repos.notification_jobs.find(&job.id).await.unwrap();
        assert_eq!(stored.status, NotificationJobStatus::Sent);

        // Processed jobs are no longer picked up
        dispatch_scheduled_jobs(&ctx, &shutdown).await;
        assert_eq!(email.sent_count(), 1);
    }
}
