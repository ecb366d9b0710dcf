use super::resolve_recipients::{
    ResolveEventRecipientsUseCase, ResolvedRecipients, UseCaseError as ResolveError,
};
use crate::shared::usecase::{execute, UseCase};
use gatherly_domain::{Event, NotificationJob, NotificationKind, RecipientSet, ID};
use gatherly_infra::{GatherlyContext, SaveJobError};
use gatherly_utils::create_random_secret;
use serde_json::json;
use std::collections::HashMap;
use std::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

/// Entry point for one notification dispatch run, invoked by the job
/// scheduler with at-least-once semantics. The durable `NotificationJob`
/// record is the only state shared between invocations: its counters act
/// as the idempotency guard, its version as the optimistic concurrency
/// token.
#[derive(Debug)]
pub struct SendEventNotificationsUseCase {
    pub job_id: ID,
    pub cancellation: CancellationToken,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SendStats {
    pub total_recipients: i64,
    pub successful_sends: i64,
    pub failed_sends: i64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// A previous invocation already dispatched for this record
    AlreadyProcessed,
    JobRecordNotFound,
    EventNotFound,
}

#[derive(Debug, PartialEq)]
pub enum JobOutcome {
    Completed(SendStats),
    CompletedWithPartialFailures(SendStats),
    Skipped(SkipReason),
}

#[derive(Debug)]
pub enum UseCaseError {
    RecipientResolution(String),
    StorageError(anyhow::Error),
    Cancelled,
}

#[async_trait::async_trait]
impl UseCase for SendEventNotificationsUseCase {
    type Response = JobOutcome;

    type Error = UseCaseError;

    const NAME: &'static str = "SendEventNotifications";

    async fn execute(&mut self, ctx: &GatherlyContext) -> Result<Self::Response, Self::Error> {
        let correlation_id = create_random_secret(8);
        info!(
            correlation_id = %correlation_id,
            job_id = %self.job_id,
            "Starting event notification job"
        );

        // Idempotency guard. Checked strictly before any send so a retried
        // or concurrent invocation can never dispatch a second wave of
        // emails for the same record.
        let job = match ctx.repos.notification_jobs.find(&self.job_id).await {
            Some(job) => job,
            None => {
                warn!(
                    correlation_id = %correlation_id,
                    job_id = %self.job_id,
                    "Notification job record not found, nothing to do"
                );
                return Ok(JobOutcome::Skipped(SkipReason::JobRecordNotFound));
            }
        };
        if job.has_recorded_sends() {
            info!(
                correlation_id = %correlation_id,
                job_id = %self.job_id,
                successful_sends = job.successful_sends,
                failed_sends = job.failed_sends,
                "Job already has recorded sends, skipping dispatch"
            );
            return Ok(JobOutcome::Skipped(SkipReason::AlreadyProcessed));
        }

        let event = match ctx.repos.events.find(&job.event_id).await {
            Some(event) => event,
            None => {
                warn!(
                    correlation_id = %correlation_id,
                    event_id = %job.event_id,
                    "Event not found, nothing to do"
                );
                return Ok(JobOutcome::Skipped(SkipReason::EventNotFound));
            }
        };

        let resolver = ResolveEventRecipientsUseCase {
            event_id: job.event_id.clone(),
        };
        let ResolvedRecipients {
            recipients,
            warnings,
        } = execute(resolver, ctx)
            .await
            .map_err(|e: ResolveError| UseCaseError::RecipientResolution(format!("{:?}", e)))?;

        info!(
            correlation_id = %correlation_id,
            unique_recipients = recipients.len(),
            source_warnings = warnings.len(),
            breakdown = ?recipients.breakdown(),
            "Resolved recipients"
        );

        let display_names = load_display_names(&recipients, ctx, &correlation_id).await;
        let base_parameters = build_template_data(&event, &job, &ctx.config.frontend_base_url);
        let template = job.kind.template_name();

        let total_recipients = recipients.len() as i64;
        let mut successful_sends: i64 = 0;
        let mut failed_sends: i64 = 0;

        for recipient in recipients.iter() {
            if self.cancellation.is_cancelled() {
                warn!(
                    correlation_id = %correlation_id,
                    successful_sends,
                    failed_sends,
                    "Cancellation requested, stopping dispatch"
                );
                record_partial_statistics(
                    ctx,
                    &correlation_id,
                    &self.job_id,
                    successful_sends,
                    failed_sends,
                )
                .await;
                return Err(UseCaseError::Cancelled);
            }

            let parameters = personalize(
                &base_parameters,
                display_names.get(&recipient.email.to_lowercase()),
            );
            let send_started = Instant::now();
            match ctx
                .email
                .send_templated(template, &recipient.email, &parameters)
                .await
            {
                Ok(()) => successful_sends += 1,
                Err(e) => {
                    failed_sends += 1;
                    warn!(
                        correlation_id = %correlation_id,
                        recipient = %recipient.email,
                        event_id = %event.id,
                        elapsed_ms = send_started.elapsed().as_millis() as u64,
                        error = %e,
                        "Failed to send notification email"
                    );
                }
            }
        }

        info!(
            correlation_id = %correlation_id,
            total_recipients,
            successful_sends,
            failed_sends,
            "Dispatch loop finished"
        );

        if self.cancellation.is_cancelled() {
            warn!(
                correlation_id = %correlation_id,
                "Cancellation requested before the final commit"
            );
            record_partial_statistics(
                ctx,
                &correlation_id,
                &self.job_id,
                successful_sends,
                failed_sends,
            )
            .await;
            return Err(UseCaseError::Cancelled);
        }

        record_statistics(
            ctx,
            &correlation_id,
            &self.job_id,
            total_recipients,
            successful_sends,
            failed_sends,
        )
        .await?;

        let stats = SendStats {
            total_recipients,
            successful_sends,
            failed_sends,
        };
        if stats.failed_sends > 0 {
            Ok(JobOutcome::CompletedWithPartialFailures(stats))
        } else {
            Ok(JobOutcome::Completed(stats))
        }
    }
}

/// One bulk reverse lookup maps recipient addresses to account holders
/// for the personalized greeting. A failure here only degrades
/// personalization, never the dispatch itself.
async fn load_display_names(
    recipients: &RecipientSet,
    ctx: &GatherlyContext,
    correlation_id: &str,
) -> HashMap<String, String> {
    let emails = recipients.emails();
    if emails.is_empty() {
        return HashMap::new();
    }
    match ctx.repos.users.find_many_by_emails(&emails).await {
        Ok(users) => users
            .into_iter()
            .map(|u| (u.email.to_lowercase(), u.full_name()))
            .collect(),
        Err(e) => {
            warn!(
                correlation_id = %correlation_id,
                error = %e,
                "Failed to bulk load user names, using the generic greeting"
            );
            HashMap::new()
        }
    }
}

fn personalize(
    base_parameters: &serde_json::Value,
    display_name: Option<&String>,
) -> serde_json::Value {
    let mut parameters = base_parameters.clone();
    if let Some(map) = parameters.as_object_mut() {
        let name = display_name
            .cloned()
            .unwrap_or_else(|| "Valued Guest".to_string());
        map.insert("user_name".into(), json!(name));
    }
    parameters
}

fn build_template_data(
    event: &Event,
    job: &NotificationJob,
    frontend_base_url: &str,
) -> serde_json::Value {
    let event_url = format!("{}/events/{}", frontend_base_url, event.id);
    let is_free = event.is_free();
    let ticket_price = if is_free {
        "Free".to_string()
    } else {
        format!("${:.2}", event.ticket_price.unwrap_or(0.0))
    };
    let (city, state) = match &event.location {
        Some(location) => (
            location.address.city.clone(),
            location.address.state.clone(),
        ),
        None => ("TBA".to_string(), "TBA".to_string()),
    };

    let mut data = serde_json::Map::new();
    data.insert("event_title".into(), json!(event.title));
    data.insert("event_description".into(), json!(event.description));
    data.insert(
        "event_date".into(),
        json!(event
            .start_date
            .format("%A, %B %-d, %Y %-I:%M %p")
            .to_string()),
    );
    data.insert(
        "event_start_date".into(),
        json!(event.start_date.format("%B %-d, %Y").to_string()),
    );
    data.insert(
        "event_start_time".into(),
        json!(event.start_date.format("%-I:%M %p").to_string()),
    );
    data.insert("event_location".into(), json!(event.location_string()));
    data.insert("event_city".into(), json!(city));
    data.insert("event_state".into(), json!(state));
    data.insert("event_url".into(), json!(event_url));
    data.insert("is_free".into(), json!(is_free));
    data.insert("is_paid".into(), json!(!is_free));
    data.insert("ticket_price".into(), json!(ticket_price));

    if event.sign_up_lists.is_empty() {
        data.insert("has_sign_up_lists".into(), json!(false));
    } else {
        data.insert("has_sign_up_lists".into(), json!(true));
        data.insert(
            "sign_up_lists_url".into(),
            json!(format!("{}#signup-lists", event_url)),
        );
    }

    if event.has_organizer_contact() {
        data.insert("has_organizer_contact".into(), json!(true));
        data.insert(
            "organizer_name".into(),
            json!(event
                .organizer_contact_name
                .clone()
                .unwrap_or_else(|| "Event Organizer".to_string())),
        );
        if let Some(email) = &event.organizer_contact_email {
            data.insert("organizer_email".into(), json!(email));
        }
        if let Some(phone) = &event.organizer_contact_phone {
            data.insert("organizer_phone".into(), json!(phone));
        }
    } else {
        data.insert("has_organizer_contact".into(), json!(false));
    }

    match job.kind {
        NotificationKind::Cancelled => {
            data.insert(
                "cancellation_reason".into(),
                json!(job
                    .reason
                    .clone()
                    .unwrap_or_else(|| "The organizer cancelled this event.".to_string())),
            );
            data.insert(
                "refund_info".into(),
                json!(if is_free {
                    "No refund applicable for free events."
                } else {
                    "Refunds will be processed within 5-7 business days."
                }),
            );
        }
        NotificationKind::Published | NotificationKind::Manual => {
            if let Some(reason) = &job.reason {
                data.insert("organizer_note".into(), json!(reason));
            }
        }
    }

    serde_json::Value::Object(data)
}

/// Cancellation path. Already sent emails stay counted so a later retry
/// cannot resend them; with nothing attempted yet the record stays
/// scheduled and the retry starts clean.
async fn record_partial_statistics(
    ctx: &GatherlyContext,
    correlation_id: &str,
    job_id: &ID,
    successful_sends: i64,
    failed_sends: i64,
) {
    let attempted = successful_sends + failed_sends;
    if attempted == 0 {
        return;
    }
    if let Err(e) = record_statistics(
        ctx,
        correlation_id,
        job_id,
        attempted,
        successful_sends,
        failed_sends,
    )
    .await
    {
        warn!(
            correlation_id = %correlation_id,
            job_id = %job_id,
            "Failed to persist partial statistics after cancellation: {:?}",
            e
        );
    }
}

/// Write-once commit of the final counters. The record is reloaded for a
/// fresh version first; minutes of sending can outlive the version loaded
/// at job start.
async fn record_statistics(
    ctx: &GatherlyContext,
    correlation_id: &str,
    job_id: &ID,
    total_recipients: i64,
    successful_sends: i64,
    failed_sends: i64,
) -> Result<(), UseCaseError> {
    let mut fresh = match ctx.repos.notification_jobs.find(job_id).await {
        Some(job) => job,
        None => {
            warn!(
                correlation_id = %correlation_id,
                job_id = %job_id,
                "Notification job record disappeared before the final update"
            );
            return Ok(());
        }
    };

    if fresh.has_recorded_sends() {
        info!(
            correlation_id = %correlation_id,
            job_id = %job_id,
            successful_sends = fresh.successful_sends,
            failed_sends = fresh.failed_sends,
            "Another execution already recorded statistics, skipping commit"
        );
        return Ok(());
    }

    fresh.update_send_statistics(
        total_recipients,
        successful_sends,
        failed_sends,
        ctx.sys.now(),
    );

    match ctx.repos.notification_jobs.save(&fresh).await {
        Ok(()) => {
            info!(
                correlation_id = %correlation_id,
                job_id = %job_id,
                successful_sends,
                failed_sends,
                "Committed send statistics"
            );
            Ok(())
        }
        Err(SaveJobError::Conflict) => {
            // Another writer got there first. Re-throwing would make the
            // scheduler retry the whole job and resend every email, so
            // check whether equivalent statistics are already durable.
            match ctx.repos.notification_jobs.find(job_id).await {
                Some(reloaded) if reloaded.has_recorded_sends() => {
                    info!(
                        correlation_id = %correlation_id,
                        job_id = %job_id,
                        successful_sends = reloaded.successful_sends,
                        failed_sends = reloaded.failed_sends,
                        "Concurrent execution already committed statistics, no retry needed"
                    );
                    Ok(())
                }
                _ => {
                    warn!(
                        correlation_id = %correlation_id,
                        job_id = %job_id,
                        "Statistics commit lost to a concurrent writer. Emails were delivered, the counters are dropped"
                    );
                    Ok(())
                }
            }
        }
        Err(SaveJobError::Other(e)) => {
            error!(
                correlation_id = %correlation_id,
                job_id = %job_id,
                error = %e,
                "Failed to commit send statistics"
            );
            Err(UseCaseError::StorageError(e))
        }
    }
}
