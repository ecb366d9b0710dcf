mod cleanup;
mod job_schedulers;
mod notification;
mod shared;

pub use cleanup::CleanAbandonedRegistrationsUseCase;
pub use job_schedulers::start_job_schedulers;
pub use notification::{
    JobOutcome, ResolveEventRecipientsUseCase, ResolvedRecipients, SendEventNotificationsUseCase,
    SendStats, SkipReason, SourceWarning,
};
pub use shared::usecase::{execute, UseCase};

use gatherly_infra::GatherlyContext;
use tokio_util::sync::CancellationToken;

/// Hosts the background job schedulers. The daemon runs until a shutdown
/// signal arrives; in-flight jobs observe the cancellation token, persist
/// what they can and exit.
pub struct Application {
    shutdown: CancellationToken,
}

impl Application {
    pub fn new(context: GatherlyContext) -> Self {
        let shutdown = CancellationToken::new();
        job_schedulers::start_job_schedulers(context, shutdown.clone());
        Self { shutdown }
    }

    pub async fn run_until_stopped(self) -> std::io::Result<()> {
        tokio::signal::ctrl_c().await?;
        self.shutdown.cancel();
        Ok(())
    }
}
