use crate::shared::usecase::UseCase;
use chrono::Duration;
use gatherly_infra::{DeleteResult, GatherlyContext};
use tracing::info;

/// Reclaims unpaid preliminary registrations that outlived the configured
/// expiration window. Runs periodically from the job scheduler.
#[derive(Debug)]
pub struct CleanAbandonedRegistrationsUseCase;

#[derive(Debug)]
pub enum UseCaseError {
    StorageError(anyhow::Error),
}

#[async_trait::async_trait]
impl UseCase for CleanAbandonedRegistrationsUseCase {
    type Response = DeleteResult;

    type Error = UseCaseError;

    const NAME: &'static str = "CleanAbandonedRegistrations";

    async fn execute(&mut self, ctx: &GatherlyContext) -> Result<Self::Response, Self::Error> {
        let cutoff =
            ctx.sys.now() - Duration::hours(ctx.config.abandoned_registration_expiry_hours);

        let res = ctx
            .repos
            .registrations
            .delete_abandoned_before(cutoff)
            .await
            .map_err(UseCaseError::StorageError)?;

        if res.deleted_count > 0 {
            info!(
                deleted = res.deleted_count,
                "Reclaimed abandoned registrations"
            );
        }
        Ok(res)
    }
}
