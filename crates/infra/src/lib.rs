mod config;
mod repos;
mod services;
mod system;

pub use config::Config;
pub use repos::{
    DeleteResult, IEmailGroupRepo, IEventRepo, IMetroAreaRepo, INewsletterSubscriberRepo,
    INotificationJobRepo, IRegistrationRepo, IUserRepo, InMemoryEmailGroupRepo, InMemoryEventRepo,
    InMemoryMetroAreaRepo, InMemoryNewsletterSubscriberRepo, InMemoryNotificationJobRepo,
    InMemoryRegistrationRepo, InMemoryUserRepo, Repos, SaveJobError,
};
pub use services::{
    EmailSendError, HttpEmailService, IEmailService, InMemoryEmailService, SentEmail,
};
use sqlx::migrate::MigrateError;
use sqlx::postgres::PgPoolOptions;
use std::sync::Arc;
pub use system::{ISys, RealSys};

#[derive(Clone)]
pub struct GatherlyContext {
    pub repos: Repos,
    pub config: Config,
    pub sys: Arc<dyn ISys>,
    pub email: Arc<dyn IEmailService>,
}

struct ContextParams {
    pub postgres_connection_string: String,
}

impl GatherlyContext {
    async fn create(params: ContextParams) -> Self {
        let repos = Repos::create_postgres(&params.postgres_connection_string)
            .await
            .expect("Postgres credentials must be set and valid");
        let config = Config::new();
        let email = Arc::new(HttpEmailService::new(
            config.mail_api_url.clone(),
            config.mail_api_key.clone(),
        ));
        Self {
            repos,
            config,
            sys: Arc::new(RealSys {}),
            email,
        }
    }
}

/// Will setup the infrastructure context given the environment
pub async fn setup_context() -> GatherlyContext {
    GatherlyContext::create(ContextParams {
        postgres_connection_string: get_psql_connection_string(),
    })
    .await
}

/// Infrastructure context backed by in memory stores, used by tests
pub fn setup_inmemory_context() -> GatherlyContext {
    GatherlyContext {
        repos: Repos::create_inmemory(),
        config: Config::new(),
        sys: Arc::new(RealSys {}),
        email: Arc::new(InMemoryEmailService::new()),
    }
}

fn get_psql_connection_string() -> String {
    const PSQL_CONNECTION_STRING: &str = "DATABASE_URL";

    std::env::var(PSQL_CONNECTION_STRING)
        .unwrap_or_else(|_| panic!("{} env var to be present.", PSQL_CONNECTION_STRING))
}

pub async fn run_migration() -> Result<(), MigrateError> {
    let pool = PgPoolOptions::new()
        .max_connections(5)
        .connect(&get_psql_connection_string())
        .await
        .expect("TO CONNECT TO POSTGRES");

    sqlx::migrate!().run(&pool).await
}
