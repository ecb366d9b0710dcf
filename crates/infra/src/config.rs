use std::str::FromStr;
use tracing::warn;

#[derive(Debug, Clone)]
pub struct Config {
    /// How often the dispatcher looks for scheduled notification jobs
    pub job_poll_interval_secs: u64,
    /// Maximum number of notification jobs picked up per poll
    pub dispatch_batch_size: i64,
    /// Base url of the templated mail API
    pub mail_api_url: String,
    /// Api key sent along with every mail API request
    pub mail_api_key: String,
    /// Base url of the web app, used when building links in templates
    pub frontend_base_url: String,
    /// Hours before an unpaid preliminary registration is reclaimed
    /// by the cleanup job
    pub abandoned_registration_expiry_hours: i64,
}

impl Config {
    pub fn new() -> Self {
        let mail_api_key = match std::env::var("MAIL_API_KEY") {
            Ok(key) => key,
            Err(_) => {
                warn!("Did not find MAIL_API_KEY environment variable. Mail API requests will be unauthenticated.");
                String::new()
            }
        };

        Self {
            job_poll_interval_secs: parse_env_or("JOB_POLL_INTERVAL_SECS", 30),
            dispatch_batch_size: parse_env_or("DISPATCH_BATCH_SIZE", 10),
            mail_api_url: std::env::var("MAIL_API_URL")
                .unwrap_or_else(|_| "http://localhost:8100".into()),
            mail_api_key,
            frontend_base_url: std::env::var("FRONTEND_BASE_URL")
                .unwrap_or_else(|_| "http://localhost:3000".into()),
            abandoned_registration_expiry_hours: parse_env_or(
                "ABANDONED_REGISTRATION_EXPIRY_HOURS",
                24,
            ),
        }
    }
}

fn parse_env_or<T: FromStr + Copy + std::fmt::Display>(var: &str, default: T) -> T {
    match std::env::var(var) {
        Ok(value) => match value.parse::<T>() {
            Ok(value) => value,
            Err(_) => {
                warn!(
                    "The given {}: {} is not valid, falling back to the default: {}.",
                    var, value, default
                );
                default
            }
        },
        Err(_) => default,
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::new()
    }
}
