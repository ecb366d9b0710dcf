use serde::Serialize;
use std::collections::HashSet;
use std::sync::Mutex;
use thiserror::Error;

/// Failure to deliver a single templated message. `Rejected` is the mail
/// API reporting a failure result, `Transport` is the request itself
/// failing. Both count as a failed send for the recipient.
#[derive(Debug, Error)]
pub enum EmailSendError {
    #[error("Mail API rejected message to {recipient}: {reason}")]
    Rejected { recipient: String, reason: String },
    #[error("Failed to reach mail API: {0}")]
    Transport(String),
}

/// Boundary to the templated mail transport. Template rendering and the
/// actual SMTP delivery live behind the mail API.
#[async_trait::async_trait]
pub trait IEmailService: Send + Sync {
    async fn send_templated(
        &self,
        template: &str,
        recipient: &str,
        parameters: &serde_json::Value,
    ) -> Result<(), EmailSendError>;
}

#[derive(Debug, Serialize)]
struct SendTemplatedEmailRequest<'a> {
    template: &'a str,
    to: &'a str,
    parameters: &'a serde_json::Value,
}

/// Mail API client. Messages are rendered and delivered by the platform's
/// mail service, reachable over HTTP.
pub struct HttpEmailService {
    client: reqwest::Client,
    api_url: String,
    api_key: String,
}

impl HttpEmailService {
    pub fn new(api_url: String, api_key: String) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_url,
            api_key,
        }
    }
}

#[async_trait::async_trait]
impl IEmailService for HttpEmailService {
    async fn send_templated(
        &self,
        template: &str,
        recipient: &str,
        parameters: &serde_json::Value,
    ) -> Result<(), EmailSendError> {
        let res = self
            .client
            .post(&format!("{}/messages", self.api_url))
            .header("gatherly-mail-api-key", &self.api_key)
            .json(&SendTemplatedEmailRequest {
                template,
                to: recipient,
                parameters,
            })
            .send()
            .await
            .map_err(|e| EmailSendError::Transport(e.to_string()))?;

        if !res.status().is_success() {
            let reason = res.text().await.unwrap_or_else(|_| "Unknown error".into());
            return Err(EmailSendError::Rejected {
                recipient: recipient.to_string(),
                reason,
            });
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SentEmail {
    pub template: String,
    pub recipient: String,
    pub parameters: serde_json::Value,
}

/// Records sends instead of delivering them. Used by tests; individual
/// recipients can be configured to fail.
pub struct InMemoryEmailService {
    sent: Mutex<Vec<SentEmail>>,
    failing_recipients: Mutex<HashSet<String>>,
}

impl InMemoryEmailService {
    pub fn new() -> Self {
        Self {
            sent: Mutex::new(Vec::new()),
            failing_recipients: Mutex::new(HashSet::new()),
        }
    }

    /// Makes every send to the given address fail
    pub fn fail_for(&self, recipient: &str) {
        self.failing_recipients
            .lock()
            .unwrap()
            .insert(recipient.to_lowercase());
    }

    pub fn sent(&self) -> Vec<SentEmail> {
        self.sent.lock().unwrap().clone()
    }

    pub fn sent_count(&self) -> usize {
        self.sent.lock().unwrap().len()
    }

    pub fn sent_to(&self, recipient: &str) -> Vec<SentEmail> {
        self.sent
            .lock()
            .unwrap()
            .iter()
            .filter(|e| e.recipient.eq_ignore_ascii_case(recipient))
            .cloned()
            .collect()
    }
}

impl Default for InMemoryEmailService {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait::async_trait]
impl IEmailService for InMemoryEmailService {
    async fn send_templated(
        &self,
        template: &str,
        recipient: &str,
        parameters: &serde_json::Value,
    ) -> Result<(), EmailSendError> {
        if self
            .failing_recipients
            .lock()
            .unwrap()
            .contains(&recipient.to_lowercase())
        {
            return Err(EmailSendError::Rejected {
                recipient: recipient.to_string(),
                reason: "Recipient configured to fail".into(),
            });
        }

        self.sent.lock().unwrap().push(SentEmail {
            template: template.to_string(),
            recipient: recipient.to_string(),
            parameters: parameters.clone(),
        });
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn records_sends_and_injected_failures() {
        let service = InMemoryEmailService::new();
        service.fail_for("Broken@x.com");

        assert!(service
            .send_templated("event-details", "a@x.com", &serde_json::json!({}))
            .await
            .is_ok());
        assert!(service
            .send_templated("event-details", "broken@x.com", &serde_json::json!({}))
            .await
            .is_err());

        assert_eq!(service.sent_count(), 1);
        assert_eq!(service.sent_to("a@x.com").len(), 1);
        assert_eq!(service.sent()[0].template, "event-details");
    }
}
