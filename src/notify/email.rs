//! Email notification backend.
//!
//! Sends the rendered diff as an HTML email over SMTP with a fixed
//! From/To identity and subject line. The SMTP password is resolved by
//! the caller (Secrets Manager in lambda, environment variable in the
//! CLI) and never read from the config file.

use async_trait::async_trait;
use lettre::message::{Mailbox, header::ContentType};
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};
use tracing::info;

use crate::error::{AppError, Result};
use crate::models::NotifyConfig;
use crate::notify::Notifier;
use crate::pipeline::JobDiff;

/// SMTP email notification backend.
pub struct EmailNotifier {
    config: NotifyConfig,
    transport: AsyncSmtpTransport<Tokio1Executor>,
}

impl EmailNotifier {
    /// Create an email notifier with the given SMTP password.
    pub fn new(config: NotifyConfig, smtp_password: impl Into<String>) -> Result<Self> {
        let credentials = Credentials::new(config.from.clone(), smtp_password.into());
        let transport = AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&config.smtp_host)
            .map_err(AppError::transport)?
            .port(config.smtp_port)
            .credentials(credentials)
            .build();

        Ok(Self { config, transport })
    }

    fn html_body(diff: &JobDiff) -> String {
        format!(
            "<html>\n<body>\n<h1>Job Changes</h1>\n\
             <pre style=\"font-family:monospace;\">{}</pre>\n\
             </body>\n</html>",
            escape_html(&diff.render())
        )
    }

    fn build_message(&self, diff: &JobDiff) -> Result<Message> {
        let from: Mailbox = self
            .config
            .from
            .parse()
            .map_err(|e| AppError::config(format!("invalid notify.from address: {e}")))?;
        let to: Mailbox = self
            .config
            .to
            .parse()
            .map_err(|e| AppError::config(format!("invalid notify.to address: {e}")))?;

        Message::builder()
            .from(from)
            .to(to)
            .subject(&self.config.subject)
            .header(ContentType::TEXT_HTML)
            .body(Self::html_body(diff))
            .map_err(AppError::transport)
    }
}

#[async_trait]
impl Notifier for EmailNotifier {
    async fn notify(&self, diff: &JobDiff) -> Result<()> {
        let message = self.build_message(diff)?;

        self.transport
            .send(message)
            .await
            .map_err(AppError::transport)?;

        info!("Notification sent to {}", self.config.to);
        Ok(())
    }
}

fn escape_html(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Job;

    fn sample_diff() -> JobDiff {
        JobDiff {
            added: vec![Job {
                title: "Data & ML Engineer".to_string(),
                location: "Remote".to_string(),
                url: "https://example.com/jobs/1".to_string(),
            }],
            removed: vec![],
            changed: vec![],
        }
    }

    #[test]
    fn test_html_body_wraps_pre_block() {
        let body = EmailNotifier::html_body(&sample_diff());
        assert!(body.contains("<pre style=\"font-family:monospace;\">"));
        assert!(body.contains("https://example.com/jobs/1"));
    }

    #[test]
    fn test_html_body_escapes_markup() {
        let body = EmailNotifier::html_body(&sample_diff());
        assert!(body.contains("Data &amp; ML Engineer"));
    }

    #[test]
    fn test_build_message_rejects_bad_address() {
        let config = NotifyConfig {
            from: "not an address".to_string(),
            ..NotifyConfig::default()
        };
        let notifier = EmailNotifier::new(config, "secret").unwrap();
        assert!(notifier.build_message(&sample_diff()).is_err());
    }
}
