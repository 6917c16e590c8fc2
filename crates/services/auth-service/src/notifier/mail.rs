//! Verification email rendering and delivery.
//!
//! No SMTP transport is linked in; rendered emails are written to the log.

use async_trait::async_trait;

use common::{AppResult, MailConfig};
use domain::Account;

use super::Notifier;

const VERIFICATION_SUBJECT: &str = "Library Management Account Verification";
const DEFAULT_SENDER: &str = "noreply@library.local";

/// A rendered verification email
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VerificationEmail {
    pub from: String,
    pub to: String,
    pub subject: String,
    /// HTML body
    pub body: String,
}

/// Notifier that renders the verification email for the configured mailbox.
pub struct MailNotifier {
    config: MailConfig,
}

impl MailNotifier {
    pub fn new(config: MailConfig) -> Self {
        Self { config }
    }

    /// Absolute link to the verify endpoint for this token
    pub fn verification_url(&self, token: &str) -> String {
        format!(
            "{}/api/v1/auth/verify/{}",
            self.config.public_base_url.trim_end_matches('/'),
            token
        )
    }

    pub fn render(&self, account: &Account, token: &str) -> VerificationEmail {
        let url = self.verification_url(token);
        let body = format!(
            "<html>\n  <body>\n    <p>Hello {},</p>\n    \
             <p>Click on this <a href=\"{}\">Verify Email</a> to verify your email.</p>\n    \
             <p>Best regards,<br>\n    The Library Management Team</p>\n  </body>\n</html>\n",
            account.name, url
        );

        VerificationEmail {
            from: self
                .config
                .email
                .clone()
                .unwrap_or_else(|| DEFAULT_SENDER.to_string()),
            to: account.email.clone(),
            subject: VERIFICATION_SUBJECT.to_string(),
            body,
        }
    }
}

#[async_trait]
impl Notifier for MailNotifier {
    async fn send_verification(&self, account: &Account, token: &str) -> AppResult<()> {
        let email = self.render(account, token);

        tracing::info!(
            to = %email.to,
            from = %email.from,
            subject = %email.subject,
            "Sending verification email"
        );

        match &self.config.host {
            None => tracing::warn!("MAIL_HOST not configured - logging email instead of sending"),
            Some(host) => tracing::warn!(
                host = %host,
                port = self.config.port,
                "No SMTP transport available - logging email instead of sending"
            ),
        }
        tracing::info!(
            "=== EMAIL (not sent) ===\nFrom: {}\nTo: {}\nSubject: {}\nBody:\n{}========================",
            email.from,
            email.to,
            email.subject,
            email.body
        );

        Ok(())
    }
}
