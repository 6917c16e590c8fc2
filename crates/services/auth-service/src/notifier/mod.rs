//! Post-registration notifications.

mod mail;

use async_trait::async_trait;

use common::AppResult;
use domain::Account;

pub use mail::{MailNotifier, VerificationEmail};

/// Delivers an email verification link to a newly registered account.
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn send_verification(&self, account: &Account, token: &str) -> AppResult<()>;
}

/// Notifier that sends nothing.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopNotifier;

#[async_trait]
impl Notifier for NoopNotifier {
    async fn send_verification(&self, account: &Account, _token: &str) -> AppResult<()> {
        tracing::debug!(account_id = %account.id, "Verification email disabled");
        Ok(())
    }
}
