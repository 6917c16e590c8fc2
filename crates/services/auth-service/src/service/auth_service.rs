//! Authentication workflow - registration, email verification and login.

use std::sync::Arc;

use async_trait::async_trait;

use account_service_lib::{AccountFilter, AccountStore, AccountUpdate};
use common::{AppError, AppResult, AuthPolicy, OptionExt};
use domain::{Account, AccountView, PasswordHasher, PasswordScheme};

use super::token_service::{Claims, IssuedToken, TokenService};
use crate::notifier::{NoopNotifier, Notifier};

/// Authentication service trait for dependency injection.
#[async_trait]
pub trait AuthService: Send + Sync {
    /// Create an account; fails with `DuplicateEmail` if the email is taken.
    async fn register(&self, email: String, name: String, password: String)
        -> AppResult<AccountView>;

    /// Mark the account named by a verification token as verified.
    async fn verify(&self, token: &str) -> AppResult<()>;

    /// Check credentials and issue an access token
    async fn login(&self, email: String, password: String) -> AppResult<IssuedToken>;

    /// Validate an access token and return its claims
    fn authenticate(&self, token: &str) -> AppResult<Claims>;
}

/// Concrete implementation of AuthService over an account store.
pub struct Authenticator {
    store: Arc<dyn AccountStore>,
    hasher: Arc<dyn PasswordHasher>,
    tokens: Arc<TokenService>,
    notifier: Arc<dyn Notifier>,
    policy: AuthPolicy,
}

impl Authenticator {
    /// Create new auth service instance; notifications are off until
    /// [`Authenticator::with_notifier`] is called.
    pub fn new(store: Arc<dyn AccountStore>, tokens: Arc<TokenService>, policy: AuthPolicy) -> Self {
        Self {
            store,
            hasher: policy.password_scheme.hasher(),
            tokens,
            notifier: Arc::new(NoopNotifier),
            policy,
        }
    }

    pub fn with_notifier(mut self, notifier: Arc<dyn Notifier>) -> Self {
        self.notifier = notifier;
        self
    }

    /// Hash on the blocking pool; Argon2 is CPU-bound.
    async fn hash_password(&self, password: String) -> AppResult<String> {
        let hasher = Arc::clone(&self.hasher);
        let digest = tokio::task::spawn_blocking(move || hasher.hash(&password))
            .await
            .map_err(|e| AppError::internal(format!("Password hashing task failed: {}", e)))??;
        Ok(digest)
    }

    /// Verify against a stored digest, or against the decoy digest when there
    /// is no account so unknown emails cost the same as wrong passwords.
    async fn verify_password(&self, password: String, digest: Option<String>) -> AppResult<bool> {
        // Digests written under another scheme still verify with their own hasher.
        let hasher = match digest.as_deref().and_then(PasswordScheme::detect) {
            Some(scheme) if scheme != self.hasher.scheme() => scheme.hasher(),
            _ => Arc::clone(&self.hasher),
        };

        tokio::task::spawn_blocking(move || {
            let digest = digest.as_deref().unwrap_or_else(|| hasher.decoy_digest());
            hasher.verify(&password, digest)
        })
        .await
        .map_err(|e| AppError::internal(format!("Password verification task failed: {}", e)))
    }

    async fn notify(&self, account: &Account) {
        let result = match self.tokens.issue_verification(account) {
            Ok(token) => self.notifier.send_verification(account, &token).await,
            Err(e) => Err(e),
        };

        if let Err(e) = result {
            tracing::warn!(account_id = %account.id, error = %e, "Verification email not sent");
        }
    }
}

#[async_trait]
impl AuthService for Authenticator {
    async fn register(
        &self,
        email: String,
        name: String,
        password: String,
    ) -> AppResult<AccountView> {
        if self
            .store
            .find_one(&AccountFilter::by_email(email.clone()))
            .await?
            .is_some()
        {
            return Err(AppError::duplicate_email(email));
        }

        let digest = self.hash_password(password).await?;
        let verified = !self.policy.require_verification;

        // The store rejects a concurrent registration that won the race.
        let account = self
            .store
            .insert(Account::register(email, name, digest, verified))
            .await?;
        tracing::info!(account_id = %account.id, verified, "Account registered");

        self.notify(&account).await;
        Ok(AccountView::from(account))
    }

    async fn verify(&self, token: &str) -> AppResult<()> {
        let account_id = if self.policy.strict_verification_tokens {
            self.tokens.validate_verification(token)?.sub
        } else {
            // A decodable token that names no account finds no account.
            self.tokens
                .parse_subject(token)?
                .ok_or(AppError::AccountNotFound)?
        };

        let filter = AccountFilter::by_id(account_id);
        let account = self
            .store
            .find_one(&filter)
            .await?
            .ok_or_account_not_found()?;

        if account.verified {
            tracing::debug!(account_id = %account.id, "Account already verified");
            return Ok(());
        }

        let matched = self
            .store
            .update(&filter, &AccountUpdate::set_verified(true))
            .await?;
        if matched == 0 {
            return Err(AppError::AccountNotFound);
        }

        tracing::info!(account_id = %account.id, "Email verified");
        Ok(())
    }

    async fn login(&self, email: String, password: String) -> AppResult<IssuedToken> {
        let account = self
            .store
            .find_one(&AccountFilter::by_email(email))
            .await?;

        let digest = account.as_ref().map(|a| a.password_digest.clone());
        let password_valid = self.verify_password(password, digest).await?;

        let account = match account {
            Some(account) if password_valid => account,
            _ => return Err(AppError::InvalidCredentials),
        };

        if self.policy.require_verification && !account.verified {
            return Err(AppError::EmailNotVerified);
        }

        let issued = self.tokens.issue(&account)?;
        tracing::info!(account_id = %account.id, "Login succeeded");
        Ok(issued)
    }

    fn authenticate(&self, token: &str) -> AppResult<Claims> {
        self.tokens.validate(token)
    }
}
