//! Auth Service Library
//!
//! Registration, email verification and login over an [`AccountStore`],
//! with HS256 bearer tokens issued by [`TokenService`].

pub mod notifier;
pub mod service;

use std::sync::Arc;

use account_service_lib::AccountStore;
use common::{AppResult, Config};

pub use crate::notifier::{MailNotifier, NoopNotifier, Notifier};
pub use crate::service::{AuthService, Authenticator, Claims, IssuedToken, TokenService};

/// Wire the authentication workflow from process configuration.
pub fn build_authenticator(
    config: &Config,
    store: Arc<dyn AccountStore>,
) -> AppResult<Authenticator> {
    let tokens = Arc::new(TokenService::new(&config.jwt)?);
    let mut authenticator = Authenticator::new(store, tokens, config.auth.clone());

    if config.mail.enabled {
        tracing::info!("Verification emails enabled");
        authenticator = authenticator.with_notifier(Arc::new(MailNotifier::new(config.mail.clone())));
    }

    tracing::info!(
        password_scheme = %config.auth.password_scheme,
        require_verification = config.auth.require_verification,
        strict_verification_tokens = config.auth.strict_verification_tokens,
        "Authenticator ready"
    );
    Ok(authenticator)
}
