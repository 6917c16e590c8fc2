//! Account store capability trait.
//!
//! The store is a document-style collection of [`Account`] records queried by
//! an [`AccountFilter`] predicate. Email uniqueness is enforced at insert:
//! a second account with the same email fails with `AppError::DuplicateEmail`.

use async_trait::async_trait;

use common::AppResult;
use domain::{Account, NewAccount};

#[cfg(any(test, feature = "test-utils"))]
use mockall::automock;

/// Predicate over accounts. Every field that is set must match; an empty
/// filter matches all accounts.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AccountFilter {
    pub id: Option<String>,
    pub email: Option<String>,
    pub verified: Option<bool>,
}

impl AccountFilter {
    /// Match every account
    pub fn all() -> Self {
        Self::default()
    }

    /// Match the account with this id
    pub fn by_id(id: impl Into<String>) -> Self {
        Self {
            id: Some(id.into()),
            ..Self::default()
        }
    }

    /// Match the account with this email
    pub fn by_email(email: impl Into<String>) -> Self {
        Self {
            email: Some(email.into()),
            ..Self::default()
        }
    }

    /// Additionally require the verified flag to have this value
    pub fn verified(mut self, verified: bool) -> Self {
        self.verified = Some(verified);
        self
    }

    /// Evaluate the predicate against an account.
    pub fn matches(&self, account: &Account) -> bool {
        self.id.as_deref().map_or(true, |id| account.id == id)
            && self.email.as_deref().map_or(true, |email| account.email == email)
            && self.verified.map_or(true, |verified| account.verified == verified)
    }
}

/// Partial update: only the fields that are set are written.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AccountUpdate {
    pub name: Option<String>,
    pub verified: Option<bool>,
    pub roles: Option<Vec<String>>,
}

impl AccountUpdate {
    /// Update that sets only the verified flag
    pub fn set_verified(verified: bool) -> Self {
        Self {
            verified: Some(verified),
            ..Self::default()
        }
    }

    /// True when the update writes nothing
    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.verified.is_none() && self.roles.is_none()
    }

    /// Apply the set fields to an account in place.
    pub fn apply(&self, account: &mut Account) {
        if let Some(name) = &self.name {
            account.name = name.clone();
        }
        if let Some(verified) = self.verified {
            account.verified = verified;
        }
        if let Some(roles) = &self.roles {
            account.roles = roles.clone();
        }
    }
}

/// Account persistence trait for dependency injection.
#[cfg_attr(any(test, feature = "test-utils"), automock)]
#[async_trait]
pub trait AccountStore: Send + Sync {
    /// First account matching the filter
    async fn find_one(&self, filter: &AccountFilter) -> AppResult<Option<Account>>;

    /// All accounts matching the filter, oldest first
    async fn find_many(&self, filter: &AccountFilter) -> AppResult<Vec<Account>>;

    /// Persist a new account and return it with its assigned id.
    ///
    /// Fails with `DuplicateEmail` if the email is already taken.
    async fn insert(&self, account: NewAccount) -> AppResult<Account>;

    /// Replace the stored record with the same id. Returns false if no record
    /// has that id.
    async fn replace(&self, account: &Account) -> AppResult<bool>;

    /// Apply a partial update to every matching account; returns the number
    /// of accounts matched.
    async fn update(&self, filter: &AccountFilter, update: &AccountUpdate) -> AppResult<u64>;

    /// Delete every matching account; returns the number deleted.
    async fn delete(&self, filter: &AccountFilter) -> AppResult<u64>;

    /// Check the backing store is reachable
    async fn ping(&self) -> AppResult<()>;
}
