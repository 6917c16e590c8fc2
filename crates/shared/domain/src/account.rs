//! Account domain entity and related types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::constants::ROLE_USER;

/// Account domain entity
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Account {
    /// Store-assigned opaque identifier
    pub id: String,
    pub email: String,
    pub name: String,
    #[serde(skip_serializing)]
    pub password_digest: String,
    pub verified: bool,
    pub roles: Vec<String>,
    pub created_at: DateTime<Utc>,
}

impl Account {
    /// Check if the account carries a role
    pub fn has_role(&self, role: &str) -> bool {
        self.roles.iter().any(|r| r == role)
    }

    /// Build the record persisted on registration, with the default role set.
    pub fn register(email: String, name: String, password_digest: String, verified: bool) -> NewAccount {
        NewAccount {
            email,
            name,
            password_digest,
            verified,
            roles: vec![ROLE_USER.to_string()],
        }
    }
}

/// Account creation payload; the store assigns `id` and `created_at`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewAccount {
    pub email: String,
    pub name: String,
    pub password_digest: String,
    pub verified: bool,
    pub roles: Vec<String>,
}

impl NewAccount {
    /// Materialize the account under a store-assigned id.
    pub fn into_account(self, id: String, created_at: DateTime<Utc>) -> Account {
        Account {
            id,
            email: self.email,
            name: self.name,
            password_digest: self.password_digest,
            verified: self.verified,
            roles: self.roles,
            created_at,
        }
    }
}

/// Account view (safe to return to client)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct AccountView {
    /// Unique account identifier
    pub id: String,
    /// Account email address
    pub email: String,
    /// Display name
    pub name: String,
    /// Whether the email address has been confirmed
    pub verified: bool,
    /// Role names granted to the account
    pub roles: Vec<String>,
}

impl From<&Account> for AccountView {
    fn from(account: &Account) -> Self {
        Self {
            id: account.id.clone(),
            email: account.email.clone(),
            name: account.name.clone(),
            verified: account.verified,
            roles: account.roles.clone(),
        }
    }
}

impl From<Account> for AccountView {
    fn from(account: Account) -> Self {
        Self {
            id: account.id,
            email: account.email,
            name: account.name,
            verified: account.verified,
            roles: account.roles,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_register_assigns_default_role() {
        let new = Account::register(
            "a@x.com".to_string(),
            "Ann".to_string(),
            "digest".to_string(),
            true,
        );

        assert_eq!(new.roles, vec![ROLE_USER.to_string()]);
        assert!(new.verified);

        let account = new.into_account("id-1".to_string(), Utc::now());
        assert_eq!(account.id, "id-1");
        assert!(account.has_role(ROLE_USER));
        assert!(!account.has_role("admin"));
    }

    #[test]
    fn test_serialized_account_hides_digest() {
        let account = Account::register(
            "a@x.com".to_string(),
            "Ann".to_string(),
            "secret-digest".to_string(),
            false,
        )
        .into_account("id-1".to_string(), Utc::now());

        let json = serde_json::to_string(&account).unwrap();
        assert!(!json.contains("secret-digest"));
        assert!(json.contains("\"verified\":false"));
    }
}
