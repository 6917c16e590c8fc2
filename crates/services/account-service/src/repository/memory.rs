//! In-process account store.
//!
//! Used for local runs and tests. Contents are lost when the process exits.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;
use uuid::Uuid;

use common::{AppError, AppResult};
use domain::{Account, NewAccount};

use super::account_store::{AccountFilter, AccountStore, AccountUpdate};

/// Account store backed by a map keyed on account id.
#[derive(Default)]
pub struct MemoryAccountStore {
    accounts: RwLock<HashMap<String, Account>>,
}

impl MemoryAccountStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored accounts
    pub async fn len(&self) -> usize {
        self.accounts.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.accounts.read().await.is_empty()
    }
}

fn email_taken(accounts: &HashMap<String, Account>, email: &str, except_id: Option<&str>) -> bool {
    accounts
        .values()
        .any(|a| a.email == email && Some(a.id.as_str()) != except_id)
}

#[async_trait]
impl AccountStore for MemoryAccountStore {
    async fn find_one(&self, filter: &AccountFilter) -> AppResult<Option<Account>> {
        Ok(self.find_many(filter).await?.into_iter().next())
    }

    async fn find_many(&self, filter: &AccountFilter) -> AppResult<Vec<Account>> {
        let accounts = self.accounts.read().await;
        let mut found: Vec<Account> = accounts
            .values()
            .filter(|a| filter.matches(a))
            .cloned()
            .collect();
        found.sort_by(|a, b| a.created_at.cmp(&b.created_at).then_with(|| a.id.cmp(&b.id)));
        Ok(found)
    }

    async fn insert(&self, account: NewAccount) -> AppResult<Account> {
        // Check and insert under one write lock so concurrent registrations
        // for the same email cannot both succeed.
        let mut accounts = self.accounts.write().await;
        if email_taken(&accounts, &account.email, None) {
            return Err(AppError::duplicate_email(account.email));
        }

        let account = account.into_account(Uuid::new_v4().to_string(), Utc::now());
        accounts.insert(account.id.clone(), account.clone());
        Ok(account)
    }

    async fn replace(&self, account: &Account) -> AppResult<bool> {
        let mut accounts = self.accounts.write().await;
        if !accounts.contains_key(&account.id) {
            return Ok(false);
        }
        if email_taken(&accounts, &account.email, Some(&account.id)) {
            return Err(AppError::duplicate_email(account.email.clone()));
        }

        accounts.insert(account.id.clone(), account.clone());
        Ok(true)
    }

    async fn update(&self, filter: &AccountFilter, update: &AccountUpdate) -> AppResult<u64> {
        let mut accounts = self.accounts.write().await;
        let mut matched = 0;
        for account in accounts.values_mut().filter(|a| filter.matches(a)) {
            update.apply(account);
            matched += 1;
        }
        Ok(matched)
    }

    async fn delete(&self, filter: &AccountFilter) -> AppResult<u64> {
        let mut accounts = self.accounts.write().await;
        let before = accounts.len();
        accounts.retain(|_, a| !filter.matches(a));
        Ok((before - accounts.len()) as u64)
    }

    async fn ping(&self) -> AppResult<()> {
        Ok(())
    }
}
