//! Postgres-backed account store.

use async_trait::async_trait;
use chrono::Utc;
use sea_orm::{
    sea_query::Expr, ActiveModelTrait, ColumnTrait, Condition, DatabaseConnection, DbErr,
    EntityTrait, PaginatorTrait, QueryFilter, QueryOrder, Set, SqlErr,
};
use uuid::Uuid;

use super::account_store::{AccountFilter, AccountStore, AccountUpdate};
use super::entities::account::{self, roles_to_json, ActiveModel, Entity as AccountEntity};
use crate::infra::Database;
use common::{AppError, AppResult};
use domain::{Account, NewAccount};

/// Account store over the `accounts` table.
pub struct SeaAccountStore {
    db: Database,
}

impl SeaAccountStore {
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    fn conn(&self) -> DatabaseConnection {
        self.db.get_connection()
    }
}

fn condition(filter: &AccountFilter) -> Condition {
    Condition::all()
        .add_option(filter.id.clone().map(|id| account::Column::Id.eq(id)))
        .add_option(filter.email.clone().map(|email| account::Column::Email.eq(email)))
        .add_option(filter.verified.map(|v| account::Column::Verified.eq(v)))
}

/// Map a unique-index violation on write to `DuplicateEmail`.
fn map_write_err(err: DbErr, email: &str) -> AppError {
    match err.sql_err() {
        Some(SqlErr::UniqueConstraintViolation(_)) => AppError::duplicate_email(email),
        _ => AppError::from(err),
    }
}

#[async_trait]
impl AccountStore for SeaAccountStore {
    async fn find_one(&self, filter: &AccountFilter) -> AppResult<Option<Account>> {
        let result = AccountEntity::find()
            .filter(condition(filter))
            .order_by_asc(account::Column::CreatedAt)
            .one(&self.conn())
            .await?;

        Ok(result.map(Account::from))
    }

    async fn find_many(&self, filter: &AccountFilter) -> AppResult<Vec<Account>> {
        let models = AccountEntity::find()
            .filter(condition(filter))
            .order_by_asc(account::Column::CreatedAt)
            .order_by_asc(account::Column::Id)
            .all(&self.conn())
            .await?;

        Ok(models.into_iter().map(Account::from).collect())
    }

    async fn insert(&self, account: NewAccount) -> AppResult<Account> {
        let email = account.email.clone();
        let active_model = ActiveModel {
            id: Set(Uuid::new_v4().to_string()),
            email: Set(account.email),
            name: Set(account.name),
            password_digest: Set(account.password_digest),
            verified: Set(account.verified),
            roles: Set(roles_to_json(&account.roles)),
            created_at: Set(Utc::now()),
        };

        // The unique index on email is the arbiter for concurrent registrations.
        let model = active_model
            .insert(&self.conn())
            .await
            .map_err(|e| map_write_err(e, &email))?;

        tracing::debug!(account_id = %model.id, "Account inserted");
        Ok(Account::from(model))
    }

    async fn replace(&self, account: &Account) -> AppResult<bool> {
        let active_model = ActiveModel {
            id: Set(account.id.clone()),
            email: Set(account.email.clone()),
            name: Set(account.name.clone()),
            password_digest: Set(account.password_digest.clone()),
            verified: Set(account.verified),
            roles: Set(roles_to_json(&account.roles)),
            created_at: Set(account.created_at),
        };

        match active_model.update(&self.conn()).await {
            Ok(_) => Ok(true),
            Err(DbErr::RecordNotUpdated) => Ok(false),
            Err(e) => Err(map_write_err(e, &account.email)),
        }
    }

    async fn update(&self, filter: &AccountFilter, update: &AccountUpdate) -> AppResult<u64> {
        if update.is_empty() {
            let matched = AccountEntity::find()
                .filter(condition(filter))
                .count(&self.conn())
                .await?;
            return Ok(matched);
        }

        let mut query = AccountEntity::update_many().filter(condition(filter));
        if let Some(name) = &update.name {
            query = query.col_expr(account::Column::Name, Expr::value(name.clone()));
        }
        if let Some(verified) = update.verified {
            query = query.col_expr(account::Column::Verified, Expr::value(verified));
        }
        if let Some(roles) = &update.roles {
            query = query.col_expr(account::Column::Roles, Expr::value(roles_to_json(roles)));
        }

        let result = query.exec(&self.conn()).await?;
        Ok(result.rows_affected)
    }

    async fn delete(&self, filter: &AccountFilter) -> AppResult<u64> {
        let result = AccountEntity::delete_many()
            .filter(condition(filter))
            .exec(&self.conn())
            .await?;

        Ok(result.rows_affected)
    }

    async fn ping(&self) -> AppResult<()> {
        self.db.ping().await
    }
}
