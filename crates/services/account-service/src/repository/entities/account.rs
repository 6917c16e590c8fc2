//! Account database entity for SeaORM.

use sea_orm::entity::prelude::*;

use domain::Account;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "accounts")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    #[sea_orm(unique)]
    pub email: String,
    pub name: String,
    pub password_digest: String,
    pub verified: bool,
    /// Role names as a JSON array of strings
    #[sea_orm(column_type = "JsonBinary")]
    pub roles: Json,
    pub created_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

/// Encode role names for the `roles` column
pub fn roles_to_json(roles: &[String]) -> Json {
    Json::Array(roles.iter().cloned().map(Json::String).collect())
}

/// Convert database model to domain entity
impl From<Model> for Account {
    fn from(model: Model) -> Self {
        let roles = model
            .roles
            .as_array()
            .map(|values| {
                values
                    .iter()
                    .filter_map(|v| v.as_str().map(str::to_string))
                    .collect()
            })
            .unwrap_or_default();

        Account {
            id: model.id,
            email: model.email,
            name: model.name,
            password_digest: model.password_digest,
            verified: model.verified,
            roles,
            created_at: model.created_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;

    use super::*;

    #[test]
    fn test_model_into_account() {
        let model = Model {
            id: "a1".to_string(),
            email: "a@x.com".to_string(),
            name: "Ann".to_string(),
            password_digest: "digest".to_string(),
            verified: true,
            roles: roles_to_json(&["user".to_string(), "admin".to_string()]),
            created_at: Utc::now(),
        };

        let account = Account::from(model);
        assert_eq!(account.roles, vec!["user".to_string(), "admin".to_string()]);
        assert!(account.verified);
    }

    #[test]
    fn test_non_array_roles_become_empty() {
        let model = Model {
            id: "a1".to_string(),
            email: "a@x.com".to_string(),
            name: "Ann".to_string(),
            password_digest: "digest".to_string(),
            verified: false,
            roles: Json::Null,
            created_at: Utc::now(),
        };

        assert!(Account::from(model).roles.is_empty());
    }
}
