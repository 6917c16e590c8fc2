//! Authentication handlers.

use axum::{
    extract::{Extension, Path, State},
    middleware,
    response::Json,
    routing::{get, post},
    Router,
};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use account_service_lib::AccountFilter;
use auth_service_lib::IssuedToken;
use common::{AppError, AppResult};
use domain::AccountView;

use crate::extractors::ValidatedJson;
use crate::extractors::INVALID_REQUEST_BODY;
use crate::middleware::{auth_middleware, CurrentAccount};
use crate::state::AppState;

/// Account registration request
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct RegisterRequest {
    /// Account email address
    #[validate(length(min = 1, message = "Email is required"))]
    #[schema(example = "reader@example.com")]
    pub email: String,
    /// Display name
    #[validate(length(min = 1, max = 100, message = "Name must be between 1 and 100 characters"))]
    #[schema(example = "Ann Reader", max_length = 100)]
    pub name: String,
    /// Account password
    #[validate(length(min = 6, max = 100, message = "Password must be between 6 and 100 characters"))]
    #[schema(example = "secret1", min_length = 6, max_length = 100)]
    pub password: String,
}

/// Login request
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct LoginRequest {
    #[validate(length(min = 1, message = "Email is required"))]
    #[schema(example = "reader@example.com")]
    pub email: String,
    #[validate(length(min = 6, max = 100, message = "Password must be between 6 and 100 characters"))]
    #[schema(example = "secret1", min_length = 6, max_length = 100)]
    pub password: String,
}

/// Plain confirmation message
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Access token returned by a successful login
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct TokenResponse {
    /// Signed JWT
    #[serde(rename = "Token")]
    pub token: String,
    /// Always "Bearer"
    pub token_type: String,
    /// Lifetime in seconds
    pub expires_in: i64,
}

impl From<IssuedToken> for TokenResponse {
    fn from(issued: IssuedToken) -> Self {
        Self {
            token: issued.token,
            token_type: issued.token_type,
            expires_in: issued.expires_in,
        }
    }
}

/// Create authentication routes
pub fn auth_routes(state: AppState) -> Router<AppState> {
    let protected = Router::new()
        .route("/me", get(current_account))
        .route_layer(middleware::from_fn_with_state(state, auth_middleware));

    Router::new()
        .route("/register", post(register))
        .route("/verify/:token", get(verify))
        .route("/login", post(login))
        .merge(protected)
}

/// Register a new account
#[utoipa::path(
    post,
    path = "/api/v1/auth/register",
    tag = "Authentication",
    request_body = RegisterRequest,
    responses(
        (status = 200, description = "Account created", body = MessageResponse),
        (status = 400, description = "Email taken or validation error")
    )
)]
pub async fn register(
    State(state): State<AppState>,
    ValidatedJson(payload): ValidatedJson<RegisterRequest>,
) -> AppResult<Json<MessageResponse>> {
    state
        .auth
        .register(payload.email, payload.name, payload.password)
        .await?;

    Ok(Json(MessageResponse::new("User account created")))
}

/// Confirm an account's email address
#[utoipa::path(
    get,
    path = "/api/v1/auth/verify/{token}",
    tag = "Authentication",
    params(
        ("token" = String, Path, description = "Verification token")
    ),
    responses(
        (status = 200, description = "Email verified", body = MessageResponse),
        (status = 400, description = "Malformed token or account not found")
    )
)]
pub async fn verify(
    State(state): State<AppState>,
    Path(token): Path<String>,
) -> AppResult<Json<MessageResponse>> {
    state.auth.verify(&token).await?;
    Ok(Json(MessageResponse::new("Email verified")))
}

/// Log in and receive an access token
#[utoipa::path(
    post,
    path = "/api/v1/auth/login",
    tag = "Authentication",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Login successful", body = TokenResponse),
        (status = 400, description = "Invalid request body"),
        (status = 401, description = "Invalid credentials"),
        (status = 403, description = "Email not verified")
    )
)]
pub async fn login(
    State(state): State<AppState>,
    payload: Result<ValidatedJson<LoginRequest>, AppError>,
) -> AppResult<Json<TokenResponse>> {
    let ValidatedJson(payload) = payload.map_err(|_| AppError::bad_request(INVALID_REQUEST_BODY))?;

    let issued = state.auth.login(payload.email, payload.password).await?;
    Ok(Json(TokenResponse::from(issued)))
}

/// Profile of the authenticated account
#[utoipa::path(
    get,
    path = "/api/v1/auth/me",
    tag = "Authentication",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Current account", body = AccountView),
        (status = 401, description = "Missing or invalid access token")
    )
)]
pub async fn current_account(
    Extension(current): Extension<CurrentAccount>,
    State(state): State<AppState>,
) -> AppResult<Json<AccountView>> {
    // A valid token for a since-deleted account authenticates nobody.
    let account = state
        .store
        .find_one(&AccountFilter::by_id(current.id))
        .await?
        .ok_or(AppError::Unauthorized)?;

    Ok(Json(AccountView::from(account)))
}

#[cfg(test)]
mod tests {
    use domain::{MAX_NAME_LENGTH, MAX_PASSWORD_LENGTH, MIN_PASSWORD_LENGTH};

    use super::*;

    fn register_request(name: &str, password: &str) -> RegisterRequest {
        RegisterRequest {
            email: "a@x.com".to_string(),
            name: name.to_string(),
            password: password.to_string(),
        }
    }

    #[test]
    fn test_password_length_bounds() {
        let min = "p".repeat(MIN_PASSWORD_LENGTH as usize);
        let max = "p".repeat(MAX_PASSWORD_LENGTH as usize);

        assert!(register_request("Ann", &min).validate().is_ok());
        assert!(register_request("Ann", &max).validate().is_ok());
        assert!(register_request("Ann", &min[1..]).validate().is_err());
        assert!(register_request("Ann", &format!("{}p", max)).validate().is_err());
    }

    #[test]
    fn test_name_length_bounds() {
        let longest = "n".repeat(MAX_NAME_LENGTH as usize);

        assert!(register_request(&longest, "secret1").validate().is_ok());
        assert!(register_request(&format!("{}n", longest), "secret1")
            .validate()
            .is_err());
        assert!(register_request("", "secret1").validate().is_err());
    }

    #[test]
    fn test_email_is_required_but_not_format_checked() {
        let mut request = register_request("Ann", "secret1");
        request.email = "not-an-email".to_string();
        assert!(request.validate().is_ok());

        request.email = String::new();
        assert!(request.validate().is_err());
    }

    #[test]
    fn test_login_request_rules() {
        let login = |email: &str, password: &str| LoginRequest {
            email: email.to_string(),
            password: password.to_string(),
        };

        assert!(login("plain-name", "secret1").validate().is_ok());
        assert!(login("", "secret1").validate().is_err());
        assert!(login("a@x.com", "short").validate().is_err());
        assert!(login("a@x.com", &"p".repeat(101)).validate().is_err());
    }

    #[test]
    fn test_token_response_field_names() {
        let response = TokenResponse::from(IssuedToken {
            token: "abc".to_string(),
            token_type: "Bearer".to_string(),
            expires_in: 3600,
        });

        let json = serde_json::to_value(&response).unwrap();
        assert_eq!(json["Token"], "abc");
        assert_eq!(json["token_type"], "Bearer");
        assert_eq!(json["expires_in"], 3600);
    }
}
