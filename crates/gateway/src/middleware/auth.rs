//! Bearer token authentication middleware.

use axum::{
    body::Body,
    extract::State,
    http::Request,
    middleware::Next,
    response::Response,
};
use axum_extra::{
    headers::{authorization::Bearer, Authorization},
    TypedHeader,
};

use auth_service_lib::Claims;
use common::AppError;

use crate::state::AppState;

/// Authenticated caller, taken from a validated access token.
#[derive(Debug, Clone)]
pub struct CurrentAccount {
    pub id: String,
    pub email: String,
    pub roles: Vec<String>,
}

impl From<Claims> for CurrentAccount {
    fn from(claims: Claims) -> Self {
        Self {
            id: claims.sub,
            email: claims.email,
            roles: claims.role,
        }
    }
}

/// Reject requests without a valid `Authorization: Bearer` access token.
pub async fn auth_middleware(
    State(state): State<AppState>,
    bearer: Option<TypedHeader<Authorization<Bearer>>>,
    mut request: Request<Body>,
    next: Next,
) -> Result<Response, AppError> {
    let TypedHeader(Authorization(bearer)) = bearer.ok_or(AppError::Unauthorized)?;

    let claims = state.auth.authenticate(bearer.token())?;
    request.extensions_mut().insert(CurrentAccount::from(claims));

    Ok(next.run(request).await)
}
