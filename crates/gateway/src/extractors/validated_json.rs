//! Validated JSON extractor.

use axum::{
    async_trait,
    extract::{rejection::JsonRejection, FromRequest, Request},
    Json,
};
use serde::de::DeserializeOwned;
use validator::Validate;

use common::AppError;

/// Message returned when the body is not the expected JSON document.
pub(crate) const INVALID_REQUEST_BODY: &str = "Invalid Request Body";

/// JSON extractor that validates the payload after deserializing it.
///
/// An unparseable body is a `BadRequest`; a body that parses but breaks a
/// field rule is a `Validation` error carrying the first rule's message.
pub struct ValidatedJson<T>(pub T);

#[async_trait]
impl<S, T> FromRequest<S> for ValidatedJson<T>
where
    S: Send + Sync,
    T: DeserializeOwned + Validate,
    Json<T>: FromRequest<S, Rejection = JsonRejection>,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state).await.map_err(|e| {
            tracing::debug!(rejection = %e.body_text(), "Rejected request body");
            AppError::bad_request(INVALID_REQUEST_BODY)
        })?;

        value.validate().map_err(|e| {
            let mut fields: Vec<_> = e.field_errors().into_iter().collect();
            fields.sort_by_key(|(field, _)| *field);

            let message = fields
                .first()
                .and_then(|(_, errors)| errors.first())
                .and_then(|error| error.message.as_ref())
                .map(|msg| msg.to_string())
                .unwrap_or_else(|| "Validation failed".to_string());
            AppError::validation(message)
        })?;

        Ok(ValidatedJson(value))
    }
}
