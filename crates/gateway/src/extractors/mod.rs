//! Custom request extractors.

mod validated_json;

pub(crate) use validated_json::INVALID_REQUEST_BODY;
pub use validated_json::ValidatedJson;
