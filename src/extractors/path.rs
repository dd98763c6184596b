//! Path extractor whose rejection is an envelope instead of axum's plain-text body.

use crate::extractors::ValidationErrors;
use crate::handlers::envelope_response;
use crate::state::AppState;
use async_trait::async_trait;
use axum::{
    extract::{path::ErrorKind, rejection::PathRejection, FromRequestParts, Path},
    http::request::Parts,
    response::Response,
};
use serde::de::DeserializeOwned;

/// Like `Path<T>`, but malformed segments produce a `400` with `errorCode = "3"`.
#[derive(Clone, Debug)]
pub struct ValidatedPath<T>(pub T);

#[async_trait]
impl<T> FromRequestParts<AppState> for ValidatedPath<T>
where
    T: DeserializeOwned + Send,
{
    type Rejection = Response;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        match Path::<T>::from_request_parts(parts, state).await {
            Ok(Path(value)) => Ok(ValidatedPath(value)),
            Err(rejection) => {
                tracing::debug!(error = %rejection.body_text(), "path rejected");
                let mut errors = ValidationErrors::default();
                errors.add(rejection_field(&rejection), rejection.body_text());
                Err(envelope_response(errors.into_envelope(&state.settings)))
            }
        }
    }
}

fn rejection_field(rejection: &PathRejection) -> String {
    match rejection {
        PathRejection::FailedToDeserializePathParams(e) => match e.kind() {
            ErrorKind::ParseErrorAtKey { key, .. } | ErrorKind::InvalidUtf8InPathParam { key } => key.clone(),
            _ => "path".into(),
        },
        _ => "path".into(),
    }
}
