use axum::{
    async_trait,
    extract::{FromRequest, Request},
    Json,
};
use serde::de::DeserializeOwned;
use uuid::Uuid;

use crate::error::{AppError, AppResult};

/// JSON body extractor whose rejections surface as `AppError::Validation`.
pub struct ApiJson<T>(pub T);

#[async_trait]
impl<S, T> FromRequest<S> for ApiJson<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state)
            .await
            .map_err(|rejection| AppError::Validation(rejection.body_text()))?;
        Ok(ApiJson(value))
    }
}

/// Unwrap a required field or fail with the given validation message.
pub fn require<T>(value: Option<T>, message: &str) -> AppResult<T> {
    value.ok_or_else(|| AppError::validation(message))
}

/// Parse a required identifier taken from a query string.
pub fn require_uuid(value: Option<&str>, message: &str) -> AppResult<Uuid> {
    let raw = value.map(str::trim).filter(|v| !v.is_empty());
    let raw = require(raw, message)?;
    Uuid::parse_str(raw).map_err(|_| AppError::validation(format!("{message}: not a valid id")))
}

/// Require a non-blank string field, returning it trimmed.
pub fn require_text(value: Option<String>, message: &str) -> AppResult<String> {
    let text = value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty());
    require(text, message)
}
