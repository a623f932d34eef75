//! Request extractors: caller identity and validated bodies and paths.
//!
//! Authentication happens upstream. By the time a request reaches this
//! server the gateway has resolved the player and forwarded their id in the
//! [`USER_ID_HEADER`] header.

use axum::Json;
use axum::extract::{FromRequest, FromRequestParts, Path, Request};
use axum::http::request::Parts;
use serde::de::DeserializeOwned;
use validator::Validate;

use homestead_types::UserId;

use crate::error::ApiError;

/// Header carrying the authenticated player's id.
pub const USER_ID_HEADER: &str = "x-user-id";

/// The authenticated player making the request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CurrentUser(pub UserId);

impl<S: Send + Sync> FromRequestParts<S> for CurrentUser {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .headers
            .get(USER_ID_HEADER)
            .and_then(|value| value.to_str().ok())
            .and_then(|value| value.trim().parse::<i64>().ok())
            .filter(|id| *id > 0)
            .map(|id| Self(UserId::new(id)))
            .ok_or(ApiError::Unauthenticated)
    }
}

/// A JSON body that has been deserialized and passed its validation rules.
#[derive(Debug, Clone)]
pub struct ValidJson<T>(pub T);

impl<S, T> FromRequest<S> for ValidJson<T>
where
    S: Send + Sync,
    T: DeserializeOwned + Validate,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state)
            .await
            .map_err(|rejection| ApiError::InvalidRequest(rejection.body_text()))?;
        value
            .validate()
            .map_err(|errors| ApiError::InvalidRequest(errors.to_string()))?;
        Ok(Self(value))
    }
}

/// Path parameters that have been deserialized and validated.
#[derive(Debug, Clone)]
pub struct ValidPath<T>(pub T);

impl<S, T> FromRequestParts<S> for ValidPath<T>
where
    S: Send + Sync,
    T: DeserializeOwned + Validate + Send,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Path(value) = Path::<T>::from_request_parts(parts, state)
            .await
            .map_err(|rejection| ApiError::InvalidRequest(rejection.body_text()))?;
        value
            .validate()
            .map_err(|errors| ApiError::InvalidRequest(errors.to_string()))?;
        Ok(Self(value))
    }
}
