//! # Request Extractors
//!
//! [`ValidatedJson`] parses a JSON body and runs the type's [`Validate`]
//! rules before the handler sees it. Both failures surface as
//! [`AppError`], so every rejected request still carries the negative
//! `verified`/`privileged` flags.

use axum::extract::rejection::JsonRejection;
use axum::extract::{FromRequest, Request};
use axum::Json;

use crate::error::AppError;

/// Request types that check rules serde cannot express.
pub trait Validate {
    /// Returns an error message on failure.
    fn validate(&self) -> Result<(), String>;
}

/// JSON body that passed [`Validate`].
///
/// Malformed or incomplete JSON is a 400 `BAD_REQUEST`; a body that parses
/// but breaks a validation rule is a 422 `VALIDATION_ERROR`.
#[derive(Debug)]
pub struct ValidatedJson<T>(pub T);

#[axum::async_trait]
impl<S, T> FromRequest<S> for ValidatedJson<T>
where
    T: Validate,
    Json<T>: FromRequest<S, Rejection = JsonRejection>,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state)
            .await
            .map_err(|rejection| AppError::BadRequest(rejection.body_text()))?;
        value.validate().map_err(AppError::Validation)?;
        Ok(Self(value))
    }
}
