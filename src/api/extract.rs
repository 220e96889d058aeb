// Extractors - request bodies, queries and path ids whose rejections use the
// application error envelope

use axum::{
    extract::{FromRequest, FromRequestParts, Path, Query, Request},
    http::request::Parts,
    Json,
};
use serde::de::DeserializeOwned;

use crate::core::DocId;
use crate::error::AppError;

/// JSON body; malformed or unknown fields are a validation error
#[derive(Debug, Clone)]
pub struct ValidatedJson<T>(pub T);

impl<T, S> FromRequest<S> for ValidatedJson<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        match Json::<T>::from_request(req, state).await {
            Ok(Json(value)) => Ok(ValidatedJson(value)),
            Err(rejection) => Err(AppError::Validation {
                message: "Invalid request body".to_string(),
                details: vec![rejection.body_text()],
            }),
        }
    }
}

#[derive(Debug, Clone)]
pub struct ValidatedQuery<T>(pub T);

impl<T, S> FromRequestParts<S> for ValidatedQuery<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        match Query::<T>::from_request_parts(parts, state).await {
            Ok(Query(value)) => Ok(ValidatedQuery(value)),
            Err(rejection) => Err(AppError::Validation {
                message: "Invalid query parameters".to_string(),
                details: vec![rejection.body_text()],
            }),
        }
    }
}

/// `{id}` path segment parsed as a document id
#[derive(Debug, Clone, Copy)]
pub struct IdPath(pub DocId);

impl<S> FromRequestParts<S> for IdPath
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Path(raw) = Path::<String>::from_request_parts(parts, state)
            .await
            .map_err(|rejection| AppError::validation(rejection.body_text()))?;

        raw.parse::<DocId>()
            .ok()
            .filter(|id| id.is_valid())
            .map(IdPath)
            .ok_or_else(|| AppError::validation(format!("Invalid id '{}'", raw)))
    }
}
