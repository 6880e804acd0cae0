//! Bearer API key extraction.
//!
//! Members authenticate with the API key issued at registration, sent as
//! `Authorization: Bearer <key>`.

use std::convert::Infallible;

use axum::extract::FromRequestParts;
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;

use beanhouse_core::ApiKey;

use crate::error::AppError;

fn bearer_key(parts: &Parts) -> Option<ApiKey> {
    parts
        .headers
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .map(|key| ApiKey::from(key.trim()))
}

/// Extracts the bearer API key if one was sent. Never rejects.
#[derive(Debug)]
pub struct MaybeApiKey(pub Option<ApiKey>);

impl<S> FromRequestParts<S> for MaybeApiKey
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(Self(bearer_key(parts)))
    }
}

/// Extracts the bearer API key, rejecting the request without one.
///
/// The key is only syntactically required here; resolving it to a member
/// is the service layer's job.
#[derive(Debug)]
pub struct RequireApiKey(pub ApiKey);

impl<S> FromRequestParts<S> for RequireApiKey
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        bearer_key(parts).map(Self).ok_or_else(|| {
            AppError::Unauthorized("missing Authorization: Bearer API key".to_owned())
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::Request;

    fn parts_with_auth(value: Option<&str>) -> Parts {
        let mut builder = Request::builder().uri("/orders");
        if let Some(value) = value {
            builder = builder.header(AUTHORIZATION, value);
        }
        let (parts, ()) = builder.body(()).expect("request").into_parts();
        parts
    }

    #[test]
    fn extracts_bearer_token() {
        let parts = parts_with_auth(Some("Bearer abc-123"));
        assert_eq!(bearer_key(&parts), Some(ApiKey::from("abc-123")));
    }

    #[test]
    fn ignores_other_schemes_and_absence() {
        assert_eq!(bearer_key(&parts_with_auth(Some("Basic abc"))), None);
        assert_eq!(bearer_key(&parts_with_auth(None)), None);
    }
}
