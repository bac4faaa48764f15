//! Request-scoped session extractors.
//!
//! The session is read from `Authorization: Bearer <access token>` on each
//! request and handed to the handler explicitly. There is no ambient
//! "current user".

use axum::extract::{FromRef, FromRequestParts};
use axum::response::{IntoResponse, Response};
use http::StatusCode;
use http::header::AUTHORIZATION;
use http::request::Parts;

use crate::token::{SessionClaims, TokenError, TokenVerifier};

/// Authenticated session. Rejects the request with 401 when absent or invalid.
#[derive(Debug, Clone)]
pub struct Session(pub SessionClaims);

/// Session if the request carries a valid access token, `None` otherwise.
#[derive(Debug, Clone)]
pub struct MaybeSession(pub Option<SessionClaims>);

/// Rejection for [`Session`]. Expired and invalid tokens are reported with
/// different kinds so clients can decide between refreshing and signing in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionRejection {
    MissingToken,
    InvalidToken,
    ExpiredToken,
}

impl SessionRejection {
    pub fn kind(&self) -> &'static str {
        match self {
            Self::MissingToken => "MISSING_TOKEN",
            Self::InvalidToken => "INVALID_TOKEN",
            Self::ExpiredToken => "EXPIRED_TOKEN",
        }
    }

    fn message(&self) -> &'static str {
        match self {
            Self::MissingToken => "missing access token",
            Self::InvalidToken => "invalid token",
            Self::ExpiredToken => "token expired",
        }
    }
}

impl From<TokenError> for SessionRejection {
    fn from(e: TokenError) -> Self {
        match e {
            TokenError::Expired => Self::ExpiredToken,
            TokenError::InvalidSignature | TokenError::Malformed => Self::InvalidToken,
        }
    }
}

impl IntoResponse for SessionRejection {
    fn into_response(self) -> Response {
        let body = serde_json::json!({
            "kind": self.kind(),
            "message": self.message(),
        });
        (StatusCode::UNAUTHORIZED, axum::Json(body)).into_response()
    }
}

fn bearer_token(parts: &Parts) -> Option<&str> {
    parts
        .headers
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|s| s.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|t| !t.is_empty())
}

fn authenticate<S>(parts: &Parts, state: &S) -> Result<SessionClaims, SessionRejection>
where
    TokenVerifier: FromRef<S>,
{
    let token = bearer_token(parts).ok_or(SessionRejection::MissingToken)?;
    let verifier = TokenVerifier::from_ref(state);
    Ok(verifier.verify_access(token)?)
}

impl<S> FromRequestParts<S> for Session
where
    TokenVerifier: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = SessionRejection;

    // Verification is synchronous; resolve it before building the future so the
    // returned future borrows nothing from `parts` or `state`.
    fn from_request_parts(
        parts: &mut Parts,
        state: &S,
    ) -> impl std::future::Future<Output = Result<Self, Self::Rejection>> + Send {
        let result = authenticate(parts, state).map(Session);
        async move { result }
    }
}

impl<S> FromRequestParts<S> for MaybeSession
where
    TokenVerifier: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = std::convert::Infallible;

    fn from_request_parts(
        parts: &mut Parts,
        state: &S,
    ) -> impl std::future::Future<Output = Result<Self, Self::Rejection>> + Send {
        let session = authenticate(parts, state).ok();
        async move { Ok(MaybeSession(session)) }
    }
}
