//! Mock session helpers for integration tests.
//!
//! Handlers read the session from an `Authorization: Bearer` access token.
//! `MockSession` signs such a token directly so tests need no login round trip.

use std::time::{SystemTime, UNIX_EPOCH};

use axum::http::{HeaderMap, HeaderValue, header::AUTHORIZATION};
use jsonwebtoken::{EncodingKey, Header, encode};
use uuid::Uuid;

use datn_auth_types::token::{AccessClaims, SessionClaims};
use datn_domain::user::UserRole;

/// Configurable session minted into test requests.
pub struct MockSession {
    pub claims: SessionClaims,
}

impl MockSession {
    pub fn new(id: Uuid, email: &str, role: UserRole) -> Self {
        Self {
            claims: SessionClaims {
                id,
                email: email.to_owned(),
                name: "Test User".to_owned(),
                role,
            },
        }
    }

    pub fn user() -> Self {
        Self::new(Uuid::new_v4(), "user@example.com", UserRole::User)
    }

    pub fn admin() -> Self {
        Self::new(Uuid::new_v4(), "admin@example.com", UserRole::Admin)
    }

    /// Access token valid for one hour, signed with `secret`.
    pub fn token(&self, secret: &str) -> String {
        self.token_expiring_at(secret, now_secs() + 3600)
    }

    /// Access token with an explicit `exp` (use a past value for expiry tests).
    pub fn token_expiring_at(&self, secret: &str, exp: u64) -> String {
        let claims = AccessClaims {
            sub: self.claims.id.to_string(),
            user: self.claims.clone(),
            iat: now_secs(),
            exp,
        };
        encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(secret.as_bytes()),
        )
        .expect("sign test access token")
    }

    /// `Authorization: Bearer <token>` header value.
    pub fn bearer(&self, secret: &str) -> HeaderValue {
        HeaderValue::from_str(&format!("Bearer {}", self.token(secret)))
            .expect("bearer header value")
    }

    /// Header map carrying only the `Authorization` header.
    pub fn headers(&self, secret: &str) -> HeaderMap {
        let mut map = HeaderMap::new();
        map.insert(AUTHORIZATION, self.bearer(secret));
        map
    }
}

fn now_secs() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or_default()
}
