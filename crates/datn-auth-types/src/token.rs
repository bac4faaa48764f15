//! JWT claims and validation for access and refresh tokens.

use datn_domain::user::UserRole;
use jsonwebtoken::{Algorithm, DecodingKey, Validation, decode};
use serde::Deserialize;
#[cfg(any(feature = "USE_ONLY_IN_AUTH_SERVICE", test))]
use serde::Serialize;
use uuid::Uuid;

/// Errors returned by [`TokenVerifier`].
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum TokenError {
    #[error("invalid signature")]
    InvalidSignature,
    #[error("token expired")]
    Expired,
    #[error("malformed token")]
    Malformed,
}

/// Session payload embedded in every access token.
///
/// Downstream handlers authorize from this alone, without a store lookup.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, Deserialize)]
pub struct SessionClaims {
    pub id: Uuid,
    pub email: String,
    pub name: String,
    pub role: UserRole,
}

/// Access-token JWT claims.
///
/// | Field | JWT claim | Meaning |
/// |-------|-----------|---------|
/// | `sub` | `sub` | user ID (UUID string) |
/// | `user` | custom | [`SessionClaims`] |
/// | `iat` | `iat` | issued at, seconds since epoch |
/// | `exp` | `exp` | expiration, seconds since epoch |
///
/// [`Serialize`] requires the **`USE_ONLY_IN_AUTH_SERVICE`** feature: only the
/// auth service mints tokens.
#[derive(Debug, Deserialize)]
#[cfg_attr(any(feature = "USE_ONLY_IN_AUTH_SERVICE", test), derive(Serialize))]
pub struct AccessClaims {
    pub sub: String,
    pub user: SessionClaims,
    pub iat: u64,
    pub exp: u64,
}

/// Refresh-token JWT claims: subject, a unique token id and timestamps only.
#[derive(Debug, Deserialize)]
#[cfg_attr(any(feature = "USE_ONLY_IN_AUTH_SERVICE", test), derive(Serialize))]
pub struct RefreshClaims {
    pub sub: String,
    /// Random per-token id. Two refresh tokens minted in the same second differ.
    pub jti: String,
    pub iat: u64,
    pub exp: u64,
}

/// Read-only HS256 verification key, shared process-wide.
#[derive(Clone)]
pub struct TokenVerifier {
    key: DecodingKey,
    validation: Validation,
}

impl TokenVerifier {
    /// Validation: HS256, `exp` checked, required claims `exp` + `sub`.
    /// Default leeway of 60s tolerates clock skew.
    pub fn new(secret: &str) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = true;
        validation.required_spec_claims.clear();
        validation.set_required_spec_claims(&["exp", "sub"]);
        Self {
            key: DecodingKey::from_secret(secret.as_bytes()),
            validation,
        }
    }

    fn decode<T: serde::de::DeserializeOwned>(&self, token: &str) -> Result<T, TokenError> {
        let data = decode::<T>(token, &self.key, &self.validation).map_err(|e| match e.kind() {
            jsonwebtoken::errors::ErrorKind::ExpiredSignature => TokenError::Expired,
            jsonwebtoken::errors::ErrorKind::InvalidSignature
            | jsonwebtoken::errors::ErrorKind::InvalidAlgorithm => TokenError::InvalidSignature,
            _ => TokenError::Malformed,
        })?;
        Ok(data.claims)
    }

    /// Validate an access token and return the embedded session.
    ///
    /// A refresh token is rejected as [`TokenError::Malformed`]: it has no `user` claim.
    pub fn verify_access(&self, token: &str) -> Result<SessionClaims, TokenError> {
        let claims: AccessClaims = self.decode(token)?;
        let sub = claims
            .sub
            .parse::<Uuid>()
            .map_err(|_| TokenError::Malformed)?;
        if sub != claims.user.id {
            return Err(TokenError::Malformed);
        }
        Ok(claims.user)
    }

    /// Validate a refresh token's signature and expiry, returning its raw claims.
    ///
    /// This does not consult the store; callers must still compare the token
    /// against the value stored for the subject.
    #[cfg(any(feature = "USE_ONLY_IN_AUTH_SERVICE", test))]
    pub fn verify_refresh(&self, token: &str) -> Result<RefreshClaims, TokenError> {
        self.decode(token)
    }
}
