use axum::extract::FromRef;
use sea_orm::DatabaseConnection;

use datn_auth_types::token::TokenVerifier;

use crate::infra::db::{DbIdentityRepository, DbRatingRepository, DbVerificationCodeRepository};
use crate::infra::google::GoogleIdentityClient;
use crate::usecase::token::TokenIssuer;

/// Shared application state passed to every handler via axum `State`.
#[derive(Clone)]
pub struct AppState {
    pub db: DatabaseConnection,
    pub issuer: TokenIssuer,
    pub google: GoogleIdentityClient,
}

impl AppState {
    pub fn identity_repo(&self) -> DbIdentityRepository {
        DbIdentityRepository {
            db: self.db.clone(),
        }
    }

    pub fn verification_code_repo(&self) -> DbVerificationCodeRepository {
        DbVerificationCodeRepository {
            db: self.db.clone(),
        }
    }

    pub fn rating_repo(&self) -> DbRatingRepository {
        DbRatingRepository {
            db: self.db.clone(),
        }
    }
}

impl FromRef<AppState> for TokenVerifier {
    fn from_ref(state: &AppState) -> Self {
        state.issuer.verifier().clone()
    }
}

impl FromRef<AppState> for DatabaseConnection {
    fn from_ref(state: &AppState) -> Self {
        state.db.clone()
    }
}
