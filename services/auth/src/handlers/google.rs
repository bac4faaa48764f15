use axum::{Json, extract::State, response::Response};
use axum_extra::extract::CookieJar;
use serde::Deserialize;

use crate::error::AuthServiceError;
use crate::handlers::session::session_response;
use crate::state::AppState;
use crate::usecase::google::{GoogleLoginInput, GoogleLoginUseCase};

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GoogleLoginRequest {
    pub access_token: String,
}

// ── POST /google ──────────────────────────────────────────────────────────────

pub async fn google_login(
    State(state): State<AppState>,
    jar: CookieJar,
    Json(body): Json<GoogleLoginRequest>,
) -> Result<Response, AuthServiceError> {
    let usecase = GoogleLoginUseCase {
        identities: state.identity_repo(),
        provider: state.google.clone(),
        issuer: state.issuer.clone(),
    };

    let out = usecase
        .execute(GoogleLoginInput {
            access_token: body.access_token,
        })
        .await?;

    Ok(session_response(jar, out, state.issuer.refresh_ttl()))
}
