use axum::{
    Json,
    extract::State,
    http::{HeaderMap, HeaderName, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
};
use axum_extra::extract::CookieJar;
use serde::{Deserialize, Serialize};

use datn_auth_types::{
    cookie::{clear_refresh_token_cookie, refresh_token_from, set_refresh_token_cookie},
    session::{MaybeSession, Session},
    token::SessionClaims,
};

use crate::error::AuthServiceError;
use crate::state::AppState;
use crate::usecase::token::{
    LoginInput, LoginUseCase, LogoutUseCase, RefreshTokenUseCase, SessionOutput,
};

pub const X_ACCESS_TOKEN_EXPIRES: &str = "x-access-token-expires";

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionResponse {
    pub access_token: String,
    pub user: SessionClaims,
}

/// Body, refresh cookie and expiry header shared by every flow that opens or
/// renews a session.
pub(crate) fn session_response(jar: CookieJar, out: SessionOutput, refresh_ttl: u64) -> Response {
    let jar = set_refresh_token_cookie(jar, out.tokens.refresh_token, refresh_ttl);

    let mut headers = HeaderMap::new();
    headers.insert(
        HeaderName::from_static(X_ACCESS_TOKEN_EXPIRES),
        HeaderValue::from(out.tokens.access_token_exp),
    );

    let body = SessionResponse {
        access_token: out.tokens.access_token,
        user: out.user,
    };
    (StatusCode::OK, jar, headers, Json(body)).into_response()
}

// ── POST /login ───────────────────────────────────────────────────────────────

#[derive(Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

pub async fn login(
    State(state): State<AppState>,
    jar: CookieJar,
    Json(body): Json<LoginRequest>,
) -> Result<Response, AuthServiceError> {
    let usecase = LoginUseCase {
        identities: state.identity_repo(),
        issuer: state.issuer.clone(),
    };

    let out = usecase
        .execute(LoginInput {
            username: body.username,
            password: body.password,
        })
        .await?;

    Ok(session_response(jar, out, state.issuer.refresh_ttl()))
}

// ── GET /account ──────────────────────────────────────────────────────────────

/// Claims of the current session, or `{}` without one. Served from the access
/// token alone.
pub async fn account(MaybeSession(session): MaybeSession) -> Response {
    match session {
        Some(claims) => Json(claims).into_response(),
        None => Json(serde_json::json!({})).into_response(),
    }
}

// ── GET /refresh ──────────────────────────────────────────────────────────────

pub async fn refresh(
    State(state): State<AppState>,
    jar: CookieJar,
) -> Result<Response, AuthServiceError> {
    let refresh_value = refresh_token_from(&jar).ok_or(AuthServiceError::InvalidRefreshToken)?;

    let usecase = RefreshTokenUseCase {
        identities: state.identity_repo(),
        issuer: state.issuer.clone(),
    };

    let out = usecase
        .execute(&refresh_value)
        .await
        .map_err(AuthServiceError::into_refresh_error)?;

    Ok(session_response(jar, out, state.issuer.refresh_ttl()))
}

// ── POST /logout ──────────────────────────────────────────────────────────────

pub async fn logout(
    State(state): State<AppState>,
    Session(session): Session,
    jar: CookieJar,
) -> Result<Response, AuthServiceError> {
    let usecase = LogoutUseCase {
        identities: state.identity_repo(),
    };
    usecase.execute(&session).await?;

    Ok(ended_session_response(jar))
}

/// 204 with the refresh cookie expired.
pub(crate) fn ended_session_response(jar: CookieJar) -> Response {
    (StatusCode::NO_CONTENT, clear_refresh_token_cookie(jar)).into_response()
}
