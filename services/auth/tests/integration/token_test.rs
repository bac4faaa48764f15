use std::time::{SystemTime, UNIX_EPOCH};

use jsonwebtoken::{EncodingKey, Header, encode};

use datn_auth::error::AuthServiceError;
use datn_auth::usecase::token::{
    LoginInput, LoginUseCase, LogoutUseCase, RefreshTokenUseCase, TokenIssuer,
};
use datn_auth_types::token::RefreshClaims;
use datn_domain::user::UserRole;
use datn_testing::auth::MockSession;

use crate::helpers::{
    MockIdentityRepo, TEST_JWT_SECRET, TEST_PASSWORD, disabled_identity, test_identity,
    test_issuer,
};

fn now_secs() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap()
        .as_secs()
}

fn login_usecase(repo: &MockIdentityRepo) -> LoginUseCase<MockIdentityRepo> {
    LoginUseCase {
        identities: repo.clone(),
        issuer: test_issuer(),
    }
}

fn refresh_usecase(repo: &MockIdentityRepo) -> RefreshTokenUseCase<MockIdentityRepo> {
    RefreshTokenUseCase {
        identities: repo.clone(),
        issuer: test_issuer(),
    }
}

fn credentials(username: &str) -> LoginInput {
    LoginInput {
        username: username.to_owned(),
        password: TEST_PASSWORD.to_owned(),
    }
}

// ── TokenIssuer ──────────────────────────────────────────────────────────────

#[test]
fn should_round_trip_session_claims_through_access_token() {
    let identity = test_identity("a@x.com");
    let issuer = test_issuer();

    let pair = issuer.issue_tokens(&identity).unwrap();
    let claims = issuer.validate_access_token(&pair.access_token).unwrap();

    assert_eq!(claims, identity.session_claims());
    assert!(pair.access_token_exp < pair.refresh_token_exp);
    assert_eq!(
        issuer.validate_refresh_token(&pair.refresh_token).unwrap(),
        identity.id
    );
}

#[test]
fn should_refuse_to_issue_for_disabled_identity() {
    let identity = disabled_identity("a@x.com");
    let result = test_issuer().issue_tokens(&identity);
    assert!(
        matches!(result, Err(AuthServiceError::AccountDisabled)),
        "expected AccountDisabled, got {result:?}"
    );
}

#[test]
fn should_issue_distinct_refresh_tokens_within_the_same_second() {
    let identity = test_identity("a@x.com");
    let issuer = test_issuer();
    let first = issuer.issue_tokens(&identity).unwrap();
    let second = issuer.issue_tokens(&identity).unwrap();
    assert_ne!(first.refresh_token, second.refresh_token);
}

#[test]
fn should_not_accept_one_token_kind_as_the_other() {
    let identity = test_identity("a@x.com");
    let issuer = test_issuer();
    let pair = issuer.issue_tokens(&identity).unwrap();

    assert!(matches!(
        issuer.validate_access_token(&pair.refresh_token),
        Err(AuthServiceError::InvalidToken)
    ));
    assert!(matches!(
        issuer.validate_refresh_token(&pair.access_token),
        Err(AuthServiceError::InvalidToken)
    ));
}

#[test]
fn should_distinguish_expired_from_invalid_access_tokens() {
    let issuer = test_issuer();
    let session = MockSession::user();

    let expired = session.token_expiring_at(TEST_JWT_SECRET, now_secs() - 3600);
    assert!(matches!(
        issuer.validate_access_token(&expired),
        Err(AuthServiceError::ExpiredToken)
    ));

    let foreign = session.token("another-secret");
    assert!(matches!(
        issuer.validate_access_token(&foreign),
        Err(AuthServiceError::InvalidToken)
    ));
    assert!(matches!(
        issuer.validate_access_token("not-a-jwt"),
        Err(AuthServiceError::InvalidToken)
    ));
}

#[test]
fn should_revoke_refresh_token_that_differs_from_stored_value() {
    let mut identity = test_identity("a@x.com");
    let issuer = test_issuer();
    let pair = issuer.issue_tokens(&identity).unwrap();

    assert!(matches!(
        TokenIssuer::check_refresh_token(&identity, &pair.refresh_token),
        Err(AuthServiceError::RevokedToken)
    ));

    identity.refresh_token = Some(pair.refresh_token.clone());
    assert!(TokenIssuer::check_refresh_token(&identity, &pair.refresh_token).is_ok());
}

// ── LoginUseCase ─────────────────────────────────────────────────────────────

#[tokio::test]
async fn should_login_and_store_refresh_token() {
    let identity = test_identity("a@x.com");
    let repo = MockIdentityRepo::new(vec![identity.clone()]);

    let out = login_usecase(&repo)
        .execute(credentials("  A@X.com "))
        .await
        .unwrap();

    assert_eq!(out.user.id, identity.id);
    assert_eq!(out.user.role, UserRole::User);
    assert_eq!(
        repo.stored_refresh_token(identity.id).as_deref(),
        Some(out.tokens.refresh_token.as_str())
    );
}

#[tokio::test]
async fn should_reject_unknown_email_and_wrong_password_alike() {
    let repo = MockIdentityRepo::new(vec![test_identity("a@x.com")]);

    let unknown = login_usecase(&repo)
        .execute(credentials("b@x.com"))
        .await;
    assert!(matches!(unknown, Err(AuthServiceError::InvalidCredentials)));

    let wrong = login_usecase(&repo)
        .execute(LoginInput {
            username: "a@x.com".to_owned(),
            password: "not-the-password".to_owned(),
        })
        .await;
    assert!(matches!(wrong, Err(AuthServiceError::InvalidCredentials)));
}

#[tokio::test]
async fn should_not_open_session_for_disabled_identity() {
    let identity = disabled_identity("a@x.com");
    let repo = MockIdentityRepo::new(vec![identity.clone()]);

    let result = login_usecase(&repo).execute(credentials("a@x.com")).await;

    assert!(matches!(result, Err(AuthServiceError::AccountDisabled)));
    assert_eq!(repo.stored_refresh_token(identity.id), None);
}

#[tokio::test]
async fn should_invalidate_previous_session_on_new_login() {
    let identity = test_identity("a@x.com");
    let repo = MockIdentityRepo::new(vec![identity.clone()]);

    let first = login_usecase(&repo).execute(credentials("a@x.com")).await.unwrap();
    let _second = login_usecase(&repo).execute(credentials("a@x.com")).await.unwrap();

    let result = refresh_usecase(&repo)
        .execute(&first.tokens.refresh_token)
        .await;
    assert!(matches!(result, Err(AuthServiceError::RevokedToken)));
}

// ── RefreshTokenUseCase ──────────────────────────────────────────────────────

#[tokio::test]
async fn should_rotate_refresh_token_and_reject_the_old_one() {
    let identity = test_identity("a@x.com");
    let repo = MockIdentityRepo::new(vec![identity.clone()]);
    let login = login_usecase(&repo).execute(credentials("a@x.com")).await.unwrap();
    let refresh = refresh_usecase(&repo);

    // Old token → new pair.
    let rotated = refresh.execute(&login.tokens.refresh_token).await.unwrap();
    assert_eq!(rotated.user, identity.session_claims());
    assert_ne!(rotated.tokens.refresh_token, login.tokens.refresh_token);

    // Old token is now revoked even though it has not expired.
    let replay = refresh.execute(&login.tokens.refresh_token).await;
    assert!(
        matches!(replay, Err(AuthServiceError::RevokedToken)),
        "expected RevokedToken, got {replay:?}"
    );

    // New token works exactly once before the next rotation.
    let again = refresh.execute(&rotated.tokens.refresh_token).await.unwrap();
    let replay = refresh.execute(&rotated.tokens.refresh_token).await;
    assert!(matches!(replay, Err(AuthServiceError::RevokedToken)));
    assert_eq!(
        repo.stored_refresh_token(identity.id).as_deref(),
        Some(again.tokens.refresh_token.as_str())
    );
}

#[tokio::test]
async fn should_let_only_one_of_two_concurrent_refreshes_win() {
    let identity = test_identity("a@x.com");
    let repo = MockIdentityRepo::new(vec![identity.clone()]);
    let login = login_usecase(&repo).execute(credentials("a@x.com")).await.unwrap();

    // Both requests read the identity before either rotates.
    repo.freeze_reads();
    let refresh = refresh_usecase(&repo);
    let winner = refresh.execute(&login.tokens.refresh_token).await.unwrap();
    let loser = refresh.execute(&login.tokens.refresh_token).await;

    assert!(matches!(loser, Err(AuthServiceError::RevokedToken)));
    assert_eq!(
        repo.stored_refresh_token(identity.id).as_deref(),
        Some(winner.tokens.refresh_token.as_str())
    );
}

#[tokio::test]
async fn should_reject_refresh_token_for_unknown_subject() {
    let stranger = test_identity("ghost@x.com");
    let pair = test_issuer().issue_tokens(&stranger).unwrap();

    let result = refresh_usecase(&MockIdentityRepo::empty())
        .execute(&pair.refresh_token)
        .await;
    assert!(matches!(result, Err(AuthServiceError::InvalidToken)));
}

#[tokio::test]
async fn should_reject_expired_refresh_token_as_expired() {
    let mut identity = test_identity("a@x.com");
    let claims = RefreshClaims {
        sub: identity.id.to_string(),
        jti: "expired".to_owned(),
        iat: now_secs() - 7200,
        exp: now_secs() - 3600,
    };
    let token = encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(TEST_JWT_SECRET.as_bytes()),
    )
    .unwrap();
    identity.refresh_token = Some(token.clone());
    let repo = MockIdentityRepo::new(vec![identity]);

    let result = refresh_usecase(&repo).execute(&token).await;
    assert!(matches!(result, Err(AuthServiceError::ExpiredToken)));
}

#[tokio::test]
async fn should_reject_refresh_token_signed_with_another_secret() {
    let mut identity = test_identity("a@x.com");
    let foreign = TokenIssuer::new("another-secret", 1800, 604_800)
        .issue_tokens(&identity)
        .unwrap();
    identity.refresh_token = Some(foreign.refresh_token.clone());
    let repo = MockIdentityRepo::new(vec![identity]);

    let result = refresh_usecase(&repo).execute(&foreign.refresh_token).await;
    assert!(matches!(result, Err(AuthServiceError::InvalidToken)));
}

#[tokio::test]
async fn should_not_refresh_for_identity_disabled_after_login() {
    let identity = test_identity("a@x.com");
    let repo = MockIdentityRepo::new(vec![identity.clone()]);
    let login = login_usecase(&repo).execute(credentials("a@x.com")).await.unwrap();

    repo.identities.lock().unwrap()[0].enabled = false;

    let result = refresh_usecase(&repo)
        .execute(&login.tokens.refresh_token)
        .await;
    assert!(matches!(result, Err(AuthServiceError::AccountDisabled)));
}

// ── LogoutUseCase ────────────────────────────────────────────────────────────

#[tokio::test]
async fn should_clear_stored_token_on_logout() {
    let identity = test_identity("a@x.com");
    let repo = MockIdentityRepo::new(vec![identity.clone()]);
    let login = login_usecase(&repo).execute(credentials("a@x.com")).await.unwrap();

    LogoutUseCase {
        identities: repo.clone(),
    }
    .execute(&login.user)
    .await
    .unwrap();

    assert_eq!(repo.stored_refresh_token(identity.id), None);
    let result = refresh_usecase(&repo)
        .execute(&login.tokens.refresh_token)
        .await;
    assert!(matches!(result, Err(AuthServiceError::RevokedToken)));
}
