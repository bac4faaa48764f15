use chrono::{Duration, Utc};
use uuid::Uuid;

use datn_auth::domain::repository::VerificationCodeRepository;
use datn_auth::domain::types::{
    CODE_LEN, CodePurpose, MAX_ACTIVE_CODES, OutboxEvent, VerificationCode,
};
use datn_auth::error::AuthServiceError;
use datn_auth::usecase::password::verify_password;
use datn_auth::usecase::signup::{
    ForgotPasswordUseCase, RegisterInput, RegisterUseCase, ResendVerificationUseCase,
    ResetPasswordInput, ResetPasswordUseCase, VerifyEmailInput, VerifyEmailUseCase,
};
use datn_auth::usecase::token::{LoginInput, LoginUseCase, RefreshTokenUseCase};

use crate::helpers::{
    MockCodeRepo, MockIdentityRepo, TEST_PASSWORD, disabled_identity, test_identity, test_issuer,
};

fn register_input(email: &str, password: &str) -> RegisterInput {
    RegisterInput {
        email: email.to_owned(),
        password: password.to_owned(),
        name: "Alice".to_owned(),
    }
}

fn active_code(user_id: Uuid, purpose: CodePurpose) -> VerificationCode {
    let now = Utc::now();
    VerificationCode {
        id: Uuid::new_v4(),
        user_id,
        purpose,
        code: "AAAABBBBCCCC".to_owned(),
        expires_at: now + Duration::seconds(600),
        used_at: None,
        created_at: now,
    }
}

// ── Register ─────────────────────────────────────────────────────────────────

#[tokio::test]
async fn should_register_disabled_identity_and_queue_verification_code() {
    let codes = MockCodeRepo::empty();
    let repo = MockIdentityRepo::empty().with_codes(&codes);

    let identity = RegisterUseCase {
        identities: repo.clone(),
    }
    .execute(register_input(" New@X.com ", "longenough"))
    .await
    .unwrap();

    assert_eq!(identity.email, "new@x.com");
    assert!(!identity.enabled);
    assert!(verify_password("longenough", &identity.password_hash).unwrap());

    let code = codes
        .last_code(identity.id, CodePurpose::Verify)
        .expect("verification code");
    assert_eq!(code.code.len(), CODE_LEN);

    let events = codes.events();
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].kind, "verification_code_created");
    assert_eq!(events[0].user_id, identity.id);
    assert_eq!(events[0].payload["email"], "new@x.com");
    assert_eq!(events[0].payload["code"], code.code.as_str());
    assert_eq!(
        events[0].idempotency_key,
        format!("verification_code_created:{}", code.id)
    );
}

#[tokio::test]
async fn should_not_login_before_verification() {
    let repo = MockIdentityRepo::empty();
    RegisterUseCase {
        identities: repo.clone(),
    }
    .execute(register_input("new@x.com", "longenough"))
    .await
    .unwrap();

    let result = LoginUseCase {
        identities: repo.clone(),
        issuer: test_issuer(),
    }
    .execute(LoginInput {
        username: "new@x.com".to_owned(),
        password: "longenough".to_owned(),
    })
    .await;
    assert!(matches!(result, Err(AuthServiceError::AccountDisabled)));
}

#[tokio::test]
async fn should_reject_invalid_registrations() {
    let repo = MockIdentityRepo::new(vec![test_identity("taken@x.com")]);
    let register = RegisterUseCase {
        identities: repo.clone(),
    };

    assert!(matches!(
        register.execute(register_input("TAKEN@x.com", "longenough")).await,
        Err(AuthServiceError::EmailTaken)
    ));
    assert!(matches!(
        register.execute(register_input("not-an-email", "longenough")).await,
        Err(AuthServiceError::InvalidEmail)
    ));
    assert!(matches!(
        register.execute(register_input("new@x.com", "short")).await,
        Err(AuthServiceError::WeakPassword)
    ));
    assert_eq!(repo.count(), 1);
}

#[tokio::test]
async fn should_leave_no_code_behind_when_duplicate_insert_loses() {
    let codes = MockCodeRepo::empty();
    let repo = MockIdentityRepo::empty().with_codes(&codes);
    // Another request inserts the same email between the existence check and
    // the write.
    repo.lose_create_race_to(disabled_identity("new@x.com"));

    let result = RegisterUseCase {
        identities: repo.clone(),
    }
    .execute(register_input("new@x.com", "longenough"))
    .await;

    assert!(matches!(result, Err(AuthServiceError::EmailTaken)));
    assert_eq!(repo.count(), 1);
    assert!(codes.codes.lock().unwrap().is_empty());
    assert!(codes.events().is_empty());
}

// ── Resend / Verify ──────────────────────────────────────────────────────────

#[tokio::test]
async fn should_resend_code_until_active_limit() {
    let identity = disabled_identity("a@x.com");
    let codes = MockCodeRepo::empty();
    let resend = ResendVerificationUseCase {
        identities: MockIdentityRepo::new(vec![identity.clone()]),
        codes: codes.clone(),
    };

    for _ in 0..MAX_ACTIVE_CODES {
        resend.execute("a@x.com").await.unwrap();
    }
    let result = resend.execute("a@x.com").await;

    assert!(matches!(
        result,
        Err(AuthServiceError::TooManyVerificationCodes)
    ));
    assert_eq!(codes.events().len() as u64, MAX_ACTIVE_CODES);
}

#[tokio::test]
async fn should_refuse_resend_for_unknown_or_verified_email() {
    let resend = ResendVerificationUseCase {
        identities: MockIdentityRepo::new(vec![test_identity("a@x.com")]),
        codes: MockCodeRepo::empty(),
    };

    assert!(matches!(
        resend.execute("nobody@x.com").await,
        Err(AuthServiceError::UserNotFound)
    ));
    assert!(matches!(
        resend.execute("a@x.com").await,
        Err(AuthServiceError::AlreadyVerified)
    ));
}

#[tokio::test]
async fn should_enable_identity_with_valid_code_once() {
    let identity = disabled_identity("a@x.com");
    let repo = MockIdentityRepo::new(vec![identity.clone()]);
    let codes = MockCodeRepo::empty();
    codes
        .codes
        .lock()
        .unwrap()
        .push(active_code(identity.id, CodePurpose::Verify));
    let verify = VerifyEmailUseCase {
        identities: repo.clone(),
        codes: codes.clone(),
    };

    verify
        .execute(VerifyEmailInput {
            email: "a@x.com".to_owned(),
            code: "AAAABBBBCCCC".to_owned(),
        })
        .await
        .unwrap();

    assert!(repo.get(identity.id).unwrap().enabled);
    let again = verify
        .execute(VerifyEmailInput {
            email: "a@x.com".to_owned(),
            code: "AAAABBBBCCCC".to_owned(),
        })
        .await;
    assert!(matches!(again, Err(AuthServiceError::AlreadyVerified)));
}

#[tokio::test]
async fn should_reject_wrong_expired_or_misdirected_codes() {
    let identity = disabled_identity("a@x.com");
    let repo = MockIdentityRepo::new(vec![identity.clone()]);
    let codes = MockCodeRepo::empty();
    {
        let mut stored = codes.codes.lock().unwrap();
        let mut expired = active_code(identity.id, CodePurpose::Verify);
        expired.code = "EXPIRED00000".to_owned();
        expired.expires_at = Utc::now() - Duration::seconds(1);
        stored.push(expired);
        // A reset code never activates an account.
        stored.push(active_code(identity.id, CodePurpose::Reset));
    }
    let verify = VerifyEmailUseCase {
        identities: repo.clone(),
        codes,
    };

    for code in ["WRONGCODE000", "EXPIRED00000", "AAAABBBBCCCC"] {
        let result = verify
            .execute(VerifyEmailInput {
                email: "a@x.com".to_owned(),
                code: code.to_owned(),
            })
            .await;
        assert!(
            matches!(result, Err(AuthServiceError::InvalidVerificationCode)),
            "code {code}: got {result:?}"
        );
    }
    assert!(!repo.get(identity.id).unwrap().enabled);
}

// ── Forgot / Reset ───────────────────────────────────────────────────────────

#[tokio::test]
async fn should_queue_reset_code_on_forgot() {
    let identity = test_identity("a@x.com");
    let codes = MockCodeRepo::empty();

    ForgotPasswordUseCase {
        identities: MockIdentityRepo::new(vec![identity.clone()]),
        codes: codes.clone(),
    }
    .execute("A@x.com")
    .await
    .unwrap();

    assert!(codes.last_code(identity.id, CodePurpose::Reset).is_some());
    assert_eq!(codes.events()[0].kind, "password_reset_requested");
}

#[tokio::test]
async fn should_reset_password_and_end_live_session() {
    let identity = test_identity("a@x.com");
    let repo = MockIdentityRepo::new(vec![identity.clone()]);
    let codes = MockCodeRepo::empty();

    let login = LoginUseCase {
        identities: repo.clone(),
        issuer: test_issuer(),
    }
    .execute(LoginInput {
        username: "a@x.com".to_owned(),
        password: TEST_PASSWORD.to_owned(),
    })
    .await
    .unwrap();

    ForgotPasswordUseCase {
        identities: repo.clone(),
        codes: codes.clone(),
    }
    .execute("a@x.com")
    .await
    .unwrap();
    let code = codes.last_code(identity.id, CodePurpose::Reset).unwrap();

    ResetPasswordUseCase {
        identities: repo.clone(),
        codes: codes.clone(),
    }
    .execute(ResetPasswordInput {
        email: "a@x.com".to_owned(),
        code: code.code.clone(),
        new_password: "brand-new-password".to_owned(),
    })
    .await
    .unwrap();

    let stored = repo.get(identity.id).unwrap();
    assert!(verify_password("brand-new-password", &stored.password_hash).unwrap());
    assert_eq!(stored.refresh_token, None);

    let refresh = RefreshTokenUseCase {
        identities: repo.clone(),
        issuer: test_issuer(),
    }
    .execute(&login.tokens.refresh_token)
    .await;
    assert!(matches!(refresh, Err(AuthServiceError::RevokedToken)));
}

#[tokio::test]
async fn should_reject_weak_password_on_reset() {
    let identity = test_identity("a@x.com");
    let codes = MockCodeRepo::empty();
    codes
        .codes
        .lock()
        .unwrap()
        .push(active_code(identity.id, CodePurpose::Reset));

    let result = ResetPasswordUseCase {
        identities: MockIdentityRepo::new(vec![identity]),
        codes,
    }
    .execute(ResetPasswordInput {
        email: "a@x.com".to_owned(),
        code: "AAAABBBBCCCC".to_owned(),
        new_password: "short".to_owned(),
    })
    .await;
    assert!(matches!(result, Err(AuthServiceError::WeakPassword)));
}

/// Code store whose lookups yield before answering, so two requests can both
/// find the same code before either marks it used.
#[derive(Clone)]
struct InterleavingCodeRepo(MockCodeRepo);

impl VerificationCodeRepository for InterleavingCodeRepo {
    async fn count_active(
        &self,
        user_id: Uuid,
        purpose: CodePurpose,
    ) -> Result<u64, AuthServiceError> {
        self.0.count_active(user_id, purpose).await
    }

    async fn create_with_outbox(
        &self,
        code: &VerificationCode,
        event: &OutboxEvent,
    ) -> Result<(), AuthServiceError> {
        self.0.create_with_outbox(code, event).await
    }

    async fn find_valid(
        &self,
        user_id: Uuid,
        purpose: CodePurpose,
        code: &str,
    ) -> Result<Option<VerificationCode>, AuthServiceError> {
        let found = self.0.find_valid(user_id, purpose, code).await;
        tokio::task::yield_now().await;
        found
    }

    async fn mark_used(&self, id: Uuid) -> Result<bool, AuthServiceError> {
        self.0.mark_used(id).await
    }
}

#[tokio::test]
async fn should_redeem_reset_code_only_once_under_concurrency() {
    let identity = test_identity("a@x.com");
    let repo = MockIdentityRepo::new(vec![identity.clone()]);
    let codes = MockCodeRepo::empty();
    codes
        .codes
        .lock()
        .unwrap()
        .push(active_code(identity.id, CodePurpose::Reset));
    let reset = ResetPasswordUseCase {
        identities: repo.clone(),
        codes: InterleavingCodeRepo(codes.clone()),
    };
    let input = |password: &str| ResetPasswordInput {
        email: "a@x.com".to_owned(),
        code: "AAAABBBBCCCC".to_owned(),
        new_password: password.to_owned(),
    };

    let (first, second) = tokio::join!(
        reset.execute(input("first-new-password")),
        reset.execute(input("second-new-password")),
    );

    let results = [first, second];
    assert_eq!(results.iter().filter(|r| r.is_ok()).count(), 1);
    assert_eq!(
        results
            .iter()
            .filter(|r| matches!(r, Err(AuthServiceError::InvalidVerificationCode)))
            .count(),
        1
    );
    assert!(codes.codes.lock().unwrap()[0].used_at.is_some());
}
