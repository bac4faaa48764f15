use chrono::Utc;
use tracing::{info, warn};
use uuid::Uuid;

use datn_domain::user::{UserRole, is_plausible_email, normalize_email};

use crate::domain::repository::{ExternalIdentityPort, IdentityRepository};
use crate::domain::types::{ExternalProfile, Identity};
use crate::error::AuthServiceError;
use crate::usecase::password::unusable_password_hash;
use crate::usecase::token::{SessionOutput, TokenIssuer, open_session};

pub struct GoogleLoginInput {
    pub access_token: String,
}

pub struct GoogleLoginUseCase<R, P>
where
    R: IdentityRepository,
    P: ExternalIdentityPort,
{
    pub identities: R,
    pub provider: P,
    pub issuer: TokenIssuer,
}

impl<R, P> GoogleLoginUseCase<R, P>
where
    R: IdentityRepository,
    P: ExternalIdentityPort,
{
    pub async fn execute(
        &self,
        input: GoogleLoginInput,
    ) -> Result<SessionOutput, AuthServiceError> {
        if input.access_token.trim().is_empty() {
            return Err(AuthServiceError::ExternalAuth);
        }

        // Nothing is written before the provider has vouched for the token.
        let profile = self.provider.fetch_profile(&input.access_token).await?;
        let email = normalize_email(&profile.email);
        if !is_plausible_email(&email) {
            warn!("external profile without a usable email");
            return Err(AuthServiceError::ExternalAuth);
        }

        let identity = match self.identities.find_by_email(&email).await? {
            Some(identity) => identity,
            None => self.create_identity(&email, &profile).await?,
        };

        let out = open_session(&self.identities, &self.issuer, &identity).await?;
        info!(user_id = %identity.id, "google login");
        Ok(out)
    }

    async fn create_identity(
        &self,
        email: &str,
        profile: &ExternalProfile,
    ) -> Result<Identity, AuthServiceError> {
        let now = Utc::now();
        let identity = Identity {
            id: Uuid::new_v4(),
            email: email.to_owned(),
            name: profile.display_name(),
            role: UserRole::User,
            enabled: true,
            password_hash: unusable_password_hash()?,
            refresh_token: None,
            created_at: now,
            updated_at: now,
        };

        match self.identities.create(&identity).await {
            Ok(()) => {
                info!(user_id = %identity.id, "identity created from google profile");
                Ok(identity)
            }
            // A concurrent first login for the same email won the insert.
            Err(AuthServiceError::EmailTaken) => self
                .identities
                .find_by_email(email)
                .await?
                .ok_or_else(|| {
                    AuthServiceError::Internal(anyhow::anyhow!(
                        "identity vanished after duplicate email"
                    ))
                }),
            Err(e) => Err(e),
        }
    }
}
