use serde::Serialize;

use crate::auth::{self, AuthError, CredentialVerifier};
use crate::config::SecurityConfig;
use crate::database::models::User;
use crate::database::Repository;
use crate::services::UserService;

/// Response body of `POST /token`
#[derive(Debug, Clone, Serialize)]
pub struct IssuedToken {
    pub access_token: String,
    pub token_type: &'static str,
    pub user: User,
}

/// Exchanges provider-verified credentials for a signed bearer token
pub struct AuthService<'a> {
    repo: &'a dyn Repository,
    verifier: &'a dyn CredentialVerifier,
    security: &'a SecurityConfig,
}

impl<'a> AuthService<'a> {
    pub fn new(
        repo: &'a dyn Repository,
        verifier: &'a dyn CredentialVerifier,
        security: &'a SecurityConfig,
    ) -> Self {
        Self {
            repo,
            verifier,
            security,
        }
    }

    pub async fn issue_token(&self, email: &str, password: &str) -> Result<IssuedToken, AuthError> {
        let email = email.trim();

        if !self.verifier.verify(email, password).await? {
            tracing::warn!("Login rejected for {}", email);
            return Err(AuthError::InvalidCredentials);
        }

        // Local accounts are keyed by the lowercased address
        let email = email.to_lowercase();
        let user = UserService::new(self.repo).get_or_create(&email).await?;
        let access_token = auth::issue_token(&user, self.security)?;

        tracing::info!("Issued token for user {} ({})", user.id, user.email);
        Ok(IssuedToken {
            access_token,
            token_type: "bearer",
            user,
        })
    }
}
