//! Account registration and login over the user repository.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{TimeDelta, Utc};

use crate::domain::{Session, User};
use crate::error::GatewayError;
use crate::ports::{AuthError, AuthGateway, PasswordService, TokenService, UserRepository};
use crate::validation::{LoginForm, RegistrationForm, validate_login, validate_registration};

/// [`AuthGateway`] backed by the user repository and the token/password services.
#[derive(Clone)]
pub struct Accounts {
    users: Arc<dyn UserRepository>,
    passwords: Arc<dyn PasswordService>,
    tokens: Arc<dyn TokenService>,
}

impl Accounts {
    pub fn new(
        users: Arc<dyn UserRepository>,
        passwords: Arc<dyn PasswordService>,
        tokens: Arc<dyn TokenService>,
    ) -> Self {
        Self {
            users,
            passwords,
            tokens,
        }
    }

    fn open_session(&self, user: &User) -> Result<Session, GatewayError> {
        let access_token = self
            .tokens
            .generate_token(user.id, &user.email)
            .map_err(auth_error)?;
        Ok(Session {
            user_id: user.id,
            email: user.email.clone(),
            access_token,
            expires_at: Utc::now() + TimeDelta::seconds(self.tokens.expiration_seconds()),
        })
    }
}

fn auth_error(err: AuthError) -> GatewayError {
    match err {
        AuthError::HashingError(msg) => {
            tracing::error!(error = %msg, "Password hashing failed");
            GatewayError::Rejected("Could not process credentials".to_string())
        }
        other => GatewayError::Unauthenticated(other.to_string()),
    }
}

#[async_trait]
impl AuthGateway for Accounts {
    async fn register(&self, form: RegistrationForm) -> Result<Session, GatewayError> {
        validate_registration(&form)?;
        let email = form.email.trim().to_lowercase();

        if self.users.find_by_email(&email).await?.is_some() {
            return Err(GatewayError::Conflict("Email already registered".to_string()));
        }

        let password_hash = self.passwords.hash(&form.password).map_err(auth_error)?;
        let user = User::new(email, password_hash);

        if self.users.find_by_username(&user.username).await?.is_some() {
            return Err(GatewayError::Conflict(format!(
                "The username '{}' is already taken",
                user.username
            )));
        }

        let user = self.users.insert(user).await?;
        tracing::info!(user_id = %user.id, username = %user.username, "User registered");
        self.open_session(&user)
    }

    async fn login(&self, form: LoginForm) -> Result<Session, GatewayError> {
        validate_login(&form)?;
        let email = form.email.trim().to_lowercase();

        let invalid = || GatewayError::Unauthenticated("Invalid email or password".to_string());
        let user = self.users.find_by_email(&email).await?.ok_or_else(invalid)?;

        if !self
            .passwords
            .verify(&form.password, &user.password_hash)
            .map_err(auth_error)?
        {
            tracing::debug!(user_id = %user.id, "Password mismatch");
            return Err(invalid());
        }

        self.open_session(&user)
    }
}
