// Authentication service - business logic layer

use std::sync::Arc;

use tracing::{debug, info};
use validator::Validate;

use crate::auth::{
    error::AuthError,
    models::{Account, Identity, LoginRequest, RegisterRequest, ResetPasswordRequest},
    password::PasswordService,
    repository::{AccountRepository, NewAccount},
    token::{IssuedToken, TokenService},
};
use crate::db::StoreError;
use crate::validation::first_message;

/// Result of a successful login
#[derive(Debug, Clone)]
pub struct LoginOutcome {
    pub account: Account,
    pub token: IssuedToken,
}

/// Authentication service coordinating all account operations
pub struct AuthService {
    accounts: Arc<dyn AccountRepository>,
    password_service: PasswordService,
    token_service: Arc<TokenService>,
}

impl AuthService {
    /// Create a new AuthService
    pub fn new(
        accounts: Arc<dyn AccountRepository>,
        password_service: PasswordService,
        token_service: Arc<TokenService>,
    ) -> Self {
        Self {
            accounts,
            password_service,
            token_service,
        }
    }

    /// Register a new account
    ///
    /// Email uniqueness is decided by the repository's write, not by a prior lookup.
    pub async fn register(&self, request: RegisterRequest) -> Result<Account, AuthError> {
        request
            .validate()
            .map_err(|e| AuthError::ValidationError(first_message(&e)))?;
        PasswordService::validate_password_strength(&request.password)?;

        let password_hash = self.password_service.hash_password(&request.password).await?;

        let account = self
            .accounts
            .create(NewAccount {
                name: request.name,
                email: request.email,
                password_hash,
            })
            .await
            .map_err(|e| match e {
                StoreError::Duplicate { .. } => AuthError::EmailAlreadyExists,
                other => AuthError::Store(other),
            })?;

        info!("Registered account {}", account.id);
        Ok(account)
    }

    /// Login an account and mint a session token
    ///
    /// Unknown email and wrong password both yield `InvalidCredentials`.
    pub async fn login(&self, request: LoginRequest) -> Result<LoginOutcome, AuthError> {
        request
            .validate()
            .map_err(|e| AuthError::ValidationError(first_message(&e)))?;

        let account = match self.accounts.find_by_email(&request.email).await? {
            Some(account) => account,
            None => {
                debug!("Login attempt for unknown email");
                return Err(AuthError::InvalidCredentials);
            }
        };

        if !self
            .password_service
            .verify_password(&request.password, &account.password_hash)
            .await?
        {
            debug!("Login attempt with wrong password for account {}", account.id);
            return Err(AuthError::InvalidCredentials);
        }

        let token = self
            .token_service
            .generate_token(&Identity::from(&account))
            .map_err(|e| AuthError::TokenGenerationError(e.to_string()))?;

        info!("Account {} logged in", account.id);
        Ok(LoginOutcome { account, token })
    }

    /// Replace an account's password.
    ///
    /// Does not ask for the current password; anyone who knows the email can reset it.
    pub async fn reset_password(&self, request: ResetPasswordRequest) -> Result<(), AuthError> {
        request
            .validate()
            .map_err(|e| AuthError::ValidationError(first_message(&e)))?;
        PasswordService::validate_password_strength(&request.password)?;

        if request.password != request.confirm_password {
            return Err(AuthError::ValidationError(
                "Password and confirm password do not match".to_string(),
            ));
        }

        if self.accounts.find_by_email(&request.email).await?.is_none() {
            return Err(AuthError::AccountNotFound);
        }

        let password_hash = self.password_service.hash_password(&request.password).await?;
        if !self
            .accounts
            .update_password_hash(&request.email, &password_hash)
            .await?
        {
            return Err(AuthError::AccountNotFound);
        }

        info!("Password reset for {}", request.email);
        Ok(())
    }
}
