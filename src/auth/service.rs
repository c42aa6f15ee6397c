use chrono::Utc;
use log::{debug, info};
use std::sync::Arc;
use validator::Validate;

use super::errors::AuthError;
use super::password::PasswordHasher;
use super::token::{AccessClaims, TokenIssuer, TokenPair};
use crate::error::validation_messages;
use crate::models::{NewUser, SignInInput, SignUpInput, UpdateUserInput, User, UserChanges};
use crate::storage::{StoreError, UserStore};

/// Sign-up, sign-in, token refresh and profile management.
///
/// Holds no state of its own besides the immutable token keys; every read or
/// write goes through the user store.
#[derive(Clone)]
pub struct AuthService {
    users: Arc<dyn UserStore>,
    hasher: PasswordHasher,
    tokens: TokenIssuer,
}

impl AuthService {
    pub fn new(users: Arc<dyn UserStore>, hasher: PasswordHasher, tokens: TokenIssuer) -> Self {
        Self {
            users,
            hasher,
            tokens,
        }
    }

    /// Creates an account and signs it in right away.
    ///
    /// The email is lower-cased before it is stored. A uniqueness violation
    /// from the store becomes [`AuthError::EmailTaken`].
    pub async fn sign_up(&self, input: SignUpInput) -> Result<TokenPair, AuthError> {
        input
            .validate()
            .map_err(|e| AuthError::Validation(validation_messages(&e)))?;

        let email = input.email.to_lowercase();
        let password_hash = self.hasher.hash(&input.password)?;

        let id = self
            .users
            .create(NewUser {
                email: email.clone(),
                username: input.username,
                password_hash,
            })
            .await
            .map_err(|e| match e {
                StoreError::UniqueViolation => AuthError::EmailTaken,
                other => AuthError::Store(other),
            })?;
        info!("user {} signed up", id);

        self.sign_in(SignInInput {
            email,
            password: input.password,
        })
        .await
    }

    /// Checks an email/password pair and issues a token pair for the stored role.
    pub async fn sign_in(&self, input: SignInInput) -> Result<TokenPair, AuthError> {
        input
            .validate()
            .map_err(|e| AuthError::Validation(validation_messages(&e)))?;

        let user = self.users.get_by_email(&input.email.to_lowercase()).await?;
        self.hasher.verify(&input.password, &user.password_hash)?;
        debug!("user {} signed in", user.id);

        self.issue(&user)
    }

    /// Trades a valid refresh token for a new pair.
    ///
    /// The user is fetched again so a changed role is picked up and a deleted
    /// account can no longer refresh. The old refresh token stays valid until
    /// it expires.
    pub async fn refresh(&self, refresh_key: &str) -> Result<TokenPair, AuthError> {
        let claims = self.tokens.verify_refresh(refresh_key)?;
        let user = self.users.get(&claims.user_id).await?;
        self.issue(&user)
    }

    pub fn unpack_access_key(&self, access_key: &str) -> Result<AccessClaims, AuthError> {
        Ok(self.tokens.verify_access(access_key)?)
    }

    pub async fn me(&self, id: &str) -> Result<User, AuthError> {
        Ok(self.users.get(id).await?)
    }

    /// Replaces the username and password of an existing account.
    pub async fn update(&self, id: &str, input: UpdateUserInput) -> Result<(), AuthError> {
        input
            .validate()
            .map_err(|e| AuthError::Validation(validation_messages(&e)))?;

        let password_hash = self.hasher.hash(&input.password)?;
        self.users
            .update(
                id,
                UserChanges {
                    username: Some(input.username),
                    password_hash: Some(password_hash),
                },
            )
            .await?;
        Ok(())
    }

    pub async fn delete(&self, id: &str) -> Result<(), AuthError> {
        self.users.delete(id).await?;
        info!("user {} deleted", id);
        Ok(())
    }

    fn issue(&self, user: &User) -> Result<TokenPair, AuthError> {
        Ok(self.tokens.issue_pair(&user.id, user.role, Utc::now())?)
    }
}
