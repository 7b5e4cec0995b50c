// src/service/auth.rs

use crate::database::user::{UserStore, dummy_verify, verify_password};
use crate::error::app_error::AppError;
use crate::models::session::Identity;
use crate::models::user::LoginRequest;
use crate::service::token::TokenCodec;

/// Credential checks and ownership rules shared by the auth and catalog routes.
pub struct AuthService<'a> {
    pub users: &'a UserStore,
    pub tokens: &'a TokenCodec,
}

impl<'a> AuthService<'a> {
    pub fn new(users: &'a UserStore, tokens: &'a TokenCodec) -> Self {
        Self { users, tokens }
    }

    /// Exact username lookup plus password verification.
    pub async fn authenticate(&self, credentials: &LoginRequest) -> Result<Identity, AppError> {
        match self.users.find_by_username(&credentials.username).await {
            Some(user) => {
                verify_password(&user, &credentials.password)?;
                Ok(Identity::from(&user))
            }
            None => {
                dummy_verify(&credentials.password);
                Err(AppError::InvalidCredentials)
            }
        }
    }

    pub fn login_token(&self, identity: &Identity) -> Result<String, AppError> {
        self.tokens.encode(identity)
    }

    /// Resolves a login token, if any, to an identity.
    pub fn identify(&self, token: Option<&str>) -> Result<Identity, AppError> {
        let token = token.ok_or(AppError::Unauthenticated)?;
        self.tokens.decode(token).map_err(|_| AppError::Unauthenticated)
    }

    /// Decodes the token and requires it to belong to `owner_id`.
    pub fn authorize(&self, token: Option<&str>, owner_id: &str) -> Result<Identity, AppError> {
        let identity = self.identify(token)?;
        ensure_owner(&identity, owner_id)?;
        Ok(identity)
    }
}

/// Admins may act on anything; everyone else only on what they created.
pub fn ensure_owner(identity: &Identity, owner_id: &str) -> Result<(), AppError> {
    if identity.is_admin || identity.id == owner_id {
        Ok(())
    } else {
        Err(AppError::Forbidden)
    }
}

pub fn ensure_admin(identity: &Identity) -> Result<(), AppError> {
    if identity.is_admin { Ok(()) } else { Err(AppError::Forbidden) }
}
