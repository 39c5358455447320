//! Resolves bearer credentials issued by the external identity provider.

use std::sync::Arc;

use async_trait::async_trait;
use jsonwebtoken::{Algorithm, DecodingKey, Validation, decode};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
    error::{AppError, AppResult},
    middleware::auth::AuthUser,
    models::Profile,
    repository::Store,
};

#[async_trait]
pub trait IdentityResolver: Send + Sync {
    async fn resolve_caller(&self, token: &str) -> AppResult<AuthUser>;
}

/// Claims we read from provider-issued access tokens.
#[derive(Debug, Deserialize, Serialize)]
pub struct Claims {
    pub sub: String,
    pub exp: usize,
}

/// Verifies HS256 tokens and looks the subject up in the profiles table,
/// which is where the role lives.
pub struct JwtIdentityResolver {
    key: DecodingKey,
    validation: Validation,
    store: Arc<dyn Store>,
}

impl JwtIdentityResolver {
    pub fn new(secret: &str, audience: Option<&str>, store: Arc<dyn Store>) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        match audience {
            Some(aud) => validation.set_audience(&[aud]),
            None => validation.validate_aud = false,
        }
        Self {
            key: DecodingKey::from_secret(secret.as_bytes()),
            validation,
            store,
        }
    }
}

#[async_trait]
impl IdentityResolver for JwtIdentityResolver {
    async fn resolve_caller(&self, token: &str) -> AppResult<AuthUser> {
        let decoded = decode::<Claims>(token, &self.key, &self.validation).map_err(|err| {
            tracing::debug!(error = %err, "token rejected");
            AppError::Unauthorized("Invalid token".into())
        })?;

        let user_id = Uuid::parse_str(&decoded.claims.sub)
            .map_err(|_| AppError::Unauthorized("Invalid user id in token".into()))?;

        caller_from_lookup(user_id, self.store.find_profile(user_id).await)
    }
}

/// Turns the profile lookup for a verified subject into the caller.
/// Only a missing profile or an unreadable role is a 403; store failures
/// stay 5xx.
fn caller_from_lookup(user_id: Uuid, lookup: AppResult<Option<Profile>>) -> AppResult<AuthUser> {
    let profile = match lookup {
        Ok(Some(profile)) => profile,
        Ok(None) => return Err(AppError::Forbidden("Profile missing".into())),
        Err(AppError::UnknownRole(detail)) => {
            tracing::warn!(user_id = %user_id, %detail, "caller has an unknown role");
            return Err(AppError::Forbidden("Invalid role".into()));
        }
        Err(err) => return Err(err),
    };

    tracing::debug!(user_id = %profile.id, role = %profile.role, "caller resolved");
    Ok(AuthUser {
        user_id: profile.id,
        email: profile.email,
        role: profile.role,
    })
}
