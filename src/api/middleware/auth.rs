//! JWT authentication middleware.
//!
//! Tokens are issued by the external identity provider; this service only
//! verifies them and provisions the caller's local records.

use axum::{
    extract::{Request, State},
    http::header::AUTHORIZATION,
    middleware::Next,
    response::Response,
};
use jsonwebtoken::{decode, DecodingKey, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::api::AppState;
use crate::config::{is_valid_role, BEARER_TOKEN_PREFIX};
use crate::domain::{Actor, UserRole};
use crate::errors::{AppError, AppResult};

/// Claims asserted by the identity provider
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: Uuid,
    pub email: String,
    pub name: String,
    pub role: String,
    pub exp: i64,
    pub iat: i64,
}

/// Authenticated user extracted from JWT token
#[derive(Clone, Debug)]
pub struct CurrentUser {
    pub id: Uuid,
    pub email: String,
    pub name: String,
    pub role: UserRole,
}

impl CurrentUser {
    /// Check if user has admin role.
    pub fn is_admin(&self) -> bool {
        self.role.is_admin()
    }

    pub fn actor(&self) -> Actor {
        Actor::new(self.id, self.email.clone(), self.name.clone(), self.role)
    }
}

impl TryFrom<Claims> for CurrentUser {
    type Error = AppError;

    fn try_from(claims: Claims) -> Result<Self, Self::Error> {
        if !is_valid_role(&claims.role) {
            tracing::debug!(role = %claims.role, "Token carries unknown role");
            return Err(AppError::Unauthorized);
        }

        Ok(Self {
            id: claims.sub,
            email: claims.email,
            name: claims.name,
            role: UserRole::from(claims.role.as_str()),
        })
    }
}

/// Verify signature and expiry of a bearer token.
pub fn verify_token(token: &str, secret: &[u8]) -> AppResult<Claims> {
    let data = decode::<Claims>(token, &DecodingKey::from_secret(secret), &Validation::default())?;
    Ok(data.claims)
}

/// JWT authentication middleware.
///
/// Validates the bearer token, provisions the caller's local user and
/// customer records, then injects the CurrentUser into the request extensions.
pub async fn auth_middleware(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let auth_header = request
        .headers()
        .get(AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .ok_or(AppError::Unauthorized)?;

    let token = auth_header
        .strip_prefix(BEARER_TOKEN_PREFIX)
        .ok_or(AppError::Unauthorized)?;

    let claims = verify_token(token, state.config.jwt_secret_bytes())?;
    let current_user = CurrentUser::try_from(claims)?;

    state.services.accounts().provision(&current_user.actor()).await?;

    request.extensions_mut().insert(current_user);

    Ok(next.run(request).await)
}

/// Require admin role, returns Forbidden error if not admin.
pub fn require_admin(user: &CurrentUser) -> Result<(), AppError> {
    if user.is_admin() {
        Ok(())
    } else {
        Err(AppError::forbidden("Administrator access required"))
    }
}
