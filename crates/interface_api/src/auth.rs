//! Authentication and authorization

use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use core_kernel::UserId;

use crate::error::ApiError;

/// JWT claims
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Subject (operator user ID)
    pub sub: String,
    /// User's roles
    pub roles: Vec<String>,
    /// Expiration timestamp
    pub exp: i64,
    /// Issued at timestamp
    pub iat: i64,
}

/// Auth errors
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Invalid token")]
    InvalidToken,
    #[error("Token expired")]
    TokenExpired,
    #[error("Missing permission: {0}")]
    MissingPermission(String),
}

/// Role definitions
pub mod roles {
    /// Full access, including other operators' citizens and exports
    pub const ADMIN: &str = "admin";
    /// Day-to-day data entry for the operator's own citizens
    pub const OPERATOR: &str = "operator";
}

/// Creates a new JWT token
pub fn create_token(
    user_id: &str,
    roles: Vec<String>,
    secret: &str,
    expiration_secs: u64,
) -> Result<String, AuthError> {
    let now = Utc::now();
    let exp = now + Duration::seconds(expiration_secs as i64);

    let claims = Claims {
        sub: user_id.to_string(),
        roles,
        exp: exp.timestamp(),
        iat: now.timestamp(),
    };

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .map_err(|_| AuthError::InvalidToken)
}

/// Validates a JWT token
pub fn validate_token(token: &str, secret: &str) -> Result<Claims, AuthError> {
    let token_data = decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::default(),
    )
    .map_err(|e| {
        if e.to_string().contains("ExpiredSignature") {
            AuthError::TokenExpired
        } else {
            AuthError::InvalidToken
        }
    })?;

    Ok(token_data.claims)
}

/// Checks if user has the required role; `admin` passes every check
pub fn has_role(claims: &Claims, required_role: &str) -> bool {
    claims.roles.iter().any(|r| r == required_role || r == roles::ADMIN)
}

pub fn is_admin(claims: &Claims) -> bool {
    claims.roles.iter().any(|r| r == roles::ADMIN)
}

/// The operator user id behind the token.
pub fn caller_user_id(claims: &Claims) -> Result<UserId, ApiError> {
    claims
        .sub
        .parse()
        .map_err(|_| ApiError::BadRequest(format!("Invalid user id in token: {}", claims.sub)))
}

/// Ownership gate: the caller must own the record or be an admin.
pub fn ensure_owner(claims: &Claims, owner: UserId) -> Result<(), ApiError> {
    if is_admin(claims) {
        return Ok(());
    }
    if caller_user_id(claims)? == owner {
        Ok(())
    } else {
        Err(ApiError::Forbidden(
            "Record belongs to another operator".to_string(),
        ))
    }
}
