//! Bearer-token claims and verification.
//!
//! Each service used to decode tokens inline; the `TokenVerifier` trait is
//! the single seam everything depends on instead. Services receive decoded
//! [`Claims`], never raw tokens.

use axum::http::HeaderMap;
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

use crate::error::{AppError, Result};

/// Roles recognized across the system.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Role {
    Admin,
    Accountant,
    User,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "Admin",
            Role::Accountant => "Accountant",
            Role::User => "User",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "Admin" => Some(Role::Admin),
            "Accountant" => Some(Role::Accountant),
            "User" => Some(Role::User),
            _ => None,
        }
    }

    /// Elevated roles may read all records and trigger reposting.
    pub fn is_elevated(&self) -> bool {
        matches!(self, Role::Admin | Role::Accountant)
    }
}

/// Decoded bearer-token claims.
///
/// Service tokens carry `service` (historically either `true` or the minting
/// service's name, so any truthy value is accepted) and no `sub`; end-user
/// tokens carry `sub` and `role_name`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sub: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub service: Option<serde_json::Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role_name: Option<String>,
    pub exp: i64,
}

impl Claims {
    pub fn is_service(&self) -> bool {
        match &self.service {
            Some(serde_json::Value::Bool(b)) => *b,
            Some(serde_json::Value::String(s)) => !s.is_empty(),
            _ => false,
        }
    }

    pub fn role(&self) -> Option<Role> {
        self.role_name.as_deref().and_then(Role::parse)
    }

    /// Identity used to stamp `created_by` on records.
    pub fn principal(&self) -> Result<&str> {
        self.sub
            .as_deref()
            .ok_or_else(|| AppError::Unauthorized("Could not validate credentials".to_string()))
    }
}

/// Decodes and validates a bearer token into [`Claims`].
pub trait TokenVerifier: Send + Sync {
    fn verify(&self, token: &str) -> Result<Claims>;
}

/// HS256 verifier over a shared secret.
pub struct JwtVerifier {
    key: DecodingKey,
    validation: Validation,
}

impl JwtVerifier {
    pub fn new(secret: &str) -> Self {
        Self {
            key: DecodingKey::from_secret(secret.as_bytes()),
            validation: Validation::new(Algorithm::HS256),
        }
    }
}

impl TokenVerifier for JwtVerifier {
    fn verify(&self, token: &str) -> Result<Claims> {
        decode::<Claims>(token, &self.key, &self.validation)
            .map(|data| data.claims)
            .map_err(|e| match e.kind() {
                jsonwebtoken::errors::ErrorKind::ExpiredSignature => {
                    AppError::Unauthorized("Token has expired".to_string())
                }
                _ => AppError::Unauthorized("Invalid token".to_string()),
            })
    }
}

/// Mints a short-lived service-to-service token.
pub fn mint_service_token(secret: &str, role: Role, ttl: Duration) -> Result<String> {
    let claims = Claims {
        sub: None,
        service: Some(serde_json::Value::Bool(true)),
        role_name: Some(role.as_str().to_string()),
        exp: (Utc::now() + ttl).timestamp(),
    };

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .map_err(|e| AppError::Internal(format!("failed to mint service token: {e}")))
}

/// Checks that the caller may touch the ledger: either a trusted service or
/// a user with a recognized role.
pub fn authorize_ledger_access(claims: &Claims) -> Result<()> {
    if claims.is_service() || claims.role().is_some() {
        Ok(())
    } else {
        Err(AppError::Forbidden(
            "Unauthorized service or user".to_string(),
        ))
    }
}

/// Pulls the token out of an `Authorization: Bearer ...` header.
pub fn extract_bearer(headers: &HeaderMap) -> Result<&str> {
    let header = headers
        .get(axum::http::header::AUTHORIZATION)
        .ok_or_else(|| AppError::Unauthorized("Missing authorization header".to_string()))?;

    let header = header
        .to_str()
        .map_err(|_| AppError::Unauthorized("Invalid authorization header".to_string()))?;

    let token = header
        .strip_prefix("Bearer ")
        .ok_or_else(|| AppError::Unauthorized("Invalid authorization header".to_string()))?
        .trim();

    if token.is_empty() {
        return Err(AppError::Unauthorized(
            "Invalid authorization header".to_string(),
        ));
    }

    Ok(token)
}
