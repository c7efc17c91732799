//! Session-token auth collaborator.
//!
//! Issues and verifies opaque session tokens and supplies the acting user's
//! role. Mutation endpoints require a manager or admin; the scheduling core
//! assumes its callers are already authorized and never re-checks.
//!
//! Tokens are `user:role:expiry:mac` where the MAC is a SHA-256 digest over
//! the payload and a server secret. The token never leaves this system.

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Manager,
    Admin,
    Employee,
}

impl Role {
    /// Whether this role may mutate schedules, branches, and employees.
    pub fn can_manage(&self) -> bool {
        matches!(self, Role::Manager | Role::Admin)
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Role::Manager => "manager",
            Role::Admin => "admin",
            Role::Employee => "employee",
        };
        f.write_str(name)
    }
}

impl FromStr for Role {
    type Err = AuthError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "manager" => Ok(Role::Manager),
            "admin" => Ok(Role::Admin),
            "employee" => Ok(Role::Employee),
            _ => Err(AuthError::InvalidToken),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AuthError {
    #[error("invalid session token")]
    InvalidToken,
    #[error("session token expired")]
    Expired,
}

/// The verified identity attached to a request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthContext {
    pub user_id: String,
    pub role: Role,
}

/// Issues and verifies session tokens with a server-side secret.
pub struct AuthService {
    secret: Vec<u8>,
}

impl AuthService {
    pub fn new(secret: impl Into<Vec<u8>>) -> Self {
        AuthService {
            secret: secret.into(),
        }
    }

    /// Read the secret from `SESSION_SECRET`, falling back to a fixed
    /// development value.
    pub fn from_env() -> Self {
        let secret = std::env::var("SESSION_SECRET")
            .unwrap_or_else(|_| "shiftboard-dev-secret".to_string());
        Self::new(secret.into_bytes())
    }

    /// Issue a token for `user_id` with `role`, valid for `ttl_secs` from
    /// `now` (a unix timestamp).
    pub fn issue(&self, user_id: &str, role: Role, ttl_secs: u64, now: u64) -> String {
        let expiry = now + ttl_secs;
        let payload = format!("{}:{}:{}", user_id, role, expiry);
        format!("{}:{}", payload, self.mac(&payload))
    }

    /// Verify a token against `now` (a unix timestamp).
    pub fn verify(&self, token: &str, now: u64) -> Result<AuthContext, AuthError> {
        // user ids may not contain ':'; the payload is the first three parts.
        let mut parts = token.split(':');
        let user_id = parts.next().ok_or(AuthError::InvalidToken)?;
        let role_str = parts.next().ok_or(AuthError::InvalidToken)?;
        let expiry_str = parts.next().ok_or(AuthError::InvalidToken)?;
        let mac = parts.next().ok_or(AuthError::InvalidToken)?;
        if parts.next().is_some() || user_id.is_empty() {
            return Err(AuthError::InvalidToken);
        }

        let payload = format!("{}:{}:{}", user_id, role_str, expiry_str);
        if self.mac(&payload) != mac {
            return Err(AuthError::InvalidToken);
        }

        let expiry: u64 = expiry_str.parse().map_err(|_| AuthError::InvalidToken)?;
        if now >= expiry {
            return Err(AuthError::Expired);
        }

        Ok(AuthContext {
            user_id: user_id.to_string(),
            role: role_str.parse()?,
        })
    }

    fn mac(&self, payload: &str) -> String {
        let mut hasher = Sha256::new();
        hasher.update(&self.secret);
        hasher.update(b"|");
        hasher.update(payload.as_bytes());
        hex::encode(hasher.finalize())
    }
}
