use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::config;

pub mod password;

/// Principal roles. Stored as lowercase text and carried verbatim in token
/// claims and request payloads.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "lowercase")]
#[sqlx(rename_all = "lowercase")]
pub enum Role {
    Admin,
    Mechanic,
    Customer,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::Mechanic => "mechanic",
            Role::Customer => "customer",
        }
    }
}

impl FromStr for Role {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "admin" => Ok(Role::Admin),
            "mechanic" => Ok(Role::Mechanic),
            "customer" => Ok(Role::Customer),
            _ => Err(()),
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    /// Subject id, stringified.
    pub sub: String,
    pub role: Role,
    pub iat: i64,
    pub exp: i64,
}

impl Claims {
    pub fn new(subject_id: i64, role: Role) -> Self {
        let now = Utc::now();
        let expiry_hours = config::config().security.jwt_expiry_hours;
        Self {
            sub: subject_id.to_string(),
            role,
            iat: now.timestamp(),
            exp: (now + Duration::hours(expiry_hours as i64)).timestamp(),
        }
    }

    pub fn subject_id(&self) -> Result<i64, AuthError> {
        self.sub.parse().map_err(|_| AuthError::Malformed)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error("missing or invalid bearer credential")]
    Missing,
    #[error("malformed or badly signed token")]
    Malformed,
    #[error("token has expired")]
    Expired,
    #[error("insufficient role")]
    Forbidden,
    #[error("token signing failed: {0}")]
    Signing(String),
}

/// Issue a signed, time-bounded credential for a subject. Re-login is the
/// sole renewal path; there is no refresh mechanism.
pub fn issue(subject_id: i64, role: Role) -> Result<String, AuthError> {
    sign(&Claims::new(subject_id, role))
}

pub fn sign(claims: &Claims) -> Result<String, AuthError> {
    let secret = &config::config().security.jwt_secret;
    let encoding_key = EncodingKey::from_secret(secret.as_bytes());
    encode(&Header::default(), claims, &encoding_key)
        .map_err(|e| AuthError::Signing(e.to_string()))
}

pub fn verify(token: &str) -> Result<Claims, AuthError> {
    let secret = &config::config().security.jwt_secret;
    let decoding_key = DecodingKey::from_secret(secret.as_bytes());
    let mut validation = Validation::default();
    validation.leeway = 0;

    match decode::<Claims>(token, &decoding_key, &validation) {
        Ok(data) => Ok(data.claims),
        Err(e) => match e.kind() {
            jsonwebtoken::errors::ErrorKind::ExpiredSignature => Err(AuthError::Expired),
            _ => Err(AuthError::Malformed),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_issue_and_verify_round_trip() {
        let token = issue(42, Role::Mechanic).unwrap();
        let claims = verify(&token).unwrap();
        assert_eq!(claims.subject_id().unwrap(), 42);
        assert_eq!(claims.role, Role::Mechanic);
        assert!(claims.exp > claims.iat);
    }

    #[test]
    fn test_expired_token_is_rejected_as_expired() {
        let mut claims = Claims::new(7, Role::Admin);
        claims.iat -= 9 * 3600;
        claims.exp -= 9 * 3600;
        let token = sign(&claims).unwrap();
        assert!(matches!(verify(&token), Err(AuthError::Expired)));
    }

    #[test]
    fn test_garbage_token_is_malformed() {
        assert!(matches!(verify("not-a-token"), Err(AuthError::Malformed)));
    }

    #[test]
    fn test_tampered_signature_is_malformed() {
        let token = issue(1, Role::Customer).unwrap();
        let mut tampered = token.clone();
        tampered.push('x');
        assert!(matches!(verify(&tampered), Err(AuthError::Malformed)));
    }

    #[test]
    fn test_role_parse() {
        assert_eq!("admin".parse::<Role>().unwrap(), Role::Admin);
        assert!("superuser".parse::<Role>().is_err());
    }
}
