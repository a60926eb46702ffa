use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

use crate::AuthError;

const SESSION_DURATION_HOURS: i64 = 24;

#[derive(Debug, Clone, Serialize, Deserialize)]
struct SessionClaims {
    sub: String,
    admin: bool,
    iat: i64,
    exp: i64,
}

/// A verified session, carrying the claims a handler needs to authorize a
/// request without touching the store.
#[derive(Debug, Clone)]
pub struct SessionToken {
    pub user_id: String,
    pub is_admin: bool,
    pub expires_at: DateTime<Utc>,
}

pub fn create_session(user_id: &str, is_admin: bool, secret: &[u8]) -> Result<String, AuthError> {
    let now = Utc::now();
    let exp = now + Duration::hours(SESSION_DURATION_HOURS);

    let claims = SessionClaims { sub: user_id.to_string(), admin: is_admin, iat: now.timestamp(), exp: exp.timestamp() };

    encode(&Header::default(), &claims, &EncodingKey::from_secret(secret)).map_err(|_| AuthError::InvalidSession)
}

pub fn verify_session(token: &str, secret: &[u8]) -> Result<SessionToken, AuthError> {
    let token_data = decode::<SessionClaims>(token, &DecodingKey::from_secret(secret), &Validation::default())
        .map_err(|e| match e.kind() {
            jsonwebtoken::errors::ErrorKind::ExpiredSignature => AuthError::ExpiredSession,
            _ => AuthError::InvalidSession,
        })?;

    let claims = token_data.claims;
    let expires_at = DateTime::from_timestamp(claims.exp, 0).ok_or(AuthError::InvalidSession)?;

    Ok(SessionToken { user_id: claims.sub, is_admin: claims.admin, expires_at })
}

/// Generates a fresh random signing secret. `server` calls this once at
/// startup unless a secret is supplied via configuration.
pub fn generate_secret() -> [u8; 32] {
    use rand::RngCore;
    let mut secret = [0u8; 32];
    rand::thread_rng().fill_bytes(&mut secret);
    secret
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn session_roundtrips() {
        let secret = generate_secret();
        let token = create_session("user-abc12345", true, &secret).unwrap();
        let parsed = verify_session(&token, &secret).unwrap();
        assert_eq!(parsed.user_id, "user-abc12345");
        assert!(parsed.is_admin);
    }

    #[test]
    fn wrong_secret_is_rejected() {
        let secret1 = generate_secret();
        let secret2 = generate_secret();
        let token = create_session("user-abc12345", false, &secret1).unwrap();
        let result = verify_session(&token, &secret2);
        assert!(matches!(result, Err(AuthError::InvalidSession)));
    }
}
