use bcrypt::{hash, verify, DEFAULT_COST};

use crate::AuthError;

pub fn hash_password(plain: &str) -> Result<String, AuthError> {
    hash(plain, DEFAULT_COST).map_err(|_| AuthError::InvalidCredentials)
}

pub fn verify_password(plain: &str, hashed: &str) -> Result<bool, AuthError> {
    verify(plain, hashed).map_err(|_| AuthError::InvalidCredentials)
}
