use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};

use crate::error::AppError;

/// hash
///
/// Hashes a plaintext password into a salted Argon2id PHC string. A fresh salt
/// is drawn from the OS RNG on every call, so hashing the same input twice
/// yields different strings.
pub fn hash(plaintext: &str) -> Result<String, AppError> {
    let salt = SaltString::generate(&mut OsRng);
    let phc = Argon2::default()
        .hash_password(plaintext.as_bytes(), &salt)
        .map_err(|e| AppError::Internal(e.to_string()))?
        .to_string();
    Ok(phc)
}

/// verify
///
/// Checks a plaintext password against a stored PHC string. The comparison runs
/// in constant time inside argon2. A malformed stored hash verifies as false
/// rather than erroring; there is no useful recovery at a login boundary.
pub fn verify(plaintext: &str, phc: &str) -> bool {
    match PasswordHash::new(phc) {
        Ok(parsed) => Argon2::default()
            .verify_password(plaintext.as_bytes(), &parsed)
            .is_ok(),
        Err(_) => false,
    }
}
