use argon2::{
    password_hash::{PasswordHash, SaltString},
    Argon2, PasswordHasher, PasswordVerifier,
};
use lazy_static::lazy_static;

lazy_static! {
    static ref ARGON2: Argon2<'static> = Argon2::default();
}

/// returns a PHC string ($argon2id$v=19$...). Note: The string contains the salt.
pub fn hash(password: &str) -> String {
    let salt = SaltString::generate(&mut rand::rngs::OsRng);

    ARGON2
        .hash_password_simple(password.as_bytes(), &salt)
        .expect("failed to hash password")
        .to_string()
}

/// Checks a cleartext password against a stored PHC string.
///
/// A stored hash that fails to parse counts as a mismatch so the caller
/// reports the same error either way.
pub fn verify(password: &str, phc: &str) -> bool {
    match PasswordHash::new(phc) {
        Ok(parsed) => ARGON2.verify_password(password.as_bytes(), &parsed).is_ok(),
        Err(_) => false,
    }
}
