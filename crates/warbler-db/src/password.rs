use anyhow::{Result, anyhow};
use argon2::{
    Argon2, PasswordHash, PasswordHasher, PasswordVerifier,
    password_hash::{SaltString, rand_core::OsRng},
};

/// Hash a password with Argon2id and a fresh random salt.
pub fn hash(password: &str) -> Result<String> {
    let salt = SaltString::generate(&mut OsRng);
    let hash = Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| anyhow!("password hashing failed: {}", e))?
        .to_string();
    Ok(hash)
}

/// A stored hash that fails to parse never verifies.
pub fn verify(password: &str, stored: &str) -> bool {
    match PasswordHash::new(stored) {
        Ok(parsed) => Argon2::default()
            .verify_password(password.as_bytes(), &parsed)
            .is_ok(),
        Err(_) => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn verifies_only_the_original_password() {
        let stored = hash("password").unwrap();
        assert_ne!(stored, "password");
        assert!(verify("password", &stored));
        assert!(!verify("wrongpw", &stored));
    }

    #[test]
    fn each_hash_gets_a_fresh_salt() {
        let first = hash("password").unwrap();
        let second = hash("password").unwrap();
        assert_ne!(first, second);
        assert!(verify("password", &first));
        assert!(verify("password", &second));
    }

    #[test]
    fn garbage_hash_does_not_verify() {
        assert!(!verify("password", "HASHED_PASSWORD"));
    }
}
