use argon2::{
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use rand::rngs::OsRng;
use tracing::error;

pub fn hash_password(plain: &str) -> anyhow::Result<String> {
    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::default();
    let hash = argon2
        .hash_password(plain.as_bytes(), &salt)
        .map_err(|e| {
            error!(error = %e, "argon2 hash_password error");
            anyhow::anyhow!(e.to_string())
        })?
        .to_string();
    Ok(hash)
}

pub fn verify_password(plain: &str, hash: &str) -> anyhow::Result<bool> {
    let parsed = PasswordHash::new(hash).map_err(|e| {
        error!(error = %e, "argon2 parse hash error");
        anyhow::anyhow!(e.to_string())
    })?;
    Ok(Argon2::default()
        .verify_password(plain.as_bytes(), &parsed)
        .is_ok())
}

/// At least 6 characters with an ASCII uppercase letter, lowercase letter,
/// digit and punctuation symbol.
pub fn meets_policy(plain: &str) -> bool {
    plain.chars().count() >= 6
        && plain.chars().any(|c| c.is_ascii_uppercase())
        && plain.chars().any(|c| c.is_ascii_lowercase())
        && plain.chars().any(|c| c.is_ascii_digit())
        && plain.chars().any(|c| c.is_ascii_punctuation())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hash_and_verify_roundtrip() {
        let password = "Abcdef1!";
        let hash = hash_password(password).expect("hashing should succeed");
        assert_ne!(hash, password);
        assert!(hash.starts_with("$argon2"));
        assert!(verify_password(password, &hash).expect("verify should succeed"));
    }

    #[test]
    fn same_password_gets_distinct_salts() {
        let a = hash_password("Abcdef1!").unwrap();
        let b = hash_password("Abcdef1!").unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn verify_rejects_wrong_password() {
        let hash = hash_password("Abcdef1!").expect("hashing should succeed");
        assert!(!verify_password("Abcdef1?", &hash).expect("verify should not error"));
    }

    #[test]
    fn verify_errors_on_malformed_hash() {
        let err = verify_password("anything", "not-a-valid-hash").unwrap_err();
        assert!(!err.to_string().is_empty());
    }

    #[test]
    fn policy() {
        assert!(meets_policy("Abcdef1!"));
        assert!(meets_policy("xY3#zz"));
        assert!(!meets_policy("Ab1!"), "too short");
        assert!(!meets_policy("abcdef1!"), "no uppercase");
        assert!(!meets_policy("ABCDEF1!"), "no lowercase");
        assert!(!meets_policy("Abcdefg!"), "no digit");
        assert!(!meets_policy("Abcdef12"), "no symbol");
        assert!(!meets_policy("Abcdef1 "), "space is not a symbol");
        assert!(!meets_policy("Ébcdef1!"), "non-ASCII uppercase");
        assert!(!meets_policy("ABCDEFé1!"), "non-ASCII lowercase");
        assert!(!meets_policy("Abcdef1é"), "non-ASCII symbol");
    }
}
