//! Password Hashing and Verification
//!
//! - Argon2id hashing in PHC string format, with optional pepper
//! - Zeroization of clear-text input
//! - Strength scoring and random generation for provisioning admin accounts

use std::fmt;

use argon2::{Argon2, PasswordHash, PasswordHasher, PasswordVerifier, password_hash::SaltString};
use rand::{Rng, rngs::OsRng};
use thiserror::Error;
use unicode_normalization::UnicodeNormalization;
use zeroize::{Zeroize, ZeroizeOnDrop};

/// Shortest password accepted at sign-in
pub const MIN_PASSWORD_LENGTH: usize = 6;

/// Longest password accepted at sign-in
pub const MAX_PASSWORD_LENGTH: usize = 100;

/// Length of passwords produced by [`generate_secure_password`]
pub const GENERATED_PASSWORD_LENGTH: usize = 12;

const GENERATED_PASSWORD_ALPHABET: &[u8] =
    b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789!@#$%^&*";

const SPECIAL_CHARACTERS: &str = "!@#$%^&*(),.?\":{}|<>";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PasswordPolicyError {
    #[error("Password must be at least {min} characters (got {actual})")]
    TooShort { min: usize, actual: usize },

    #[error("Password must be at most {max} characters (got {actual})")]
    TooLong { max: usize, actual: usize },

    #[error("Password is required")]
    Empty,
}

#[derive(Debug, Error)]
pub enum PasswordHashError {
    #[error("Password hashing failed: {0}")]
    HashingFailed(String),

    #[error("Invalid password hash format")]
    InvalidHashFormat,
}

/// Clear text password, wiped from memory on drop.
///
/// Not `Clone`; `Debug` is redacted.
///
/// ```rust
/// use platform::password::ClearTextPassword;
///
/// let password = ClearTextPassword::new("s3cret-pass".to_string()).unwrap();
/// let hashed = password.hash(None).unwrap();
/// assert!(hashed.verify(&password, None));
/// ```
#[derive(Zeroize, ZeroizeOnDrop)]
pub struct ClearTextPassword(String);

impl ClearTextPassword {
    /// NFKC-normalize and check the sign-in length bounds (Unicode scalars).
    pub fn new(raw: String) -> Result<Self, PasswordPolicyError> {
        let normalized: String = raw.nfkc().collect();
        let mut raw = raw;
        raw.zeroize();

        let char_count = normalized.chars().count();
        if char_count == 0 {
            return Err(PasswordPolicyError::Empty);
        }
        if char_count < MIN_PASSWORD_LENGTH {
            return Err(PasswordPolicyError::TooShort {
                min: MIN_PASSWORD_LENGTH,
                actual: char_count,
            });
        }
        if char_count > MAX_PASSWORD_LENGTH {
            return Err(PasswordPolicyError::TooLong {
                max: MAX_PASSWORD_LENGTH,
                actual: char_count,
            });
        }

        Ok(Self(normalized))
    }

    /// Skip the length policy. Used for generated passwords.
    fn new_unchecked(raw: String) -> Self {
        Self(raw.nfkc().collect())
    }

    /// Borrow the clear text, e.g. to show a generated password once.
    pub fn expose(&self) -> &str {
        &self.0
    }

    fn peppered(&self, pepper: Option<&[u8]>) -> zeroize::Zeroizing<Vec<u8>> {
        let mut bytes = self.0.as_bytes().to_vec();
        if let Some(p) = pepper {
            bytes.extend_from_slice(p);
        }
        zeroize::Zeroizing::new(bytes)
    }

    /// Hash with Argon2id (default OWASP parameters, 16-byte random salt).
    pub fn hash(&self, pepper: Option<&[u8]>) -> Result<HashedPassword, PasswordHashError> {
        let salt = SaltString::generate(OsRng);
        let hash = Argon2::default()
            .hash_password(&self.peppered(pepper), &salt)
            .map_err(|e| PasswordHashError::HashingFailed(e.to_string()))?;

        Ok(HashedPassword {
            hash: hash.to_string(),
        })
    }
}

impl fmt::Debug for ClearTextPassword {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("ClearTextPassword")
            .field(&"[REDACTED]")
            .finish()
    }
}

/// Argon2 hash in PHC string format, as stored in the credential table.
#[derive(Clone, PartialEq, Eq)]
pub struct HashedPassword {
    hash: String,
}

impl HashedPassword {
    pub fn from_phc_string(s: impl Into<String>) -> Result<Self, PasswordHashError> {
        let hash = s.into();
        PasswordHash::new(&hash).map_err(|_| PasswordHashError::InvalidHashFormat)?;
        Ok(Self { hash })
    }

    pub fn as_phc_string(&self) -> &str {
        &self.hash
    }

    /// Argon2 verification; compares in constant time.
    pub fn verify(&self, password: &ClearTextPassword, pepper: Option<&[u8]>) -> bool {
        let Ok(parsed) = PasswordHash::new(&self.hash) else {
            return false;
        };
        Argon2::default()
            .verify_password(&password.peppered(pepper), &parsed)
            .is_ok()
    }
}

impl fmt::Debug for HashedPassword {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HashedPassword")
            .field("hash", &"[HASH]")
            .finish()
    }
}

/// Strength report for a candidate admin password.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PasswordStrength {
    /// One point each for: length >= 8, lowercase, uppercase, digit, special
    pub score: u8,
    pub is_valid: bool,
    pub feedback: Vec<&'static str>,
}

pub fn validate_strength(password: &str) -> PasswordStrength {
    let checks: [(bool, &'static str); 5] = [
        (
            password.chars().count() >= 8,
            "Password should be at least 8 characters long",
        ),
        (
            password.chars().any(|c| c.is_ascii_lowercase()),
            "Password should contain lowercase letters",
        ),
        (
            password.chars().any(|c| c.is_ascii_uppercase()),
            "Password should contain uppercase letters",
        ),
        (
            password.chars().any(|c| c.is_ascii_digit()),
            "Password should contain numbers",
        ),
        (
            password.chars().any(|c| SPECIAL_CHARACTERS.contains(c)),
            "Password should contain special characters",
        ),
    ];

    let score = checks.iter().filter(|(ok, _)| *ok).count() as u8;
    let feedback = checks
        .iter()
        .filter(|(ok, _)| !ok)
        .map(|(_, msg)| *msg)
        .collect();

    PasswordStrength {
        score,
        is_valid: score >= 4,
        feedback,
    }
}

/// Random password from OS entropy, with its hash.
pub fn generate_secure_password(
    pepper: Option<&[u8]>,
) -> Result<(ClearTextPassword, HashedPassword), PasswordHashError> {
    let raw: String = (0..GENERATED_PASSWORD_LENGTH)
        .map(|_| {
            let idx = OsRng.gen_range(0..GENERATED_PASSWORD_ALPHABET.len());
            GENERATED_PASSWORD_ALPHABET[idx] as char
        })
        .collect();
    let password = ClearTextPassword::new_unchecked(raw);
    let hash = password.hash(pepper)?;
    Ok((password, hash))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pw(s: &str) -> ClearTextPassword {
        ClearTextPassword::new(s.to_string()).unwrap()
    }

    #[test]
    fn test_length_bounds() {
        assert!(matches!(
            ClearTextPassword::new("12345".into()),
            Err(PasswordPolicyError::TooShort { min: 6, actual: 5 })
        ));
        assert!(ClearTextPassword::new("123456".into()).is_ok());
        assert!(ClearTextPassword::new("a".repeat(100)).is_ok());
        assert!(matches!(
            ClearTextPassword::new("a".repeat(101)),
            Err(PasswordPolicyError::TooLong { max: 100, .. })
        ));
        assert_eq!(
            ClearTextPassword::new(String::new()).unwrap_err(),
            PasswordPolicyError::Empty
        );
    }

    #[test]
    fn test_length_counts_characters_not_bytes() {
        // 6 characters, 18 bytes
        assert!(ClearTextPassword::new("パスワード安".into()).is_ok());
    }

    #[test]
    fn test_hash_and_verify() {
        let hashed = pw("correct horse").hash(None).unwrap();
        assert!(hashed.verify(&pw("correct horse"), None));
        assert!(!hashed.verify(&pw("wrong horse"), None));
    }

    #[test]
    fn test_pepper_must_match() {
        let pepper = b"server-pepper";
        let hashed = pw("correct horse").hash(Some(pepper)).unwrap();
        assert!(hashed.verify(&pw("correct horse"), Some(pepper)));
        assert!(!hashed.verify(&pw("correct horse"), None));
        assert!(!hashed.verify(&pw("correct horse"), Some(b"other")));
    }

    #[test]
    fn test_phc_string_roundtrip_and_rejects_garbage() {
        let hashed = pw("correct horse").hash(None).unwrap();
        assert!(hashed.as_phc_string().starts_with("$argon2id$"));
        let restored = HashedPassword::from_phc_string(hashed.as_phc_string()).unwrap();
        assert!(restored.verify(&pw("correct horse"), None));

        assert!(HashedPassword::from_phc_string("not_a_valid_hash").is_err());
    }

    #[test]
    fn test_debug_is_redacted() {
        let out = format!("{:?}", pw("secret-value"));
        assert!(out.contains("REDACTED"));
        assert!(!out.contains("secret-value"));
    }

    #[test]
    fn test_strength_scoring() {
        let strong = validate_strength("Admin#2024");
        assert_eq!(strong.score, 5);
        assert!(strong.is_valid);
        assert!(strong.feedback.is_empty());

        let weak = validate_strength("admin");
        assert_eq!(weak.score, 1);
        assert!(!weak.is_valid);
        assert_eq!(weak.feedback.len(), 4);

        // Four of five is enough
        assert!(validate_strength("Admin2024").is_valid);
    }

    #[test]
    fn test_generated_password() {
        let (password, hash) = generate_secure_password(None).unwrap();
        assert_eq!(password.expose().chars().count(), GENERATED_PASSWORD_LENGTH);
        assert!(
            password
                .expose()
                .bytes()
                .all(|b| GENERATED_PASSWORD_ALPHABET.contains(&b))
        );
        assert!(hash.verify(&password, None));
    }
}
