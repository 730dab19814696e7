//! Login Identifier Value Object
//!
//! The name an administrator types at the sign-in form.
//!
//! ## Invariants
//! - NFKC-normalized, surrounding whitespace trimmed
//! - 3 to 50 characters (Unicode scalars)
//! - Compared case-sensitively, exactly as stored

use derive_more::Display;
use thiserror::Error;
use unicode_normalization::UnicodeNormalization;

pub const LOGIN_ID_MIN_LENGTH: usize = 3;
pub const LOGIN_ID_MAX_LENGTH: usize = 50;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LoginIdError {
    #[error("User ID is required")]
    Empty,
    #[error("User ID must be between 3 and 50 characters")]
    Length(usize),
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Display)]
pub struct LoginId(String);

impl LoginId {
    pub fn parse(raw: &str) -> Result<Self, LoginIdError> {
        let normalized: String = raw.nfkc().collect();
        let trimmed = normalized.trim();
        if trimmed.is_empty() {
            return Err(LoginIdError::Empty);
        }

        let len = trimmed.chars().count();
        if !(LOGIN_ID_MIN_LENGTH..=LOGIN_ID_MAX_LENGTH).contains(&len) {
            return Err(LoginIdError::Length(len));
        }

        Ok(Self(trimmed.to_owned()))
    }

    /// Trust a value read back from the store.
    pub fn from_db(value: String) -> Self {
        Self(value)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}
