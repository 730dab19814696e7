//! Platform Crate - Technical Infrastructure
//!
//! Shared technical foundations used by the auth and attendance contexts:
//! - Cryptographic utilities (HMAC-SHA256, Base64)
//! - Password hashing (Argon2id) and strength scoring
//! - Session cookie helpers
//! - Client address extraction
//! - Injectable clock
//! - Fixed-window rate limiting with a background sweeper

pub mod client;
pub mod clock;
pub mod cookie;
pub mod crypto;
pub mod password;
pub mod rate_limit;
