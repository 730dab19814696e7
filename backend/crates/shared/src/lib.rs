//! Shared kernel for the access-control portal.
//!
//! Holds the vocabulary every bounded context agrees on:
//! - the unified error type ([`error::app_error::AppError`]) and its HTTP
//!   classification ([`error::kind::ErrorKind`])
//! - typed identifiers ([`id::Id`]) for admin users, employees, tap events
//!   and reader nodes
//!
//! Anything domain specific (lockout policy, tap direction rules) lives in
//! the owning crate, not here.

pub mod error {
    pub mod app_error;
    pub mod conversions;
    pub mod kind;
}
pub mod id;
