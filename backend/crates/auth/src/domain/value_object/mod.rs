//! Value Object Module

pub mod login_id;
