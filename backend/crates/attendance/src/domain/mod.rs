//! Domain Layer - Business logic and entities
//!
//! This layer contains:
//! - Domain entities (TapEvent, Node, WorkSession)
//! - Domain value objects (Direction, CardUid, TapDuration, DayWindow)
//! - Domain services (session pairing)
//! - Repository traits (interfaces)

pub mod entities;
pub mod repository;
pub mod services;
pub mod value_objects;
