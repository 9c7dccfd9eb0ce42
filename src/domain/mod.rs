//! Domain layer - Core business objects with no I/O
//!
//! This layer contains:
//! - Entities: House, Character and their request variants
//! - Value Objects: typed identifiers, pagination
//! - Validation: the declarative constraint tables for requests

pub mod entities;
pub mod validation;
pub mod value_objects;
