//! Infrastructure layer - External adapters and implementations
//!
//! This layer contains:
//! - Persistence: SQLite and in-memory storage adapters
//! - HTTP: REST API routes
//! - Clock: system time and identifier generation
//! - Config: Application configuration
//! - State: Shared application state

pub mod clock;
pub mod config;
pub mod http;
pub mod persistence;
pub mod state;
