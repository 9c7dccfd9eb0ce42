//! Application layer - Use cases orchestrating the domain through ports
//!
//! - Ports: storage, clock and identifier capabilities the services need
//! - Services: house and character rules, including the lord cascade
//! - DTOs: wire shapes for the HTTP boundary

pub mod dto;
pub mod ports;
pub mod services;
