//! Business logic services.

pub mod message;
