//! Core business logic for chirp.
//!
//! The message service composes the persistence-layer repositories into the
//! four operations a transport layer calls: create, point lookup, filtered
//! listing, and trend aggregation.

pub mod services;

pub use chirp_db::MessageFilter;
pub use chirp_db::repositories::TrendWindow;
pub use services::message::{CreateMessageInput, MessageDetail, MessageService};
