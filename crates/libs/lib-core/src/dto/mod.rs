//! # Data Transfer Objects (DTOs)
//!
//! This module contains all data structures exchanged with clients, both over
//! the REST API and over the live-connection transport.

pub mod ai;
pub mod auth;
pub mod messaging;

pub use ai::*;
pub use auth::*;
pub use messaging::*;
