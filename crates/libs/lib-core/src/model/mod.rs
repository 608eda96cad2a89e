//! # Model Layer
//!
//! Durable entities and their repositories.

pub mod store;
