//! # secretaria-core
//!
//! Core types, traits, configuration, error handling, and the message
//! codec for the SecretarIA assistant.

pub mod config;
pub mod context;
pub mod crypto;
pub mod error;
pub mod message;
pub mod sanitize;
pub mod traits;
