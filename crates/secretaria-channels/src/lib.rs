//! # secretaria-channels
//!
//! Messaging transport for SecretarIA.

pub mod session_store;
pub mod whatsapp;
