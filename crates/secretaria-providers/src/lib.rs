//! # secretaria-providers
//!
//! Language-model backend implementations.

pub mod ollama;

pub use ollama::OllamaProvider;
