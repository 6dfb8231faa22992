//! # secretaria-memory
//!
//! SQLite-backed persistence for SecretarIA.

mod store;

pub use store::{
    format_minute, truncate_to_minute, DueReminder, Profile, Reminder, Store, StoredMessage, User,
};
