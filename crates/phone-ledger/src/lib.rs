//! Phone Ledger - phone number records with image-based bulk intake.
//!
//! This service:
//! - Keeps phone number records with usage history, persisted as JSON snapshots
//! - Extracts numbers from uploaded images through Gemini
//! - Holds extracted numbers per client until they are reviewed and confirmed

pub mod api;
pub mod config;
pub mod error;
pub mod extract;

pub use config::Config;
pub use error::LedgerError;
pub use extract::PhoneExtractor;
