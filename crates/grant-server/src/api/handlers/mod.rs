//! API request handlers

pub mod interactions;

pub use interactions::{handle_interaction, AppState, SIGNATURE_HEADER, TIMESTAMP_HEADER};
