//! Core business logic for campus-messages.

pub mod services;

pub use services::*;
