//! # Pass Scan
//!
//! This crate provides the core of the Ikon pass availability watcher: the
//! availability data model and extractor, the SMS notifier, the account
//! session, and the polling loop that ties them together.

/// Types for watch operations
mod watch_types;
pub use watch_types::*;

/// Availability payload model and the extraction rule
mod availability;
pub use availability::*;

/// Report composition and SMS fan-out
mod notifier;
pub use notifier::*;

/// Logged-in session against the account site
mod session_manager;
pub use session_manager::*;

/// Client for the reservation-availability endpoint
mod ikon_client;
pub use ikon_client::*;

/// The fetch → extract → notify polling loop
mod watcher;
pub use watcher::*;
