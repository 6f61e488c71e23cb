//! Shared building blocks for the lockdown communication workspace.
//!
//! Everything here is domain-neutral: error location capture used by every
//! error enum in the workspace, and a secret wrapper that keeps passwords out
//! of logs.

pub mod error;
pub mod redacted_secret;


pub use error::error_location::ErrorLocation;
pub use redacted_secret::RedactedSecret;
