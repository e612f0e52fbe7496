//! Request handler module
//!
//! Turns raw request bytes into a reply and, when the requested file exists,
//! the path to launch.

pub mod files;
pub mod router;

// Re-export main entry point
pub use router::{handle_request, RequestOutcome};
