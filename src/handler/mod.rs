//! Request handler module
//!
//! Routes requests to the dashboard page, static assets, the health probe
//! and the JSON API.

pub mod index;
pub mod router;
pub mod static_files;

// Re-export main entry point
pub use router::{dispatch, handle_request, RequestContext};
