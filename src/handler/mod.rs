//! Request handling module
//!
//! One catch-all handler per instance: static file resolution or proxy
//! forwarding, depending on the configured mode.

pub mod proxy;
pub mod router;
pub mod static_files;

pub use router::{handle_request, InstanceState};
