// Server module entry
// Listener construction and the per-instance accept loop

pub mod instance;
pub mod listener;

pub use instance::run_instance;
pub use listener::create_reusable_listener;
