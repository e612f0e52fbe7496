// Server module entry point
// Listener setup, accept loop, per-connection handling and signals

pub mod connection;
pub mod listener;
pub mod signal;

// `loop` is a keyword, so the module is named server_loop
#[path = "loop.rs"]
pub mod server_loop;

pub use signal::start_signal_handler;
pub use server_loop::run;
