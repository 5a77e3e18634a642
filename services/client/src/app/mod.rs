pub mod commands;
pub mod state;

// Re-export the shared state so the binary can build it in one import.
pub use state::AppState;
