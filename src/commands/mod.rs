// Command handlers module
pub mod monitor;
pub mod session;

// Re-exports for cleaner imports
pub use monitor::execute as monitor;
pub use session::{Reply, SessionCommand, SessionController};
