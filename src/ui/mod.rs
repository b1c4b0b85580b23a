// UI and formatting module

pub mod prompts;

// Re-export commonly used items for cleaner imports
pub use prompts::{command_prompt, dimmed, error, info, prompt_required, success, warn};
