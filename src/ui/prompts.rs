// UI prompts and user interaction module

use colored::Colorize;
use dialoguer::Input;
use std::io::{self, Write};

/// Ask for a required value, repeating until something non-blank is entered
pub fn prompt_required(prompt: &str) -> anyhow::Result<String> {
    loop {
        let input: String = Input::new().with_prompt(prompt).interact_text()?;

        let trimmed = input.trim();
        if !trimmed.is_empty() {
            return Ok(trimmed.to_string());
        }
        warn("A value is required");
    }
}

/// Print the session prompt without a newline
pub fn command_prompt() -> io::Result<()> {
    print!("{} ", "resmon>".white().bold());
    io::stdout().flush()
}

/// Display a warning message
pub fn warn(message: &str) {
    println!("{}", format!("Warning: {}", message).yellow().bold());
}

/// Display an info message
pub fn info(message: &str) {
    println!("{}", message.cyan());
}

/// Display a success message
pub fn success(message: &str) {
    println!("{}", message.green().bold());
}

/// Display an error message
pub fn error(message: &str) {
    eprintln!("{}", message.red().bold());
}

/// Display a dimmed/secondary message
pub fn dimmed(message: &str) {
    println!("{}", message.dimmed());
}
