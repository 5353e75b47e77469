//! Command handlers for the Atlas CLI

pub mod register;
pub mod reset;
pub mod shell;

use std::io::Write;

/// Prints a label and reads one trimmed line from stdin.
pub fn prompt(label: &str) -> anyhow::Result<String> {
    print!("{label}: ");
    std::io::stdout().flush()?;

    let mut input = String::new();
    std::io::stdin().read_line(&mut input)?;
    Ok(input.trim().to_string())
}
