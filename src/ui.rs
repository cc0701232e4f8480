//! One-line prefixed diagnostics and interactive prompts.
//!
//! Every fatal condition elsewhere in the tool is reported through
//! these helpers so the operator always sees the same `err:` /
//! `warning:` / `notice:` prefixes.

use std::io::{self, Write};

use anyhow::Result;

pub fn display_error(message: &str) {
    eprintln!("\x1b[31merr:\x1b[0m {}", message); // Red color
}

pub fn display_warning(message: &str) {
    println!("\x1b[33mwarning:\x1b[0m {}", message); // Yellow color
}

pub fn display_notice(message: &str) {
    println!("\x1b[32mnotice:\x1b[0m {}", message); // Green color
}

/// Prompt the operator to type a version string.
///
/// Lists the known version tags (already sorted by version order) and
/// reads one line from stdin. The typed value may carry the `v` tag
/// prefix or not; the caller normalizes it.
pub fn prompt_version(label: &str, known_tags: &[String]) -> Result<String> {
    if known_tags.is_empty() {
        println!("\n\x1b[1mNo version tags found in this repository.\x1b[0m");
    } else {
        println!("\n\x1b[1mKnown version tags:\x1b[0m");
        for tag in known_tags {
            println!("  {}", tag);
        }
    }

    print!("\nEnter the {} version: ", label);
    io::stdout().flush()?;

    let mut input = String::new();
    io::stdin().read_line(&mut input)?;
    let value = input.trim().to_string();

    if value.is_empty() {
        Err(anyhow::anyhow!("no {} version given", label))
    } else {
        Ok(value)
    }
}
