//! Colorized console output.
//!
//! Color scheme: green for success and added lines, red for errors and
//! removed lines, yellow for notices, cyan for hunk headers and version
//! numbers.

use crossterm::style::Stylize;

pub fn success(message: &str) {
    println!("{}", message.to_string().green());
}

pub fn notice(message: &str) {
    println!("{}", message.to_string().yellow());
}

pub fn error(message: &str) {
    eprintln!("{}", message.to_string().red());
}

/// Print a rendered patch, coloring each line by its unified-diff prefix.
pub fn patch(text: &str) {
    for line in text.lines() {
        if line.starts_with("@@") {
            println!("{}", line.to_string().cyan());
        } else if line.starts_with("+++") || line.starts_with('+') {
            println!("{}", line.to_string().green());
        } else if line.starts_with("---") || line.starts_with('-') {
            println!("{}", line.to_string().red());
        } else {
            println!("{line}");
        }
    }
}
