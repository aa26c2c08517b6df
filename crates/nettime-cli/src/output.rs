//! Output formatting helpers.
//!
//! Results go to stdout as JSON; status lines go to stderr.

use anyhow::Result;
use colored::Colorize;
use serde::Serialize;

/// Print a success status line.
pub fn success(msg: &str) {
    eprintln!("{} {}", "✓".green(), msg);
}

/// Print a dimmed progress line.
pub fn progress(msg: &str) {
    eprintln!("{}", msg.dimmed());
}

/// Print a labeled field.
pub fn field(label: &str, value: &str) {
    eprintln!("{}: {}", label.dimmed(), value);
}

/// Print a result as JSON, compact unless `pretty`.
pub fn json<T: Serialize>(value: &T, pretty: bool) -> Result<()> {
    let json = if pretty {
        serde_json::to_string_pretty(value)?
    } else {
        serde_json::to_string(value)?
    };
    println!("{json}");
    Ok(())
}
