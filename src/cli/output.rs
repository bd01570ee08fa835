//! CLI output formatting utilities

use colored::{ColoredString, Colorize};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tone {
    Success,
    Error,
    Warn,
    Info,
}

impl Tone {
    fn marker(self) -> ColoredString {
        match self {
            Tone::Success => "✓".green(),
            Tone::Error => "✗".red(),
            Tone::Warn => "⚠".yellow(),
            Tone::Info => "ℹ".blue(),
        }
    }
}

/// Print a message prefixed with its marker; errors go to stderr
pub fn say(tone: Tone, message: &str) {
    match tone {
        Tone::Error => eprintln!("{} {}", tone.marker(), message),
        _ => println!("{} {}", tone.marker(), message),
    }
}

pub fn success(message: &str) {
    say(Tone::Success, message);
}

pub fn error(message: &str) {
    say(Tone::Error, message);
}

pub fn warn(message: &str) {
    say(Tone::Warn, message);
}

pub fn info(message: &str) {
    say(Tone::Info, message);
}

/// Startup summary for `genstudio serve`
pub fn print_server_banner(host: &str, port: u16, storage: &str) {
    println!("{}", "genstudio".bold());
    println!("  {} http://{}:{}", "listening".dimmed(), host, port);
    println!("  {} {}", "storage".dimmed(), storage);
    println!("  {} /v1/auth, /v1/generate", "routes".dimmed());
}
