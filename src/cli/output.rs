//! Terminal rendering helpers shared by the commands
//!
//! Colors are switched off by `colored` when NO_COLOR is set or stdout
//! is not a terminal.

/// Styles used for load progress and reports
pub mod colors {
    use colored::{ColoredString, Colorize};
    use std::fmt::Display;

    /// Section headers and index names
    pub fn label(s: &str) -> ColoredString {
        s.bold()
    }

    /// Dataset roots and config files
    pub fn file_path(s: &str) -> ColoredString {
        s.cyan()
    }

    pub fn number(s: &str) -> ColoredString {
        s.yellow()
    }

    /// Any displayable count, styled as a number
    pub fn count(n: impl Display) -> ColoredString {
        n.to_string().yellow()
    }

    pub fn success(s: &str) -> ColoredString {
        s.green()
    }

    pub fn warning(s: &str) -> ColoredString {
        s.yellow().bold()
    }

    pub fn error(s: &str) -> ColoredString {
        s.red().bold()
    }

    /// Defaults and other secondary values
    pub fn dim(s: &str) -> ColoredString {
        s.dimmed()
    }
}

const BYTE_UNITS: [&str; 3] = ["KB", "MB", "GB"];

/// Size of a payload or dataset in binary units (`1.5 MB`)
pub fn format_bytes(bytes: u64) -> String {
    if bytes < 1024 {
        return format!("{bytes} B");
    }

    let mut value = bytes as f64 / 1024.0;
    let mut unit = 0;
    while value >= 1024.0 && unit + 1 < BYTE_UNITS.len() {
        value /= 1024.0;
        unit += 1;
    }
    format!("{value:.1} {}", BYTE_UNITS[unit])
}

/// Elapsed time, from milliseconds up to hours
pub fn format_duration(secs: f64) -> String {
    if secs < 1.0 {
        return format!("{:.0}ms", secs * 1000.0);
    }
    if secs < 60.0 {
        return format!("{secs:.2}s");
    }

    let whole_minutes = (secs / 60.0).floor();
    if whole_minutes < 60.0 {
        let rest = secs - whole_minutes * 60.0;
        return format!("{whole_minutes:.0}m {rest:.1}s");
    }

    let hours = (whole_minutes / 60.0).floor();
    let minutes = whole_minutes - hours * 60.0;
    format!("{hours:.0}h {minutes:.0}m")
}

pub fn print_warning(message: &str) {
    eprintln!("{}: {message}", colors::warning("Warning"));
}

pub fn print_error(message: &str) {
    eprintln!("{}: {message}", colors::error("Error"));
}
