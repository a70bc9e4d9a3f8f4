//! ui::output
//!
//! Console output for the `pb` binary.
//!
//! # Design
//!
//! Results go to stdout; warnings, errors and debug notes go to stderr.
//! Everything except errors respects the quiet flag.

use std::fmt::Display;

use chrono::{DateTime, Utc};

/// How much the binary prints.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verbosity {
    Quiet,
    Normal,
    Debug,
}

impl Verbosity {
    /// `--quiet` wins over `--debug`.
    pub fn from_flags(quiet: bool, debug: bool) -> Self {
        if quiet {
            Verbosity::Quiet
        } else if debug {
            Verbosity::Debug
        } else {
            Verbosity::Normal
        }
    }
}

/// Result line on stdout, suppressed by `--quiet`.
pub fn print(message: impl Display, verbosity: Verbosity) {
    if verbosity != Verbosity::Quiet {
        println!("{}", message);
    }
}

/// Diagnostic note on stderr, shown with `--debug` only.
pub fn debug(message: impl Display, verbosity: Verbosity) {
    if verbosity == Verbosity::Debug {
        eprintln!("[debug] {}", message);
    }
}

/// Error line on stderr, never suppressed.
pub fn error(message: impl Display) {
    eprintln!("error: {}", message);
}

/// Warning line on stderr, suppressed by `--quiet`.
pub fn warn(message: impl Display, verbosity: Verbosity) {
    if verbosity != Verbosity::Quiet {
        eprintln!("warning: {}", message);
    }
}

/// Format a list of items.
pub fn format_list<T: Display>(items: &[T], prefix: &str) -> String {
    items
        .iter()
        .map(|item| format!("{}{}", prefix, item))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Compact age of a timestamp relative to `now`, e.g. `45s`, `3h`, `12D`.
///
/// Future timestamps read as `0s`.
pub fn format_age(then: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let secs = (now - then).num_seconds().max(0);
    match secs {
        s if s < 60 => format!("{}s", s),
        s if s < 3_600 => format!("{}m", s / 60),
        s if s < 86_400 => format!("{}h", s / 3_600),
        s if s < 86_400 * 365 => format!("{}D", s / 86_400),
        s => format!("{}Y", s / (86_400 * 365)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn verbosity_from_flags() {
        assert_eq!(Verbosity::from_flags(true, true), Verbosity::Quiet);
        assert_eq!(Verbosity::from_flags(false, true), Verbosity::Debug);
        assert_eq!(Verbosity::from_flags(false, false), Verbosity::Normal);
    }

    #[test]
    fn age_units() {
        let now = Utc::now();
        assert_eq!(format_age(now - Duration::seconds(5), now), "5s");
        assert_eq!(format_age(now - Duration::minutes(3), now), "3m");
        assert_eq!(format_age(now - Duration::hours(2), now), "2h");
        assert_eq!(format_age(now - Duration::days(4), now), "4D");
        assert_eq!(format_age(now + Duration::days(1), now), "0s");
    }

    #[test]
    fn list_prefixes_each_line() {
        assert_eq!(format_list(&["a", "b"], "- "), "- a\n- b");
    }
}
