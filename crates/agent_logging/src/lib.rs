#![deny(missing_docs)]
//! Shared logging utilities for the QA agent workspace.
//!
//! This crate provides the `agent_*` logging macros used across the codebase,
//! a helper for logging bounded excerpts of large texts (prompts, model
//! output, file contents) and a minimal test initializer for the global logger.

/// Marker appended to excerpts that were cut short.
pub const ELLIPSIS: &str = "…";

/// Returns at most `max_chars` characters of `text` on a single line.
///
/// Newlines are replaced with `⏎` so that a multi-line prompt or script
/// does not break the one-record-per-line layout of the log file.
pub fn excerpt(text: &str, max_chars: usize) -> String {
    let mut out = String::with_capacity(max_chars.min(text.len()) + ELLIPSIS.len());
    for (taken, ch) in text.chars().enumerate() {
        if taken == max_chars {
            out.push_str(ELLIPSIS);
            return out;
        }
        out.push(if ch == '\n' { '⏎' } else { ch });
    }
    out
}

/// Logs a trace-level message using the global logging facade.
#[macro_export]
macro_rules! agent_trace {
    ($($arg:tt)*) => {{
        log::trace!($($arg)*);
    }};
}

/// Logs an info-level message using the global logging facade.
#[macro_export]
macro_rules! agent_info {
    ($($arg:tt)*) => {{
        log::info!($($arg)*);
    }};
}

/// Logs a debug-level message using the global logging facade.
#[macro_export]
macro_rules! agent_debug {
    ($($arg:tt)*) => {{
        log::debug!($($arg)*);
    }};
}

/// Logs a warn-level message using the global logging facade.
#[macro_export]
macro_rules! agent_warn {
    ($($arg:tt)*) => {{
        log::warn!($($arg)*);
    }};
}

/// Logs an error-level message using the global logging facade.
#[macro_export]
macro_rules! agent_error {
    ($($arg:tt)*) => {{
        log::error!($($arg)*);
    }};
}

/// Initializes a simple terminal logger for use in unit tests.
///
/// This safely no-ops if another logger has already been initialized.
pub fn initialize_for_tests() {
    use simplelog::{ColorChoice, CombinedLogger, Config, TermLogger, TerminalMode};

    // Use debug level in debug builds, info in release builds.
    let level = if cfg!(debug_assertions) {
        log::LevelFilter::Debug
    } else {
        log::LevelFilter::Info
    };

    // Ignore the error if a logger was already set by another test.
    let _ = CombinedLogger::init(vec![TermLogger::new(
        level,
        Config::default(),
        TerminalMode::Mixed,
        ColorChoice::Auto,
    )]);
}

#[cfg(test)]
mod tests {
    use super::{excerpt, ELLIPSIS};

    #[test]
    fn short_text_is_kept() {
        assert_eq!(excerpt("hello", 10), "hello");
    }

    #[test]
    fn long_text_is_cut_on_char_boundary() {
        let cut = excerpt("åäöåäö", 3);
        assert_eq!(cut, format!("åäö{ELLIPSIS}"));
    }

    #[test]
    fn newlines_are_flattened() {
        assert_eq!(excerpt("a\nb", 10), "a⏎b");
    }
}
