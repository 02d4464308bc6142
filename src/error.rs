//! Shared error reporting plumbing.

/// Maps an error onto a stable, grepable code for CLI reporting and logs.
///
/// `retryable` marks failures a caller could reasonably run again, such as
/// catalog timeouts, as opposed to bad input or missing fonts.
pub trait ErrorCode: std::fmt::Display {
    fn error_code(&self) -> &'static str;

    fn retryable(&self) -> bool {
        false
    }
}
