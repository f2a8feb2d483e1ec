//! Constants used throughout the CLI.

/// Exit codes for the CLI.
///
/// These follow common Unix conventions:
/// - 0: Success
/// - 1: General error (used by anyhow for unhandled errors)
/// - 2: Misuse of shell command (reserved by shells)
/// - 3+: Application-specific errors
pub mod exit_codes {
    /// No account matched the given id or filter.
    pub const NOT_FOUND: i32 = 3;

    /// Invalid user input or arguments.
    pub const INVALID_INPUT: i32 = 4;
}

/// Collection used when none is configured.
pub const DEFAULT_COLLECTION: &str = "accounts";

/// Database file name under the data directory.
pub const DEFAULT_DB_FILENAME: &str = "coinbank.db";
