//! CLI error types for structured error handling.
//!
//! This module provides typed errors that map to specific exit codes,
//! enabling consistent error handling across the CLI.

use std::fmt;

use coinbank_core::CoinbankError;

/// CLI-specific errors with associated exit codes.
#[derive(Debug)]
pub enum CliError {
    /// No account matched
    NotFound { message: String, hint: String },

    /// Invalid user input (ids, filters, updates, amounts)
    InvalidInput(String),
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CliError::NotFound { message, hint } => write!(f, "{}\n{}", message, hint),
            CliError::InvalidInput(message) => write!(f, "{}", message),
        }
    }
}

impl std::error::Error for CliError {}

impl CliError {
    /// Create a NotFound error with message and hint.
    pub fn not_found(message: impl Into<String>, hint: impl Into<String>) -> Self {
        CliError::NotFound {
            message: message.into(),
            hint: hint.into(),
        }
    }

    pub fn invalid_input(message: impl Into<String>) -> Self {
        CliError::InvalidInput(message.into())
    }

    /// Map core errors that are the user's fault; everything else stays generic.
    pub fn from_core(err: &CoinbankError) -> Option<Self> {
        match err {
            CoinbankError::InvalidInput(message) | CoinbankError::Validation(message) => {
                Some(CliError::invalid_input(message.clone()))
            }
            CoinbankError::Storage(_) => None,
        }
    }

    /// Get the exit code for this error.
    pub fn exit_code(&self) -> i32 {
        use super::constants::exit_codes;
        match self {
            CliError::NotFound { .. } => exit_codes::NOT_FOUND,
            CliError::InvalidInput(_) => exit_codes::INVALID_INPUT,
        }
    }

    /// Print error message to stderr and exit with appropriate code.
    pub fn exit(&self) -> ! {
        eprintln!("Error: {}", self);
        std::process::exit(self.exit_code())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::exit_codes;

    #[test]
    fn test_exit_codes() {
        assert_eq!(
            CliError::not_found("missing", "hint").exit_code(),
            exit_codes::NOT_FOUND
        );
        assert_eq!(
            CliError::invalid_input("bad").exit_code(),
            exit_codes::INVALID_INPUT
        );
    }

    #[test]
    fn test_from_core_maps_user_errors_only() {
        let invalid = CoinbankError::InvalidInput("bad filter".to_string());
        assert!(matches!(
            CliError::from_core(&invalid),
            Some(CliError::InvalidInput(_))
        ));

        let storage = CoinbankError::Storage("disk".to_string());
        assert!(CliError::from_core(&storage).is_none());
    }
}
