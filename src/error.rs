//! Application error type.
//!
//! Every fatal condition carries the process exit code it maps to:
//!
//! - `2`: bad input or configuration (missing files/columns, rule tables, policy)
//! - `3`: an input file without any data rows
//! - `4`: output or internal failures
//!
//! Per-record problems are never `AppError`s; they are tallied by the cleaner.

use thiserror::Error;

#[derive(Clone, Error)]
#[error("{message}")]
pub struct AppError {
    exit_code: u8,
    message: String,
}

impl AppError {
    pub fn new(exit_code: u8, message: impl Into<String>) -> Self {
        Self {
            exit_code,
            message: message.into(),
        }
    }

    /// Input/configuration error (exit code 2).
    pub fn input(message: impl Into<String>) -> Self {
        Self::new(2, message)
    }

    /// Output/internal error (exit code 4).
    pub fn output(message: impl Into<String>) -> Self {
        Self::new(4, message)
    }

    pub fn exit_code(&self) -> u8 {
        self.exit_code
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl std::fmt::Debug for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppError")
            .field("exit_code", &self.exit_code)
            .field("message", &self.message)
            .finish()
    }
}
