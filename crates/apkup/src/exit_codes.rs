//! Exit codes for the CLI

use apkup_core::{ErrorKind, PublishError};

use crate::config::ConfigError;

/// General error
pub const ERROR: i32 = 1;

/// Configuration error
pub const CONFIG_ERROR: i32 = 2;

/// Validation error
pub const VALIDATION_ERROR: i32 = 5;

/// Credential error
pub const AUTH_ERROR: i32 = 6;

/// Error returned by Google Play
pub const REMOTE_ERROR: i32 = 7;

/// Map a command failure to its exit code
pub fn for_error(err: &anyhow::Error) -> i32 {
    if let Some(publish) = err.downcast_ref::<PublishError>() {
        return match publish.kind() {
            ErrorKind::Validation => VALIDATION_ERROR,
            ErrorKind::Auth => AUTH_ERROR,
            ErrorKind::Remote => REMOTE_ERROR,
            ErrorKind::Usage | ErrorKind::Internal => ERROR,
        };
    }

    if err.downcast_ref::<ConfigError>().is_some() {
        return CONFIG_ERROR;
    }

    ERROR
}
