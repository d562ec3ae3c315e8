use error_stack::Report;
use kernel::KernelError;

use crate::error::ConvertError;

pub mod client;
pub mod database;
pub mod error;

pub(crate) fn env(key: &str) -> error_stack::Result<String, KernelError> {
    dotenvy::var(key)
        .convert_error()
        .map_err(|report| report.attach_printable(format!("Failed to read {key}")))
}

/// Reads `key` and parses it, falling back to `default` when the variable is unset.
pub fn env_or<T>(key: &str, default: T) -> error_stack::Result<T, KernelError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    match dotenvy::var(key) {
        Ok(value) => value.trim().parse().map_err(|error: T::Err| {
            Report::new(KernelError::Internal)
                .attach_printable(format!("Invalid value {value:?} for {key}: {error}"))
        }),
        Err(dotenvy::Error::EnvVar(std::env::VarError::NotPresent)) => Ok(default),
        Err(error) => Err(error).convert_error(),
    }
}
