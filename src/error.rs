use thiserror::Error;

/// Failures surfaced by the tracing facility.
///
/// Configuration problems never appear here; a switch built from a missing
/// or unparsable setting degrades to its least-verbose state instead of
/// failing.
#[derive(Debug, Error, PartialEq, Eq)]
#[non_exhaustive]
pub enum TraceError {
    /// A trace source was constructed with an empty name.
    #[error("trace source name must not be empty")]
    EmptyName,
    /// [`stop_logical_operation`](crate::CorrelationManager::stop_logical_operation)
    /// was called with no operation in flight.
    #[error("no logical operation to stop")]
    EmptyOperationStack,
}

/// A level string that failed strict parsing.
///
/// Only produced by [`FromStr`](core::str::FromStr) on
/// [`SourceLevel`](crate::SourceLevel). Switch construction from settings
/// maps this to `Off` rather than surfacing it.
#[derive(Debug, Error, PartialEq, Eq)]
#[error("`{value}` is not a valid trace level")]
pub struct ParseLevelError {
    pub(crate) value: String,
}

impl ParseLevelError {
    /// The string that was rejected.
    pub fn value(&self) -> &str {
        &self.value
    }
}

/// Failures reading the external switch configuration document.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum SettingsError {
    /// The document wasn't valid TOML or didn't match the expected shape.
    #[error("malformed settings document")]
    Toml(#[from] toml::de::Error),
}
