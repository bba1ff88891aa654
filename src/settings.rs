use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::SettingsError;

/// The external switch configuration: a map from switch display names to
/// level strings.
///
/// Read when a switch is created or [`refresh`](crate::SourceSwitch::refresh)ed,
/// never polled.
///
/// The TOML shape is a single `[switches]` table:
///
/// ```toml
/// [switches]
/// "app.db" = "Warning"
/// "app.net" = "Verbose"
/// ```
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Settings {
    #[serde(default)]
    switches: BTreeMap<String, String>,
}

impl Settings {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a TOML configuration document.
    pub fn from_toml(doc: &str) -> Result<Self, SettingsError> {
        Ok(toml::from_str(doc)?)
    }

    /// The configured value for a switch, if any.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.switches.get(name).map(String::as_str)
    }

    pub fn set(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.switches.insert(name.into(), value.into());
    }

    pub fn remove(&mut self, name: &str) -> Option<String> {
        self.switches.remove(name)
    }

    pub fn is_empty(&self) -> bool {
        self.switches.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_switch_table() {
        let settings = Settings::from_toml(
            r#"
            [switches]
            "app.db" = "Warning"
            "app.net" = "4"
            "#,
        )
        .unwrap();

        assert_eq!(settings.get("app.db"), Some("Warning"));
        assert_eq!(settings.get("app.net"), Some("4"));
        assert_eq!(settings.get("app.missing"), None);
    }

    #[test]
    fn empty_document_is_empty_settings() {
        let settings = Settings::from_toml("").unwrap();

        assert!(settings.is_empty());
    }

    #[test]
    fn malformed_document_is_an_error() {
        assert!(Settings::from_toml("[switches").is_err());
    }
}
