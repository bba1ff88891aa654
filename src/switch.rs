use std::sync::atomic::{AtomicBool, AtomicU8, Ordering};

use crate::{
    level::{EventKind, SourceLevel},
    settings::Settings,
};

/// A named, leveled switch deciding which events a source emits.
///
/// The level is read before every emission decision and may be changed at
/// any time; [`refresh`](SourceSwitch::refresh) is the resynchronization
/// hook that re-reads the externally configured value. A missing,
/// unparsable, or negative configured value degrades to
/// [`SourceLevel::Off`] — switch construction never fails.
pub struct SourceSwitch {
    name: String,
    description: String,
    level: AtomicU8,
}

impl SourceSwitch {
    /// A switch at level `Off`.
    pub fn new(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self::with_level(name, description, SourceLevel::Off)
    }

    pub fn with_level(
        name: impl Into<String>,
        description: impl Into<String>,
        level: SourceLevel,
    ) -> Self {
        SourceSwitch {
            name: name.into(),
            description: description.into(),
            level: AtomicU8::new(level.to_bits()),
        }
    }

    /// A switch initialized from its configured value, `Off` when absent
    /// or unrecognized.
    pub fn from_settings(
        name: impl Into<String>,
        description: impl Into<String>,
        settings: &Settings,
    ) -> Self {
        let switch = Self::new(name, description);
        switch.refresh(settings);

        switch
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn level(&self) -> SourceLevel {
        SourceLevel::from_bits(self.level.load(Ordering::Relaxed))
    }

    pub fn set_level(&self, level: SourceLevel) {
        self.level.store(level.to_bits(), Ordering::Relaxed);
    }

    /// Re-read this switch's configured value by display name.
    pub fn refresh(&self, settings: &Settings) {
        let level = settings
            .get(&self.name)
            .map(SourceLevel::from_setting)
            .unwrap_or(SourceLevel::Off);

        self.set_level(level);
    }

    /// Decide whether an event of the given kind passes this switch.
    pub fn should_trace(&self, kind: EventKind) -> bool {
        self.level().should_trace(kind)
    }
}

/// An on/off switch.
///
/// Its configured value parses as a boolean or an integer (non-zero means
/// enabled); anything else degrades to disabled.
pub struct BooleanSwitch {
    name: String,
    description: String,
    enabled: AtomicBool,
}

impl BooleanSwitch {
    /// A disabled switch.
    pub fn new(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self::with_enabled(name, description, false)
    }

    pub fn with_enabled(
        name: impl Into<String>,
        description: impl Into<String>,
        enabled: bool,
    ) -> Self {
        BooleanSwitch {
            name: name.into(),
            description: description.into(),
            enabled: AtomicBool::new(enabled),
        }
    }

    pub fn from_settings(
        name: impl Into<String>,
        description: impl Into<String>,
        settings: &Settings,
    ) -> Self {
        let switch = Self::new(name, description);
        switch.refresh(settings);

        switch
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn enabled(&self) -> bool {
        self.enabled.load(Ordering::Relaxed)
    }

    pub fn set_enabled(&self, enabled: bool) {
        self.enabled.store(enabled, Ordering::Relaxed);
    }

    pub fn refresh(&self, settings: &Settings) {
        let enabled = settings
            .get(&self.name)
            .map(parse_enabled)
            .unwrap_or(false);

        self.set_enabled(enabled);
    }
}

fn parse_enabled(value: &str) -> bool {
    let trimmed = value.trim();

    if let Ok(flag) = trimmed.to_ascii_lowercase().parse::<bool>() {
        return flag;
    }

    trimmed.parse::<i64>().map(|n| n != 0).unwrap_or(false)
}
