use core::{fmt, str::FromStr};

use crate::error::ParseLevelError;

/// The kind of a dispatched event.
///
/// The first five variants are the core severities, ordered by increasing
/// verbosity. The remaining five are activity-tracing kinds: they sit outside
/// the severity ladder and are gated by a separate bit on the switch level.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub enum EventKind {
    Critical,
    Error,
    Warning,
    Information,
    Verbose,
    Start,
    Stop,
    Suspend,
    Resume,
    Transfer,
}

impl EventKind {
    /// Every kind, core severities first.
    pub const ALL: [EventKind; 10] = [
        EventKind::Critical,
        EventKind::Error,
        EventKind::Warning,
        EventKind::Information,
        EventKind::Verbose,
        EventKind::Start,
        EventKind::Stop,
        EventKind::Suspend,
        EventKind::Resume,
        EventKind::Transfer,
    ];

    /// Position on the severity ladder, `None` for activity-tracing kinds.
    pub fn rank(self) -> Option<u8> {
        match self {
            EventKind::Critical => Some(1),
            EventKind::Error => Some(2),
            EventKind::Warning => Some(3),
            EventKind::Information => Some(4),
            EventKind::Verbose => Some(5),
            _ => None,
        }
    }

    /// Whether this is one of the activity-tracing kinds.
    pub fn is_activity(self) -> bool {
        self.rank().is_none()
    }

    /// The numeric wire code used by the XML envelope encoding.
    pub fn code(self) -> u16 {
        match self {
            EventKind::Critical => 1,
            EventKind::Error => 2,
            EventKind::Warning => 4,
            EventKind::Information => 8,
            EventKind::Verbose => 16,
            EventKind::Start => 256,
            EventKind::Stop => 512,
            EventKind::Suspend => 1024,
            EventKind::Resume => 2048,
            EventKind::Transfer => 4096,
        }
    }

    /// The canonical display name.
    pub fn name(self) -> &'static str {
        match self {
            EventKind::Critical => "Critical",
            EventKind::Error => "Error",
            EventKind::Warning => "Warning",
            EventKind::Information => "Information",
            EventKind::Verbose => "Verbose",
            EventKind::Start => "Start",
            EventKind::Stop => "Stop",
            EventKind::Suspend => "Suspend",
            EventKind::Resume => "Resume",
            EventKind::Transfer => "Transfer",
        }
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// The level held by a switch.
///
/// Enabling a level enables every core severity at least as severe.
/// `ActivityTracing` enables only the activity kinds; `All` enables
/// everything.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Default)]
pub enum SourceLevel {
    #[default]
    Off,
    Critical,
    Error,
    Warning,
    Information,
    Verbose,
    ActivityTracing,
    All,
}

impl SourceLevel {
    /// The most verbose core severity this level admits, as a rank.
    pub fn core_rank(self) -> u8 {
        match self {
            SourceLevel::Off | SourceLevel::ActivityTracing => 0,
            SourceLevel::Critical => 1,
            SourceLevel::Error => 2,
            SourceLevel::Warning => 3,
            SourceLevel::Information => 4,
            SourceLevel::Verbose | SourceLevel::All => 5,
        }
    }

    /// Whether activity-tracing kinds pass this level.
    pub fn activity_tracing(self) -> bool {
        matches!(self, SourceLevel::ActivityTracing | SourceLevel::All)
    }

    /// Decide whether an event of the given kind should be emitted.
    ///
    /// Core kinds pass when their rank does not exceed [`core_rank`](Self::core_rank);
    /// activity kinds pass exactly when [`activity_tracing`](Self::activity_tracing)
    /// holds.
    pub fn should_trace(self, kind: EventKind) -> bool {
        match kind.rank() {
            Some(rank) => rank <= self.core_rank(),
            None => self.activity_tracing(),
        }
    }

    /// Parse a configuration value, degrading to `Off` on anything
    /// unrecognized. Never fails.
    pub fn from_setting(value: &str) -> SourceLevel {
        value.parse().unwrap_or(SourceLevel::Off)
    }

    pub(crate) fn to_bits(self) -> u8 {
        match self {
            SourceLevel::Off => 0,
            SourceLevel::Critical => 1,
            SourceLevel::Error => 2,
            SourceLevel::Warning => 3,
            SourceLevel::Information => 4,
            SourceLevel::Verbose => 5,
            SourceLevel::ActivityTracing => 6,
            SourceLevel::All => 7,
        }
    }

    pub(crate) fn from_bits(bits: u8) -> SourceLevel {
        match bits {
            1 => SourceLevel::Critical,
            2 => SourceLevel::Error,
            3 => SourceLevel::Warning,
            4 => SourceLevel::Information,
            5 => SourceLevel::Verbose,
            6 => SourceLevel::ActivityTracing,
            7 => SourceLevel::All,
            _ => SourceLevel::Off,
        }
    }
}

impl fmt::Display for SourceLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            SourceLevel::Off => "Off",
            SourceLevel::Critical => "Critical",
            SourceLevel::Error => "Error",
            SourceLevel::Warning => "Warning",
            SourceLevel::Information => "Information",
            SourceLevel::Verbose => "Verbose",
            SourceLevel::ActivityTracing => "ActivityTracing",
            SourceLevel::All => "All",
        })
    }
}

impl FromStr for SourceLevel {
    type Err = ParseLevelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();

        if let Ok(rank) = trimmed.parse::<i64>() {
            return match rank {
                0 => Ok(SourceLevel::Off),
                1 => Ok(SourceLevel::Critical),
                2 => Ok(SourceLevel::Error),
                3 => Ok(SourceLevel::Warning),
                4 => Ok(SourceLevel::Information),
                5 => Ok(SourceLevel::Verbose),
                _ => Err(ParseLevelError { value: s.into() }),
            };
        }

        match trimmed.to_ascii_lowercase().as_str() {
            "off" => Ok(SourceLevel::Off),
            "critical" => Ok(SourceLevel::Critical),
            "error" => Ok(SourceLevel::Error),
            "warning" => Ok(SourceLevel::Warning),
            "information" => Ok(SourceLevel::Information),
            "verbose" => Ok(SourceLevel::Verbose),
            "activitytracing" => Ok(SourceLevel::ActivityTracing),
            "all" => Ok(SourceLevel::All),
            _ => Err(ParseLevelError { value: s.into() }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const CORE_LEVELS: [SourceLevel; 6] = [
        SourceLevel::Off,
        SourceLevel::Critical,
        SourceLevel::Error,
        SourceLevel::Warning,
        SourceLevel::Information,
        SourceLevel::Verbose,
    ];

    #[test]
    fn core_kinds_follow_rank_ordering() {
        for level in CORE_LEVELS {
            for kind in EventKind::ALL {
                if let Some(rank) = kind.rank() {
                    assert_eq!(
                        level.should_trace(kind),
                        rank <= level.core_rank(),
                        "{level} / {kind}"
                    );
                }
            }
        }
    }

    #[test]
    fn verbose_and_activity_tracing_partition_the_kinds() {
        for kind in EventKind::ALL {
            assert_eq!(SourceLevel::Verbose.should_trace(kind), !kind.is_activity());
            assert_eq!(
                SourceLevel::ActivityTracing.should_trace(kind),
                kind.is_activity()
            );
        }
    }

    #[test]
    fn all_admits_everything_and_off_nothing() {
        for kind in EventKind::ALL {
            assert!(SourceLevel::All.should_trace(kind));
            assert!(!SourceLevel::Off.should_trace(kind));
        }
    }

    #[test]
    fn parse_accepts_names_and_ranks() {
        assert_eq!("Warning".parse(), Ok(SourceLevel::Warning));
        assert_eq!("verbose".parse(), Ok(SourceLevel::Verbose));
        assert_eq!("ActivityTracing".parse(), Ok(SourceLevel::ActivityTracing));
        assert_eq!("3".parse(), Ok(SourceLevel::Warning));
        assert_eq!("0".parse(), Ok(SourceLevel::Off));
    }

    #[test]
    fn parse_rejects_garbage_and_negatives() {
        assert!("chatty".parse::<SourceLevel>().is_err());
        assert!("-1".parse::<SourceLevel>().is_err());
        assert!("6".parse::<SourceLevel>().is_err());
    }

    #[test]
    fn from_setting_degrades_to_off() {
        assert_eq!(SourceLevel::from_setting("chatty"), SourceLevel::Off);
        assert_eq!(SourceLevel::from_setting("-1"), SourceLevel::Off);
        assert_eq!(SourceLevel::from_setting("Error"), SourceLevel::Error);
    }

    #[test]
    fn bits_roundtrip() {
        for level in [
            SourceLevel::Off,
            SourceLevel::Critical,
            SourceLevel::Error,
            SourceLevel::Warning,
            SourceLevel::Information,
            SourceLevel::Verbose,
            SourceLevel::ActivityTracing,
            SourceLevel::All,
        ] {
            assert_eq!(SourceLevel::from_bits(level.to_bits()), level);
        }
    }
}
