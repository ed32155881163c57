//! Workout configuration.
//!
//! The configuration is live: the controller re-reads it at fresh starts,
//! resets and round boundaries, so edits made mid-workout take effect at the
//! next boundary. Raw user input is parsed here and invalid values are
//! replaced by the field's default instead of being propagated.

mod error;

pub use error::ConfigError;

use serde::{Deserialize, Serialize};

use crate::types::format_clock;

/// Countdown length used when the input is blank or invalid.
pub const DEFAULT_COUNTDOWN_MINUTES: u32 = 10;

/// Round length used when the input is blank or invalid.
pub const DEFAULT_ROUND_MINUTES: u32 = 1;

/// Round count used when the input is blank or invalid.
pub const DEFAULT_TOTAL_ROUNDS: u32 = 10;

// ============================================================================
// ConfigField
// ============================================================================

/// An editable configuration field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum ConfigField {
    /// Countdown length in minutes (fractions allowed)
    #[value(alias = "minutes")]
    CountdownMinutes,
    /// Round length in minutes
    RoundMinutes,
    /// Number of rounds
    #[value(alias = "rounds")]
    TotalRounds,
}

impl ConfigField {
    /// Returns the string representation of the field.
    pub fn as_str(&self) -> &'static str {
        match self {
            ConfigField::CountdownMinutes => "countdown_minutes",
            ConfigField::RoundMinutes => "round_minutes",
            ConfigField::TotalRounds => "total_rounds",
        }
    }
}

impl std::fmt::Display for ConfigField {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// Parsing
// ============================================================================

/// Parses countdown minutes into whole seconds.
///
/// Fractional minutes are accepted ("2.5" is 150 seconds) and rounded to
/// whole seconds, never below one.
pub fn parse_countdown_seconds(raw: &str) -> Result<u32, ConfigError> {
    let field = ConfigField::CountdownMinutes;
    let input = raw.trim();
    if input.is_empty() {
        return Err(ConfigError::Blank(field));
    }

    let minutes: f64 = input
        .parse()
        .map_err(|_| ConfigError::NotANumber(field, input.to_string()))?;
    if !minutes.is_finite() {
        return Err(ConfigError::NotANumber(field, input.to_string()));
    }

    if minutes <= 0.0 {
        return Err(ConfigError::NotPositive(field, input.to_string()));
    }

    // Tiny positive inputs still run for one second.
    let seconds = (minutes * 60.0).round().max(1.0);
    if seconds > f64::from(u32::MAX) {
        return Err(ConfigError::OutOfRange(field, input.to_string()));
    }

    Ok(seconds as u32)
}

/// Parses a strictly positive integer field.
pub fn parse_positive(field: ConfigField, raw: &str) -> Result<u32, ConfigError> {
    let input = raw.trim();
    if input.is_empty() {
        return Err(ConfigError::Blank(field));
    }

    let value: i64 = input
        .parse()
        .map_err(|_| ConfigError::NotANumber(field, input.to_string()))?;
    if value <= 0 {
        return Err(ConfigError::NotPositive(field, input.to_string()));
    }

    u32::try_from(value).map_err(|_| ConfigError::OutOfRange(field, input.to_string()))
}

// ============================================================================
// WorkoutConfig
// ============================================================================

/// Result of applying a raw edit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppliedEdit {
    /// Field that changed
    pub field: ConfigField,
    /// Effective value stored, in the field's unit
    pub value: u32,
    /// Why the raw input was replaced by the default, if it was
    pub fallback: Option<ConfigError>,
}

impl AppliedEdit {
    /// Formats the stored value for display: `MM:SS` for the countdown,
    /// the plain number otherwise.
    pub fn display_value(&self) -> String {
        match self.field {
            ConfigField::CountdownMinutes => format_clock(u64::from(self.value)),
            ConfigField::RoundMinutes | ConfigField::TotalRounds => self.value.to_string(),
        }
    }
}

/// Live configuration read by the mode policies.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkoutConfig {
    countdown_seconds: u32,
    round_minutes: u32,
    total_rounds: u32,
}

impl Default for WorkoutConfig {
    fn default() -> Self {
        Self {
            countdown_seconds: DEFAULT_COUNTDOWN_MINUTES * 60,
            round_minutes: DEFAULT_ROUND_MINUTES,
            total_rounds: DEFAULT_TOTAL_ROUNDS,
        }
    }
}

impl WorkoutConfig {
    /// Sets the countdown length in whole minutes.
    #[must_use]
    pub fn with_countdown_minutes(mut self, minutes: u32) -> Self {
        self.countdown_seconds = minutes.max(1).saturating_mul(60);
        self
    }

    /// Sets the round length in minutes.
    #[must_use]
    pub fn with_round_minutes(mut self, minutes: u32) -> Self {
        self.round_minutes = minutes.max(1);
        self
    }

    /// Sets the number of rounds.
    #[must_use]
    pub fn with_total_rounds(mut self, rounds: u32) -> Self {
        self.total_rounds = rounds.max(1);
        self
    }

    /// Countdown length in seconds.
    pub fn countdown_seconds(&self) -> i64 {
        i64::from(self.countdown_seconds)
    }

    /// Round length in minutes.
    pub fn round_minutes(&self) -> u32 {
        self.round_minutes
    }

    /// Round length in seconds.
    pub fn round_length_seconds(&self) -> i64 {
        i64::from(self.round_minutes) * 60
    }

    /// Number of rounds.
    pub fn total_rounds(&self) -> u32 {
        self.total_rounds
    }

    /// Applies raw user input to a field.
    ///
    /// Invalid input is never rejected: the field's default is stored and the
    /// parse error is returned in [`AppliedEdit::fallback`].
    pub fn apply_edit(&mut self, field: ConfigField, raw: &str) -> AppliedEdit {
        let (value, fallback) = match field {
            ConfigField::CountdownMinutes => match parse_countdown_seconds(raw) {
                Ok(seconds) => {
                    self.countdown_seconds = seconds;
                    (seconds, None)
                }
                Err(e) => {
                    self.countdown_seconds = DEFAULT_COUNTDOWN_MINUTES * 60;
                    (self.countdown_seconds, Some(e))
                }
            },
            ConfigField::RoundMinutes => {
                let (value, fallback) = resolve(field, raw, DEFAULT_ROUND_MINUTES);
                self.round_minutes = value;
                (value, fallback)
            }
            ConfigField::TotalRounds => {
                let (value, fallback) = resolve(field, raw, DEFAULT_TOTAL_ROUNDS);
                self.total_rounds = value;
                (value, fallback)
            }
        };

        match &fallback {
            Some(e) if e.is_blank() => tracing::debug!("{} left blank, using default", field),
            Some(e) => tracing::warn!("Invalid {} input, using default: {}", field, e),
            None => tracing::debug!("Config {} set to {}", field, value),
        }

        AppliedEdit {
            field,
            value,
            fallback,
        }
    }
}

fn resolve(field: ConfigField, raw: &str, default: u32) -> (u32, Option<ConfigError>) {
    match parse_positive(field, raw) {
        Ok(value) => (value, None),
        Err(e) => (default, Some(e)),
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    mod parse_tests {
        use super::*;

        #[test]
        fn test_countdown_whole_minutes() {
            assert_eq!(parse_countdown_seconds("5"), Ok(300));
        }

        #[test]
        fn test_countdown_fractional_minutes() {
            assert_eq!(parse_countdown_seconds("2.5"), Ok(150));
            assert_eq!(parse_countdown_seconds(" 0.5 "), Ok(30));
        }

        #[test]
        fn test_countdown_blank() {
            assert_eq!(
                parse_countdown_seconds("   "),
                Err(ConfigError::Blank(ConfigField::CountdownMinutes))
            );
        }

        #[test]
        fn test_countdown_non_positive() {
            assert!(matches!(
                parse_countdown_seconds("0"),
                Err(ConfigError::NotPositive(..))
            ));
            assert!(matches!(
                parse_countdown_seconds("-3"),
                Err(ConfigError::NotPositive(..))
            ));
        }

        #[test]
        fn test_countdown_tiny_positive_clamps_to_one_second() {
            assert_eq!(parse_countdown_seconds("0.005"), Ok(1));

            let mut config = WorkoutConfig::default();
            let applied = config.apply_edit(ConfigField::CountdownMinutes, "0.005");
            assert_eq!(applied.value, 1);
            assert!(applied.fallback.is_none());
            assert_eq!(config.countdown_seconds(), 1);
        }

        #[test]
        fn test_countdown_not_a_number() {
            assert!(matches!(
                parse_countdown_seconds("ten"),
                Err(ConfigError::NotANumber(..))
            ));
            assert!(matches!(
                parse_countdown_seconds("NaN"),
                Err(ConfigError::NotANumber(..))
            ));
        }

        #[test]
        fn test_positive_integer() {
            assert_eq!(parse_positive(ConfigField::TotalRounds, "12"), Ok(12));
        }

        #[test]
        fn test_positive_rejects_fraction() {
            assert!(matches!(
                parse_positive(ConfigField::RoundMinutes, "1.5"),
                Err(ConfigError::NotANumber(ConfigField::RoundMinutes, _))
            ));
        }

        #[test]
        fn test_positive_rejects_zero() {
            assert!(matches!(
                parse_positive(ConfigField::TotalRounds, "0"),
                Err(ConfigError::NotPositive(ConfigField::TotalRounds, _))
            ));
        }

        #[test]
        fn test_positive_out_of_range() {
            assert!(matches!(
                parse_positive(ConfigField::TotalRounds, "99999999999"),
                Err(ConfigError::OutOfRange(..))
            ));
        }
    }

    mod workout_config_tests {
        use super::*;

        #[test]
        fn test_default_values() {
            let config = WorkoutConfig::default();
            assert_eq!(config.countdown_seconds(), 600);
            assert_eq!(config.round_minutes(), 1);
            assert_eq!(config.round_length_seconds(), 60);
            assert_eq!(config.total_rounds(), 10);
        }

        #[test]
        fn test_builders() {
            let config = WorkoutConfig::default()
                .with_countdown_minutes(5)
                .with_round_minutes(2)
                .with_total_rounds(3);
            assert_eq!(config.countdown_seconds(), 300);
            assert_eq!(config.round_length_seconds(), 120);
            assert_eq!(config.total_rounds(), 3);
        }

        #[test]
        fn test_builders_clamp_zero() {
            let config = WorkoutConfig::default()
                .with_round_minutes(0)
                .with_total_rounds(0);
            assert_eq!(config.round_minutes(), 1);
            assert_eq!(config.total_rounds(), 1);
        }

        #[test]
        fn test_apply_edit_valid() {
            let mut config = WorkoutConfig::default();
            let applied = config.apply_edit(ConfigField::TotalRounds, "4");

            assert_eq!(applied.value, 4);
            assert!(applied.fallback.is_none());
            assert_eq!(config.total_rounds(), 4);
        }

        #[test]
        fn test_apply_edit_blank_countdown_defaults_to_ten_minutes() {
            let mut config = WorkoutConfig::default().with_countdown_minutes(3);
            let applied = config.apply_edit(ConfigField::CountdownMinutes, "");

            assert_eq!(config.countdown_seconds(), 600);
            assert_eq!(applied.value, 600);
            assert_eq!(
                applied.fallback,
                Some(ConfigError::Blank(ConfigField::CountdownMinutes))
            );
        }

        #[test]
        fn test_apply_edit_invalid_round_minutes_defaults() {
            let mut config = WorkoutConfig::default().with_round_minutes(3);
            let applied = config.apply_edit(ConfigField::RoundMinutes, "abc");

            assert_eq!(config.round_minutes(), DEFAULT_ROUND_MINUTES);
            assert!(applied.fallback.is_some());
        }

        #[test]
        fn test_apply_edit_negative_rounds_defaults() {
            let mut config = WorkoutConfig::default().with_total_rounds(2);
            config.apply_edit(ConfigField::TotalRounds, "-1");

            assert_eq!(config.total_rounds(), DEFAULT_TOTAL_ROUNDS);
        }

        #[test]
        fn test_display_value_units() {
            let mut config = WorkoutConfig::default();
            assert_eq!(
                config
                    .apply_edit(ConfigField::CountdownMinutes, "1.5")
                    .display_value(),
                "01:30"
            );
            assert_eq!(
                config.apply_edit(ConfigField::RoundMinutes, "2").display_value(),
                "2"
            );
        }
    }
}
