//! Human duration strings ("1w 2d 3h 30m") at the user-facing boundary.
//!
//! Internally every duration is whole seconds. Day and week lengths are
//! working lengths taken from [`EngineConfig`].

use crate::{EngineConfig, SprintboardError, SprintboardResult};

pub type Seconds = u64;

/// Parse a duration string such as `"1d 2h 30m"` or `"1h30m"` into seconds.
pub fn parse_duration(input: &str, config: &EngineConfig) -> SprintboardResult<Seconds> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Err(SprintboardError::Validation(
            "Duration must not be empty".to_string(),
        ));
    }

    let mut total: Seconds = 0;
    let mut digits = String::new();
    for c in trimmed.chars() {
        if c.is_ascii_digit() {
            digits.push(c);
            continue;
        }
        if c.is_whitespace() {
            if !digits.is_empty() {
                return Err(invalid(input, "missing unit"));
            }
            continue;
        }
        if digits.is_empty() {
            return Err(invalid(input, "unit without a number"));
        }
        let value: u64 = digits
            .parse()
            .map_err(|_| invalid(input, "number too large"))?;
        let unit = match c.to_ascii_lowercase() {
            'w' => config.seconds_per_week(),
            'd' => config.seconds_per_day(),
            'h' => 3600,
            'm' => 60,
            's' => 1,
            other => return Err(invalid(input, &format!("unknown unit '{}'", other))),
        };
        total = value
            .checked_mul(unit)
            .and_then(|v| total.checked_add(v))
            .ok_or_else(|| invalid(input, "duration overflows"))?;
        digits.clear();
    }

    if !digits.is_empty() {
        return Err(invalid(input, "missing unit"));
    }
    Ok(total)
}

fn invalid(input: &str, reason: &str) -> SprintboardError {
    SprintboardError::Validation(format!("Invalid duration '{}': {}", input, reason))
}

/// Render seconds as `"1w 2d 3h 30m"`, dropping zero components.
/// Sub-minute remainders are dropped unless the whole value is below a minute.
pub fn format_duration(seconds: Seconds, config: &EngineConfig) -> String {
    if seconds < 60 {
        return if seconds == 0 {
            "0m".to_string()
        } else {
            format!("{}s", seconds)
        };
    }

    let mut rest = seconds;
    let mut parts = Vec::new();
    for (unit, suffix) in [
        (config.seconds_per_week(), 'w'),
        (config.seconds_per_day(), 'd'),
        (3600, 'h'),
        (60, 'm'),
    ] {
        let count = rest / unit;
        if count > 0 {
            parts.push(format!("{}{}", count, suffix));
            rest %= unit;
        }
    }
    parts.join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> EngineConfig {
        EngineConfig::default()
    }

    #[test]
    fn test_parse_spaced_components() {
        assert_eq!(parse_duration("1d 2h 30m", &config()).unwrap(), 37_800);
        assert_eq!(parse_duration("10h", &config()).unwrap(), 36_000);
        assert_eq!(parse_duration("1w", &config()).unwrap(), 144_000);
    }

    #[test]
    fn test_parse_compact_and_case_insensitive() {
        assert_eq!(parse_duration("1H30M", &config()).unwrap(), 5_400);
        assert_eq!(parse_duration(" 45s ", &config()).unwrap(), 45);
    }

    #[test]
    fn test_parse_uses_configured_day_length() {
        let config = EngineConfig {
            hours_per_day: 6,
            ..EngineConfig::default()
        };
        assert_eq!(parse_duration("1d", &config).unwrap(), 21_600);
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert!(parse_duration("", &config()).is_err());
        assert!(parse_duration("12", &config()).is_err());
        assert!(parse_duration("h", &config()).is_err());
        assert!(parse_duration("3x", &config()).is_err());
        assert!(parse_duration("3 h", &config()).is_err());
    }

    #[test]
    fn test_format() {
        assert_eq!(format_duration(0, &config()), "0m");
        assert_eq!(format_duration(30, &config()), "30s");
        assert_eq!(format_duration(37_800, &config()), "1d 2h 30m");
        assert_eq!(format_duration(7_200, &config()), "2h");
        assert_eq!(format_duration(144_000 + 3_600, &config()), "1w 1h");
    }
}
