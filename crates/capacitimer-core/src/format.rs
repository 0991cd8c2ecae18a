//! Time formatting for the exported variables.
//!
//! The server's show-flags decide which fields appear.  Hiding a field does
//! not throw its value away: the largest *shown* unit absorbs everything
//! above it.  With hours hidden, 3725 seconds is `62:05`, not `02:05`.
//!
//! | seconds | hours | minutes | seconds | output      |
//! |---------|-------|---------|---------|-------------|
//! | -75     | on    | on      | on      | `-00:01:15` |
//! | 3725    | off   | on      | on      | `62:05`     |
//! | 3725    | off   | off     | on      | `3725`      |
//! | 3725    | on    | on      | off     | `01:02`     |
//!
//! Every shown field is zero-padded to at least two digits.  Milliseconds are
//! never rendered because the server reports whole seconds.

use crate::domain::settings::Settings;

/// Formats a signed number of seconds according to `settings`' show-flags.
///
/// Negative values are prefixed with `-`.  When every field is hidden the
/// result is empty (or just `-` for negative input).
pub fn format_time(seconds: i64, settings: &Settings) -> String {
    let sign = if seconds < 0 { "-" } else { "" };
    let mut remaining = seconds.unsigned_abs();
    let mut fields: Vec<String> = Vec::with_capacity(3);

    if settings.show_hours {
        fields.push(format!("{:02}", remaining / 3600));
        remaining %= 3600;
    }
    if settings.show_minutes {
        fields.push(format!("{:02}", remaining / 60));
        remaining %= 60;
    }
    if settings.show_seconds {
        fields.push(format!("{remaining:02}"));
    }

    format!("{sign}{}", fields.join(":"))
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    fn mask(hours: bool, minutes: bool, seconds: bool) -> Settings {
        Settings {
            show_hours: hours,
            show_minutes: minutes,
            show_seconds: seconds,
            ..Settings::default()
        }
    }

    #[test]
    fn test_negative_value_with_all_fields() {
        assert_eq!(format_time(-75, &mask(true, true, true)), "-00:01:15");
    }

    #[test]
    fn test_hidden_hours_overflow_into_minutes() {
        assert_eq!(format_time(3725, &mask(false, true, true)), "62:05");
    }

    #[test]
    fn test_all_fields_positive() {
        assert_eq!(format_time(3725, &mask(true, true, true)), "01:02:05");
    }

    #[test]
    fn test_zero_with_all_fields() {
        assert_eq!(format_time(0, &mask(true, true, true)), "00:00:00");
    }

    #[test]
    fn test_only_seconds_absorbs_everything() {
        assert_eq!(format_time(3725, &mask(false, false, true)), "3725");
    }

    #[test]
    fn test_hidden_seconds_has_no_trailing_separator() {
        assert_eq!(format_time(3725, &mask(true, true, false)), "01:02");
    }

    #[test]
    fn test_hidden_minutes_leaves_remainder_in_seconds() {
        assert_eq!(format_time(3725, &mask(true, false, true)), "01:125");
    }

    #[test]
    fn test_large_hours_are_not_wrapped() {
        assert_eq!(format_time(100 * 3600, &mask(true, true, true)), "100:00:00");
    }

    #[test]
    fn test_everything_hidden_keeps_sign_only() {
        assert_eq!(format_time(-5, &mask(false, false, false)), "-");
        assert_eq!(format_time(5, &mask(false, false, false)), "");
    }

    #[test]
    fn test_i64_min_does_not_overflow() {
        let out = format_time(i64::MIN, &mask(false, false, true));
        assert!(out.starts_with('-'));
    }
}
