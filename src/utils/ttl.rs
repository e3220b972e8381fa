//! Duration parsing shared by service timeouts and cache TTLs.
//!
//! Both accept either a `humantime`-style duration string (`"5s"`, `"1m"`)
//! or a bare integer interpreted as seconds; an unparseable value falls back
//! to the caller-supplied default.

use std::time::Duration;

pub fn parse_duration_or_default(raw: &str, default: Duration) -> Duration {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return default;
    }
    if let Ok(d) = humantime::parse_duration(trimmed) {
        return d;
    }
    if let Ok(secs) = trimmed.parse::<u64>() {
        return Duration::from_secs(secs);
    }
    default
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_humantime_strings() {
        assert_eq!(parse_duration_or_default("5s", Duration::from_secs(1)), Duration::from_secs(5));
        assert_eq!(parse_duration_or_default("1m", Duration::from_secs(1)), Duration::from_secs(60));
    }

    #[test]
    fn accepts_bare_integer_seconds() {
        assert_eq!(parse_duration_or_default("30", Duration::from_secs(1)), Duration::from_secs(30));
    }

    #[test]
    fn falls_back_on_empty_or_garbage() {
        assert_eq!(parse_duration_or_default("", Duration::from_secs(7)), Duration::from_secs(7));
        assert_eq!(parse_duration_or_default("not-a-duration", Duration::from_secs(7)), Duration::from_secs(7));
    }
}
