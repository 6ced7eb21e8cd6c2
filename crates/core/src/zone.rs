#![forbid(unsafe_code)]

use chrono::{DateTime, Offset, TimeZone};

pub use chrono_tz::Tz;

#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
#[error("unknown timezone: {0}")]
pub struct ZoneError(pub String);

pub fn parse_zone(name: &str) -> Result<Tz, ZoneError> {
    name.trim()
        .parse::<Tz>()
        .map_err(|_| ZoneError(name.to_string()))
}

/// Offset of `zone` from UTC at the instant `at_ms`, in milliseconds.
///
/// Instants outside chrono's representable range evaluate to zero.
pub fn utc_offset_ms(zone: Tz, at_ms: i64) -> i64 {
    let Some(at) = DateTime::from_timestamp_millis(at_ms) else {
        return 0;
    };
    let offset = zone.offset_from_utc_datetime(&at.naive_utc()).fix();
    i64::from(offset.local_minus_utc()) * 1_000
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_iana_names() {
        assert_eq!(parse_zone("Europe/Berlin").unwrap(), chrono_tz::Europe::Berlin);
        assert_eq!(parse_zone(" UTC ").unwrap(), chrono_tz::UTC);
        assert_eq!(
            parse_zone("Mars/Olympus").unwrap_err().to_string(),
            "unknown timezone: Mars/Olympus"
        );
    }

    #[test]
    fn offset_follows_dst_rules_at_the_instant() {
        let berlin = chrono_tz::Europe::Berlin;
        // 2024-01-15T12:00:00Z, CET
        assert_eq!(utc_offset_ms(berlin, 1_705_320_000_000), 3_600_000);
        // 2024-07-15T12:00:00Z, CEST
        assert_eq!(utc_offset_ms(berlin, 1_721_044_800_000), 7_200_000);
        // 2024-01-15T12:00:00Z, EST
        assert_eq!(
            utc_offset_ms(chrono_tz::America::New_York, 1_705_320_000_000),
            -18_000_000
        );
        assert_eq!(utc_offset_ms(chrono_tz::UTC, 0), 0);
    }
}
