use std::time::{Instant, SystemTime, UNIX_EPOCH};

use time::{OffsetDateTime, UtcOffset};

const NANOS_PER_MILLI: i128 = 1_000_000;

#[must_use]
pub fn unix_timestamp_millis() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_or(0, |duration| {
            u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
        })
}

/// Renders unix milliseconds as `YYYY-MM-DDTHH:MM:SS.mmmZ`; out-of-range values clamp to the epoch.
#[must_use]
pub fn format_unix_ms(timestamp_unix_ms: u64) -> String {
    let nanos = i128::from(timestamp_unix_ms).saturating_mul(NANOS_PER_MILLI);
    let dt = OffsetDateTime::from_unix_timestamp_nanos(nanos)
        .unwrap_or(OffsetDateTime::UNIX_EPOCH)
        .to_offset(UtcOffset::UTC);
    format!(
        "{:04}-{:02}-{:02}T{:02}:{:02}:{:02}.{:03}Z",
        dt.year(),
        u8::from(dt.month()),
        dt.day(),
        dt.hour(),
        dt.minute(),
        dt.second(),
        dt.millisecond()
    )
}

#[must_use]
pub fn elapsed_ms(started: Instant) -> u64 {
    u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX)
}

#[must_use]
pub fn classify_latency_bucket(duration_ms: u64) -> &'static str {
    match duration_ms {
        0..=250 => "fast",
        251..=1_500 => "moderate",
        1_501..=10_000 => "slow",
        _ => "very_slow",
    }
}

#[cfg(test)]
mod tests {
    use super::{classify_latency_bucket, format_unix_ms};

    #[test]
    fn formats_epoch_millis_as_utc_rfc3339() {
        assert_eq!(format_unix_ms(0), "1970-01-01T00:00:00.000Z");
        assert_eq!(format_unix_ms(1_771_977_600_123), "2026-02-25T00:00:00.123Z");
    }

    #[test]
    fn latency_buckets_cover_boundaries() {
        assert_eq!(classify_latency_bucket(0), "fast");
        assert_eq!(classify_latency_bucket(251), "moderate");
        assert_eq!(classify_latency_bucket(10_000), "slow");
        assert_eq!(classify_latency_bucket(10_001), "very_slow");
    }
}
