//! Time utilities: provider timestamps to local calendar dates.

use anyhow::Result;
use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime};
use chrono_tz::Tz;
use serde::{Deserialize, Deserializer};

/// Parse a provider timestamp, keeping its original offset.
///
/// Accepts RFC 3339 ("2026-02-18T10:25:00+01:00", trailing "Z") and the
/// offset-less form some feeds use, which is treated as UTC.
pub fn parse_timestamp(s: &str) -> Result<DateTime<FixedOffset>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Ok(dt);
    }
    let ndt = NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S%.f")
        .map_err(|e| anyhow::anyhow!("invalid timestamp {s:?}: {e}"))?;
    Ok(ndt.and_utc().fixed_offset())
}

/// Calendar date of `ts` in the zone `tz`. Bookings stamped late in the
/// evening UTC can land on the next local day; filtering must use this date.
pub fn local_date(ts: DateTime<FixedOffset>, tz: Tz) -> NaiveDate {
    ts.with_timezone(&tz).date_naive()
}

/// serde adapter for timestamp fields in provider payloads.
pub fn de_timestamp<'de, D>(deserializer: D) -> Result<DateTime<FixedOffset>, D::Error>
where
    D: Deserializer<'de>,
{
    let s = String::deserialize(deserializer)?;
    parse_timestamp(&s).map_err(serde::de::Error::custom)
}
