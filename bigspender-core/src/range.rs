//! Resolution of the active fetch window from the `[date]` config section.

use std::sync::LazyLock;

use chrono::{Days, NaiveDate};
use regex::Regex;
use serde::Deserialize;

use crate::error::Error;

/// Inclusive `[from, to]` window, `from <= to` by construction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateRange {
    pub from: NaiveDate,
    pub to: NaiveDate,
}

impl DateRange {
    pub fn new(from: NaiveDate, to: NaiveDate) -> Result<Self, Error> {
        if from > to {
            return Err(Error::InvertedRange { from, to });
        }
        Ok(Self { from, to })
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.from <= date && date <= self.to
    }
}

/// The `[date]` section of config.toml, as written by the user.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct DateSection {
    pub mode: Option<RangeMode>,
    /// Relative window like "14d", "2w", "1m".
    pub range: Option<String>,
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RangeMode {
    Incremental,
}

impl DateSection {
    pub fn is_incremental(&self) -> bool {
        self.mode == Some(RangeMode::Incremental)
    }
}

static RELATIVE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\d+)([dwm])$").expect("relative range pattern"));

/// Compute the fetch window, checked in priority order:
///
/// 1. incremental mode with a stored watermark: `[watermark, today]`
/// 2. relative range: `[today - n, today]`
/// 3. explicit `from` + `to`
///
/// Incremental mode without a watermark (first run) falls through to 2/3 as
/// the bootstrap window; if neither is configured, resolution fails rather
/// than guessing a default.
pub fn resolve_range(
    cfg: &DateSection,
    watermark: Option<NaiveDate>,
    today: NaiveDate,
) -> Result<DateRange, Error> {
    if cfg.is_incremental() {
        if let Some(last_run) = watermark {
            return DateRange::new(last_run, today);
        }
    }

    if let Some(raw) = &cfg.range {
        let days = parse_relative_days(raw)?;
        return DateRange::new(today - Days::new(days), today);
    }

    if let (Some(from), Some(to)) = (cfg.from, cfg.to) {
        return DateRange::new(from, to);
    }

    Err(Error::MissingDateConfig)
}

/// Parse "<n><unit>" where unit is d(ays), w(eeks) or m(onths, counted as 30
/// days, matching the provider UIs this mirrors).
fn parse_relative_days(raw: &str) -> Result<u64, Error> {
    let caps = RELATIVE_RE
        .captures(raw.trim())
        .ok_or_else(|| Error::InvalidRange(raw.to_string()))?;
    let n: u64 = caps[1]
        .parse()
        .map_err(|_| Error::InvalidRange(raw.to_string()))?;
    Ok(match &caps[2] {
        "d" => n,
        "w" => n * 7,
        "m" => n * 30,
        _ => unreachable!(),
    })
}
