//! Merging provider feeds into the canonical transaction stream.

use chrono::{DateTime, FixedOffset};
use chrono_tz::Tz;

use crate::error::Error;
use crate::range::DateRange;
use crate::time;
use crate::transaction::Transaction;

/// Connector-side view of one decoded booking. The seam between the
/// provider schemas and the normalizer: each provider implements this for
/// its raw record types and keeps its cascade/sign rules local.
pub trait SourceRecord {
    /// Booking timestamp as reported by the provider, offset preserved.
    fn timestamp(&self) -> DateTime<FixedOffset>;

    /// Amount in the debit-negative / credit-positive convention.
    fn signed_amount(&self) -> Result<f64, Error>;

    /// Display merchant derived from the provider's cascade. Total: always
    /// yields something, worst case the raw description.
    fn merchant(&self) -> String;
}

/// Normalize one account's feeds into a single ordered list.
///
/// Records outside `range` (by local calendar date in `tz`) are dropped.
/// Output is sorted by date descending; the sort is stable, so same-day
/// entries keep settled before scheduled.
pub fn normalize<S, P>(
    settled: &[S],
    scheduled: &[P],
    range: &DateRange,
    tz: Tz,
) -> Result<Vec<Transaction>, Error>
where
    S: SourceRecord,
    P: SourceRecord,
{
    let mut out = Vec::with_capacity(settled.len() + scheduled.len());
    collect(settled, false, range, tz, &mut out)?;
    collect(scheduled, true, range, tz, &mut out)?;
    out.sort_by(|a, b| b.date.cmp(&a.date));
    Ok(out)
}

fn collect<R: SourceRecord>(
    records: &[R],
    scheduled: bool,
    range: &DateRange,
    tz: Tz,
    out: &mut Vec<Transaction>,
) -> Result<(), Error> {
    for record in records {
        let date = time::local_date(record.timestamp(), tz);
        if !range.contains(date) {
            continue;
        }
        out.push(Transaction {
            date,
            merchant: record.merchant(),
            amount: record.signed_amount()?,
            scheduled,
        });
    }
    Ok(())
}
