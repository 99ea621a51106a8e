use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Normalized output of the provider connectors (provider-agnostic).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    /// Local calendar date of the booking (provider timestamp converted first).
    pub date: NaiveDate,
    pub merchant: String,
    /// Negative means debit/spend; positive means credit/income.
    pub amount: f64,
    /// Future-dated booking from a scheduled feed, not yet settled.
    pub scheduled: bool,
}
