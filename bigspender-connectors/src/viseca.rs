//! Viseca card connector (one.viseca.ch).
//!
//! The card report endpoint takes the window server-side and already signs
//! amounts in the debit-negative convention, so there is no sign mapping and
//! no scheduled feed here; the merchant cascade is a plain fallback chain.

use anyhow::Result;
use chrono::{DateTime, FixedOffset};
use chrono_tz::Tz;
use serde::Deserialize;

use bigspender_core::time::de_timestamp;
use bigspender_core::{DateRange, Error, SourceRecord, Transaction, normalize};

use crate::auth::CookieSource;
use crate::http;

pub const PROVIDER: &str = "viseca";

const DOMAINS: &[&str] = &[".one.viseca.ch", "one.viseca.ch"];
const API_BASE: &str = "https://api.one.viseca.ch/v1";
const PAGE_SIZE: &str = "20";

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CardTransaction {
    pub transaction_id: String,
    #[serde(deserialize_with = "de_timestamp")]
    pub date: DateTime<FixedOffset>,
    /// Already signed: charges negative, refunds positive.
    pub amount: f64,
    pub currency: String,
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub details: String,
    #[serde(default)]
    pub merchant_name: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionsResponse {
    pub total_count: u32,
    #[serde(default)]
    pub list: Option<Vec<CardTransaction>>,
}

type Rule = fn(&CardTransaction) -> Option<String>;

const MERCHANT_RULES: &[Rule] = &[merchant_name_rule, details_rule, kind_rule];

fn merchant_name_rule(t: &CardTransaction) -> Option<String> {
    t.merchant_name
        .as_deref()
        .filter(|name| !name.is_empty())
        .map(str::to_string)
}

fn details_rule(t: &CardTransaction) -> Option<String> {
    (!t.details.is_empty()).then(|| t.details.clone())
}

fn kind_rule(t: &CardTransaction) -> Option<String> {
    (!t.kind.is_empty()).then(|| t.kind.clone())
}

/// Commas are replaced so the merchant never collides with list-style
/// consumers of the export.
fn card_merchant(t: &CardTransaction) -> String {
    MERCHANT_RULES
        .iter()
        .find_map(|rule| rule(t))
        .unwrap_or_else(|| "Unknown".to_string())
        .replace(',', " ")
}

impl SourceRecord for CardTransaction {
    fn timestamp(&self) -> DateTime<FixedOffset> {
        self.date
    }

    fn signed_amount(&self) -> Result<f64, Error> {
        Ok(self.amount)
    }

    fn merchant(&self) -> String {
        card_merchant(self)
    }
}

/// Fetch the card report for one card and normalize it into the window.
pub async fn fetch(
    client: &reqwest::Client,
    cookies: &dyn CookieSource,
    card_id: &str,
    range: &DateRange,
    tz: Tz,
) -> Result<Vec<Transaction>> {
    let jar = cookies.cookies_for(DOMAINS)?;

    let url = format!("{API_BASE}/reports/cards/{card_id}/transactions");
    let date_from = range.from.format("%Y-%m-%dT00:00:00Z").to_string();
    let date_to = range.to.format("%Y-%m-%dT23:59:59Z").to_string();
    let resp: TransactionsResponse = http::get_json(
        client,
        &url,
        &[
            ("stateType", "unknown"),
            ("offset", "0"),
            ("pagesize", PAGE_SIZE),
            ("dateFrom", date_from.as_str()),
            ("dateTo", date_to.as_str()),
        ],
        &jar,
    )
    .await?;

    let settled = resp.list.unwrap_or_default();
    Ok(normalize(&settled, &[] as &[CardTransaction], range, tz)?)
}
