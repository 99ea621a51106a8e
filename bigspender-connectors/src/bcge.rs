//! BCGE retail-banking connector.
//!
//! Talks to the e-banking JSON API with cookies from a logged-in browser
//! session. Two feeds per account: settled bookings grouped by month, and
//! scheduled (future-dated) bookings, each with its own merchant cascade.

use std::sync::LazyLock;

use anyhow::Result;
use chrono::{DateTime, FixedOffset};
use chrono_tz::Tz;
use regex::Regex;
use serde::Deserialize;

use bigspender_core::time::de_timestamp;
use bigspender_core::{DateRange, Error, SourceRecord, Transaction, normalize};

use crate::auth::CookieSource;
use crate::http;

pub const PROVIDER: &str = "bcge";

const DOMAINS: &[&str] = &[".bcge.ch", "connect.bcge.ch", "www.bcge.ch"];
const API_BASE: &str = "https://www.bcge.ch/next/api/v4";

#[derive(Debug, Clone, Deserialize)]
pub struct BookingAmount {
    pub value: Option<f64>,
    pub currency: String,
}

/// A settled booking as the API reports it. Unused payload fields are
/// dropped at decode time.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Booking {
    pub id: String,
    #[serde(deserialize_with = "de_timestamp")]
    pub value_date: DateTime<FixedOffset>,
    pub description: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub booking_amount: BookingAmount,
    #[serde(default)]
    pub is_wage_payment: bool,
    #[serde(default)]
    pub beneficiary_address: Option<Vec<String>>,
    #[serde(default)]
    pub sender_address: Option<Vec<String>>,
}

#[derive(Debug, Deserialize)]
pub struct TimeGroup {
    #[serde(default)]
    pub items: Option<Vec<Booking>>,
}

#[derive(Debug, Deserialize)]
pub struct BookingsResponse {
    pub data: Vec<TimeGroup>,
}

impl BookingsResponse {
    /// All bookings across time groups; groups past `firstGroupsWithDetails`
    /// carry no items and are skipped.
    pub fn flatten(self) -> Vec<Booking> {
        self.data
            .into_iter()
            .flat_map(|group| group.items.unwrap_or_default())
            .collect()
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScheduledBooking {
    pub id: String,
    #[serde(deserialize_with = "de_timestamp")]
    pub value_date: DateTime<FixedOffset>,
    pub description: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub booking_amount: BookingAmount,
}

#[derive(Debug, Deserialize)]
pub struct ScheduledResponse {
    #[serde(default)]
    pub data: Option<Vec<ScheduledBooking>>,
}

fn signed_amount(
    kind: &str,
    amount: &BookingAmount,
    id: &str,
    description: &str,
) -> Result<f64, Error> {
    let value = amount.value.unwrap_or(0.0);
    match kind {
        "CREDIT" => Ok(value),
        "DEBIT" => Ok(-value),
        other => Err(Error::UnknownTransactionType {
            kind: other.to_string(),
            id: id.to_string(),
            description: description.to_string(),
        }),
    }
}

// Merchant cascades. Rules run in listed order and the first match wins;
// earlier patterns can be substrings of later, broader ones, so the order is
// part of the contract.

static CARD_PAYMENT_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^(?:Paiement|Payment|Remboursement)\s+\d{2}\.\d{2}\.\d{4}\s+\d{2}:\d{2}\s+(.+?)\s+Card number:",
    )
    .expect("card payment pattern")
});

static TWINT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^Twint\s+(.+?)\s+\d{10,}$").expect("twint pattern"));

static SCHEDULED_PURCHASE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^Purchase\s+\w+,\s+(.+),\s+\d{2}\.\d{2}\.\d{4}\s+\d{2}:\d{2},\s+card:")
        .expect("scheduled purchase pattern")
});

type Rule = fn(&Booking) -> Option<String>;

const MERCHANT_RULES: &[Rule] = &[
    wage_payment_rule,
    card_payment_rule,
    twint_rule,
    beneficiary_rule,
    sender_rule,
];

fn wage_payment_rule(b: &Booking) -> Option<String> {
    b.is_wage_payment.then(|| "Salary".to_string())
}

/// "Paiement 18.02.2026 11:25 SBB EasyRide Card number: 111111******1111"
/// (also "Payment" and "Remboursement" refunds).
fn card_payment_rule(b: &Booking) -> Option<String> {
    CARD_PAYMENT_RE
        .captures(&b.description)
        .map(|caps| caps[1].trim().to_string())
}

/// "Twint Zalando 0400012345678"
fn twint_rule(b: &Booking) -> Option<String> {
    TWINT_RE
        .captures(&b.description)
        .map(|caps| caps[1].to_string())
}

/// Payment orders, standing orders and LSV+ debits name the beneficiary.
fn beneficiary_rule(b: &Booking) -> Option<String> {
    b.beneficiary_address.as_ref()?.first().cloned()
}

/// Credits name the sender. A first line starting with "/" is an account
/// identifier ("/C/CH..."); the name then sits on the second line.
fn sender_rule(b: &Booking) -> Option<String> {
    if b.kind != "CREDIT" {
        return None;
    }
    let addr = b.sender_address.as_deref().filter(|a| !a.is_empty())?;
    if addr[0].starts_with('/') {
        Some(addr.get(1).cloned().unwrap_or_else(|| b.description.clone()))
    } else {
        Some(addr[0].clone())
    }
}

fn settled_merchant(b: &Booking) -> String {
    MERCHANT_RULES
        .iter()
        .find_map(|rule| rule(b))
        .unwrap_or_else(|| b.description.clone())
}

type ScheduledRule = fn(&ScheduledBooking) -> Option<String>;

const SCHEDULED_MERCHANT_RULES: &[ScheduledRule] = &[scheduled_purchase_rule];

/// "Purchase CHF, Coop-1240 Zurich Zurich, 19.02.2026 14:22, card: ..."
fn scheduled_purchase_rule(b: &ScheduledBooking) -> Option<String> {
    SCHEDULED_PURCHASE_RE
        .captures(&b.description)
        .map(|caps| caps[1].to_string())
}

fn scheduled_merchant(b: &ScheduledBooking) -> String {
    SCHEDULED_MERCHANT_RULES
        .iter()
        .find_map(|rule| rule(b))
        .unwrap_or_else(|| b.description.clone())
}

impl SourceRecord for Booking {
    fn timestamp(&self) -> DateTime<FixedOffset> {
        self.value_date
    }

    fn signed_amount(&self) -> Result<f64, Error> {
        signed_amount(&self.kind, &self.booking_amount, &self.id, &self.description)
    }

    fn merchant(&self) -> String {
        settled_merchant(self)
    }
}

impl SourceRecord for ScheduledBooking {
    fn timestamp(&self) -> DateTime<FixedOffset> {
        self.value_date
    }

    fn signed_amount(&self) -> Result<f64, Error> {
        signed_amount(&self.kind, &self.booking_amount, &self.id, &self.description)
    }

    fn merchant(&self) -> String {
        scheduled_merchant(self)
    }
}

/// Fetch both feeds for one account and normalize them into the window.
pub async fn fetch(
    client: &reqwest::Client,
    cookies: &dyn CookieSource,
    account_id: &str,
    range: &DateRange,
    tz: Tz,
) -> Result<Vec<Transaction>> {
    let jar = cookies.cookies_for(DOMAINS)?;

    let url = format!("{API_BASE}/accounts/{account_id}/bookingstimegroup");
    let settled: BookingsResponse = http::get_json(
        client,
        &url,
        &[
            ("group", "MONTH"),
            ("firstGroupsWithDetails", "3"),
            ("limit", "100"),
        ],
        &jar,
    )
    .await?;

    let url = format!("{API_BASE}/accounts/{account_id}/scheduledbookings");
    let scheduled: ScheduledResponse = http::get_json(client, &url, &[], &jar).await?;

    Ok(normalize(
        &settled.flatten(),
        &scheduled.data.unwrap_or_default(),
        range,
        tz,
    )?)
}
