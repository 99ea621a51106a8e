//! Shared JSON GET plumbing: cookie header, timeout, bounded retry.

use std::collections::HashMap;
use std::time::Duration;

use anyhow::{Context, Result};
use reqwest::StatusCode;
use reqwest::header::COOKIE;
use serde::de::DeserializeOwned;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);
const MAX_ATTEMPTS: u32 = 3;

pub fn client() -> Result<reqwest::Client> {
    reqwest::Client::builder()
        .timeout(REQUEST_TIMEOUT)
        .build()
        .context("build http client")
}

fn cookie_header(cookies: &HashMap<String, String>) -> String {
    cookies
        .iter()
        .map(|(name, value)| format!("{name}={value}"))
        .collect::<Vec<_>>()
        .join("; ")
}

/// GET a JSON document with the session cookies attached.
///
/// These endpoints are all idempotent reads, so transient failures (network
/// errors, timeouts, 5xx, 429) are retried with exponential backoff. Auth
/// failures and other 4xx surface immediately.
pub async fn get_json<T: DeserializeOwned>(
    client: &reqwest::Client,
    url: &str,
    query: &[(&str, &str)],
    cookies: &HashMap<String, String>,
) -> Result<T> {
    let header = cookie_header(cookies);
    let mut delay = Duration::from_millis(500);

    for attempt in 1.. {
        match send(client, url, query, &header).await {
            Ok(resp) => {
                return resp
                    .json::<T>()
                    .await
                    .with_context(|| format!("decoding response from {url}"));
            }
            Err(e) if attempt < MAX_ATTEMPTS && is_transient(&e) => {
                eprintln!(
                    "GET {url} failed ({e}); retrying in {}ms ({attempt}/{MAX_ATTEMPTS})",
                    delay.as_millis()
                );
                tokio::time::sleep(delay).await;
                delay *= 2;
            }
            Err(e) => return Err(e).with_context(|| format!("GET {url}")),
        }
    }
    unreachable!("retry loop always returns")
}

async fn send(
    client: &reqwest::Client,
    url: &str,
    query: &[(&str, &str)],
    cookie_header: &str,
) -> reqwest::Result<reqwest::Response> {
    let resp = client
        .get(url)
        .query(query)
        .header(COOKIE, cookie_header)
        .send()
        .await?;
    resp.error_for_status()
}

fn is_transient(err: &reqwest::Error) -> bool {
    if err.is_timeout() || err.is_connect() {
        return true;
    }
    matches!(
        err.status(),
        Some(status) if status.is_server_error() || status == StatusCode::TOO_MANY_REQUESTS
    )
}
