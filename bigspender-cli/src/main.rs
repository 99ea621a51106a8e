use std::path::PathBuf;

use anyhow::{Context, Result};
use bigspender_connectors::auth::FirefoxCookies;
use bigspender_connectors::{bcge, http, viseca};
use bigspender_core::resolve_range;
use bigspender_core::watermark::{DEFAULT_STATE_FILE, WatermarkStore};
use chrono_tz::Tz;
use clap::Parser;

mod config;
mod export;

use config::AccountKind;

#[derive(Parser, Debug)]
#[command(
    name = "bigspender",
    version,
    about = "Aggregate bank and card transactions into CSV"
)]
struct Cli {
    /// Path to the TOML configuration
    #[arg(long, default_value = "config.toml")]
    config: PathBuf,

    /// One-off window override, e.g. 14d, 2w, 1m
    #[arg(long)]
    range: Option<String>,

    /// Override the export directory
    #[arg(long)]
    out: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut cfg = config::load_config(&cli.config)?;
    if let Some(range) = cli.range {
        // An ad-hoc window is not a real run; it must not advance the
        // watermark, so incremental mode is switched off with it.
        cfg.date.mode = None;
        cfg.date.range = Some(range);
    }
    if let Some(out) = cli.out {
        cfg.export.dir = out;
    }

    let tz: Tz = cfg
        .timezone
        .parse()
        .map_err(|_| anyhow::anyhow!("invalid timezone: {}", cfg.timezone))?;

    let store = WatermarkStore::new(DEFAULT_STATE_FILE);
    let today = chrono::Local::now().date_naive();
    // Read once, up front; written again only after every account succeeds.
    let watermark = store.read()?;
    let range = resolve_range(&cfg.date, watermark, today)?;

    println!("Fetching transactions from {} to {}", range.from, range.to);

    if cfg.accounts.is_empty() {
        println!(
            "No [[account]] entries in {}; nothing to do",
            cli.config.display()
        );
        return Ok(());
    }

    let client = http::client()?;
    let cookies = FirefoxCookies::locate()?;

    for account in &cfg.accounts {
        let provider = account.kind.provider();
        let txns = match account.kind {
            AccountKind::Bcge => bcge::fetch(&client, &cookies, &account.id, &range, tz).await,
            AccountKind::Viseca => viseca::fetch(&client, &cookies, &account.id, &range, tz).await,
        }
        .with_context(|| format!("fetching {provider} account {}", account.id))?;

        let path = export::default_path(&cfg.export.dir, today, provider, &account.id);
        export::dump(&path, &txns, cfg.export.delimiter)?;
        println!(
            "{provider} {}: {} transaction(s) -> {}",
            account.id,
            txns.len(),
            path.display()
        );
    }

    // All accounts fetched and exported; only now may the watermark move.
    if cfg.date.is_incremental() {
        store.write(range.to)?;
        println!("Updated {} to {}", store.path().display(), range.to);
    }

    Ok(())
}
