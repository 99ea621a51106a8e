//! CSV export of the normalized stream, one file per account.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use bigspender_core::Transaction;
use chrono::NaiveDate;

/// Default layout: `out/2026-02-20-transactions-bcge-0123456789.csv`.
pub fn default_path(dir: &Path, today: NaiveDate, provider: &str, account_id: &str) -> PathBuf {
    dir.join(format!(
        "{}-transactions-{provider}-{account_id}.csv",
        today.format("%Y-%m-%d")
    ))
}

/// Write `date;merchant;amount;scheduled` records, no header row.
pub fn dump(path: &Path, transactions: &[Transaction], delimiter: char) -> Result<()> {
    let delimiter = u8::try_from(delimiter)
        .ok()
        .filter(u8::is_ascii)
        .with_context(|| format!("delimiter {delimiter:?} is not a single ASCII byte"))?;

    if let Some(dir) = path.parent() {
        fs::create_dir_all(dir).with_context(|| format!("create {}", dir.display()))?;
    }

    let mut wtr = csv::WriterBuilder::new()
        .delimiter(delimiter)
        .has_headers(false)
        .from_path(path)
        .with_context(|| format!("open {}", path.display()))?;
    for t in transactions {
        wtr.serialize(t)
            .with_context(|| format!("write {}", path.display()))?;
    }
    wtr.flush().with_context(|| format!("flush {}", path.display()))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn txns() -> Vec<Transaction> {
        vec![
            Transaction {
                date: NaiveDate::from_ymd_opt(2026, 2, 18).unwrap(),
                merchant: "SBB EasyRide".to_string(),
                amount: -21.62,
                scheduled: false,
            },
            Transaction {
                date: NaiveDate::from_ymd_opt(2026, 2, 16).unwrap(),
                merchant: "Salary".to_string(),
                amount: 6500.0,
                scheduled: false,
            },
        ]
    }

    #[test]
    fn test_default_path_layout() {
        let p = default_path(
            Path::new("out"),
            NaiveDate::from_ymd_opt(2026, 2, 20).unwrap(),
            "bcge",
            "0123456789",
        );
        assert_eq!(
            p,
            PathBuf::from("out/2026-02-20-transactions-bcge-0123456789.csv")
        );
    }

    #[test]
    fn test_dump_layout_and_dir_creation() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out/dump.csv");
        dump(&path, &txns(), ';').unwrap();

        let raw = fs::read_to_string(&path).unwrap();
        let lines: Vec<_> = raw.lines().collect();
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0], "2026-02-18;SBB EasyRide;-21.62;false");
        assert_eq!(lines[1], "2026-02-16;Salary;6500.0;false");
    }

    #[test]
    fn test_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("dump.csv");
        let original = txns();
        dump(&path, &original, ';').unwrap();

        let mut rdr = csv::ReaderBuilder::new()
            .delimiter(b';')
            .has_headers(false)
            .from_path(&path)
            .unwrap();
        let parsed: Vec<Transaction> = rdr.deserialize().map(|r| r.unwrap()).collect();
        assert_eq!(parsed, original);
    }

    #[test]
    fn test_merchant_containing_delimiter_round_trips() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("dump.csv");
        let original = vec![Transaction {
            date: NaiveDate::from_ymd_opt(2026, 2, 18).unwrap(),
            merchant: "Cafe; Bar".to_string(),
            amount: -5.0,
            scheduled: true,
        }];
        dump(&path, &original, ';').unwrap();

        let mut rdr = csv::ReaderBuilder::new()
            .delimiter(b';')
            .has_headers(false)
            .from_path(&path)
            .unwrap();
        let parsed: Vec<Transaction> = rdr.deserialize().map(|r| r.unwrap()).collect();
        assert_eq!(parsed, original);
    }

    #[test]
    fn test_non_ascii_delimiter_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("dump.csv");
        assert!(dump(&path, &txns(), 'ä').is_err());
    }

    #[test]
    fn test_empty_dump_writes_empty_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("dump.csv");
        dump(&path, &[], ';').unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), "");
    }
}
