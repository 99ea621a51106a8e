//! Session cookies lifted from a local Firefox profile.
//!
//! The providers have no token API worth speaking of; the user logs in with
//! the browser and we reuse that session. Firefox keeps cookies in
//! `cookies.sqlite` under the profile directory.

use std::collections::HashMap;
use std::fs;
use std::path::PathBuf;
use std::sync::atomic::{AtomicU64, Ordering};

use anyhow::{Context, Result, bail};
use rusqlite::{Connection, OpenFlags};

/// Supplies authentication cookies for a set of domains.
pub trait CookieSource {
    fn cookies_for(&self, domains: &[&str]) -> Result<HashMap<String, String>>;
}

/// Reads cookies straight out of a Firefox profile's cookie store.
#[derive(Debug, Clone)]
pub struct FirefoxCookies {
    db_path: PathBuf,
}

impl FirefoxCookies {
    pub fn new(db_path: impl Into<PathBuf>) -> Self {
        Self {
            db_path: db_path.into(),
        }
    }

    /// Most recently used profile under ~/.mozilla/firefox that has a cookie
    /// store.
    pub fn locate() -> Result<Self> {
        let home = std::env::var("HOME").context("HOME is not set")?;
        let root = PathBuf::from(home).join(".mozilla/firefox");

        let mut newest: Option<(std::time::SystemTime, PathBuf)> = None;
        for entry in
            fs::read_dir(&root).with_context(|| format!("read {}", root.display()))?
        {
            let db = entry?.path().join("cookies.sqlite");
            let Ok(meta) = db.metadata() else { continue };
            let modified = meta.modified().with_context(|| format!("stat {}", db.display()))?;
            if newest.as_ref().is_none_or(|(t, _)| modified > *t) {
                newest = Some((modified, db));
            }
        }

        match newest {
            Some((_, db)) => Ok(Self::new(db)),
            None => bail!(
                "no Firefox profile with a cookie store under {} (log in with Firefox first)",
                root.display()
            ),
        }
    }

    /// A running Firefox holds the live database locked; query a snapshot
    /// copy instead.
    fn open_snapshot(&self) -> Result<(Connection, PathBuf)> {
        static SNAPSHOT_SEQ: AtomicU64 = AtomicU64::new(0);
        let snapshot = std::env::temp_dir().join(format!(
            "bigspender-cookies-{}-{}.sqlite",
            std::process::id(),
            SNAPSHOT_SEQ.fetch_add(1, Ordering::Relaxed)
        ));
        fs::copy(&self.db_path, &snapshot)
            .with_context(|| format!("snapshot {}", self.db_path.display()))?;
        let conn = Connection::open_with_flags(&snapshot, OpenFlags::SQLITE_OPEN_READ_ONLY)
            .with_context(|| format!("open {}", snapshot.display()))?;
        Ok((conn, snapshot))
    }
}

impl CookieSource for FirefoxCookies {
    fn cookies_for(&self, domains: &[&str]) -> Result<HashMap<String, String>> {
        let (conn, snapshot) = self.open_snapshot()?;
        let mut cookies = HashMap::new();
        {
            let mut stmt = conn.prepare("SELECT name, value FROM moz_cookies WHERE host = ?1")?;
            for domain in domains {
                let rows = stmt.query_map([*domain], |row| {
                    Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?))
                })?;
                for row in rows {
                    let (name, value) = row?;
                    cookies.insert(name, value);
                }
            }
        }
        drop(conn);
        let _ = fs::remove_file(&snapshot);

        eprintln!("found {} cookie(s) for {domains:?}", cookies.len());
        Ok(cookies)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fake_profile_db(dir: &tempfile::TempDir) -> PathBuf {
        let path = dir.path().join("cookies.sqlite");
        let conn = Connection::open(&path).unwrap();
        conn.execute_batch(
            "CREATE TABLE moz_cookies (id INTEGER PRIMARY KEY, host TEXT, name TEXT, value TEXT);
             INSERT INTO moz_cookies (host, name, value) VALUES
                 ('.bcge.ch', 'session', 's3cret'),
                 ('www.bcge.ch', 'csrf', 'tok'),
                 ('.example.com', 'other', 'nope');",
        )
        .unwrap();
        path
    }

    #[test]
    fn test_collects_cookies_per_listed_domain() {
        let dir = tempfile::tempdir().unwrap();
        let source = FirefoxCookies::new(fake_profile_db(&dir));
        let cookies = source
            .cookies_for(&[".bcge.ch", "connect.bcge.ch", "www.bcge.ch"])
            .unwrap();
        assert_eq!(cookies.len(), 2);
        assert_eq!(cookies["session"], "s3cret");
        assert_eq!(cookies["csrf"], "tok");
    }

    #[test]
    fn test_unlisted_domains_are_not_swept_in() {
        let dir = tempfile::tempdir().unwrap();
        let source = FirefoxCookies::new(fake_profile_db(&dir));
        let cookies = source.cookies_for(&[".one.viseca.ch"]).unwrap();
        assert!(cookies.is_empty());
    }

    #[test]
    fn test_missing_database_is_an_error() {
        let source = FirefoxCookies::new("/nonexistent/cookies.sqlite");
        assert!(source.cookies_for(&[".bcge.ch"]).is_err());
    }
}
