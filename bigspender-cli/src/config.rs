use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use bigspender_core::DateSection;
use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    /// IANA zone used to turn provider timestamps into calendar dates.
    #[serde(default = "default_timezone")]
    pub timezone: String,
    #[serde(default)]
    pub date: DateSection,
    #[serde(default, rename = "account")]
    pub accounts: Vec<Account>,
    #[serde(default)]
    pub export: ExportSection,
}

fn default_timezone() -> String {
    "Europe/Zurich".to_string()
}

#[derive(Debug, Clone, Deserialize)]
pub struct Account {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: AccountKind,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AccountKind {
    Bcge,
    Viseca,
}

impl AccountKind {
    pub fn provider(self) -> &'static str {
        match self {
            AccountKind::Bcge => bigspender_connectors::bcge::PROVIDER,
            AccountKind::Viseca => bigspender_connectors::viseca::PROVIDER,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ExportSection {
    pub dir: PathBuf,
    pub delimiter: char,
}

impl Default for ExportSection {
    fn default() -> Self {
        Self {
            dir: PathBuf::from("out"),
            delimiter: ';',
        }
    }
}

pub fn load_config(path: &Path) -> Result<Config> {
    let s = fs::read_to_string(path).with_context(|| format!("read {}", path.display()))?;
    toml::from_str(&s).with_context(|| format!("parse {}", path.display()))
}
