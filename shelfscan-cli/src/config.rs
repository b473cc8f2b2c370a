use anyhow::{bail, Context, Result};
use chrono::{NaiveDate, Utc};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::state::{ensure_shelfscan_home, shelfscan_home};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub catalog: CatalogSection,
    pub expiry: ExpirySection,
    pub log: LogSection,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CatalogSection {
    /// Catalog used when `--catalog` is not given.
    pub path: Option<PathBuf>,
    /// `","`, `";"`, `"tab"`, ... ; sniffed from the file when unset.
    pub delimiter: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ExpirySection {
    /// IANA zone whose local date counts as "today".
    pub timezone: String,
    pub soon_window_days: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LogSection {
    /// Default filter; `RUST_LOG` wins when set.
    pub level: String,
}

impl Default for ExpirySection {
    fn default() -> Self {
        Self {
            timezone: "UTC".to_string(),
            soon_window_days: shelfscan_core::SOON_WINDOW_DAYS,
        }
    }
}

impl Default for LogSection {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

impl CatalogSection {
    pub fn delimiter_byte(&self) -> Result<Option<u8>> {
        let Some(d) = self.delimiter.as_deref() else {
            return Ok(None);
        };
        match d {
            "tab" | "\\t" | "\t" => Ok(Some(b'\t')),
            s if s.len() == 1 => Ok(Some(s.as_bytes()[0])),
            other => bail!("invalid catalog delimiter {other:?} (use a single character or \"tab\")"),
        }
    }
}

impl ExpirySection {
    /// Today's date in the configured timezone.
    pub fn today(&self) -> Result<NaiveDate> {
        let tz: Tz = self
            .timezone
            .parse()
            .map_err(|_| anyhow::anyhow!("invalid timezone: {}", self.timezone))?;
        Ok(Utc::now().with_timezone(&tz).date_naive())
    }
}

pub fn config_path() -> Result<PathBuf> {
    Ok(shelfscan_home()?.join("config.toml"))
}

pub fn load_config_from(p: &Path) -> Result<Config> {
    if !p.exists() {
        return Ok(Config::default());
    }
    let s = fs::read_to_string(p).with_context(|| format!("read {}", p.display()))?;
    toml::from_str(&s).with_context(|| format!("parse {}", p.display()))
}

pub fn load_config() -> Result<Config> {
    load_config_from(&config_path()?)
}

/// Like [`load_config_from`], but an unreadable file falls back to defaults and hands the error back.
pub fn load_config_lenient(p: &Path) -> (Config, Option<anyhow::Error>) {
    match load_config_from(p) {
        Ok(cfg) => (cfg, None),
        Err(e) => (Config::default(), Some(e)),
    }
}

pub fn save_config(cfg: &Config) -> Result<()> {
    let p = ensure_shelfscan_home()?.join("config.toml");
    let s = toml::to_string_pretty(cfg).context("serialize config")?;
    fs::write(&p, s).with_context(|| format!("write {}", p.display()))?;
    Ok(())
}

pub fn init_config() -> Result<()> {
    let p = config_path()?;
    if p.exists() {
        println!("Config already exists: {}", p.display());
        return Ok(());
    }
    save_config(&Config::default())?;
    println!("Wrote {}", p.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_config_fills_defaults() {
        let cfg: Config = toml::from_str("[expiry]\ntimezone = \"Asia/Dubai\"\n").unwrap();
        assert_eq!(cfg.expiry.timezone, "Asia/Dubai");
        assert_eq!(cfg.expiry.soon_window_days, 30);
        assert_eq!(cfg.log.level, "info");
        assert!(cfg.catalog.path.is_none());
    }

    #[test]
    fn test_delimiter_byte() {
        let mut c = CatalogSection::default();
        assert_eq!(c.delimiter_byte().unwrap(), None);
        c.delimiter = Some("tab".into());
        assert_eq!(c.delimiter_byte().unwrap(), Some(b'\t'));
        c.delimiter = Some(";".into());
        assert_eq!(c.delimiter_byte().unwrap(), Some(b';'));
        c.delimiter = Some("::".into());
        assert!(c.delimiter_byte().is_err());
    }

    #[test]
    fn test_bad_timezone_is_an_error() {
        let e = ExpirySection {
            timezone: "Mars/Olympus".into(),
            soon_window_days: 30,
        };
        assert!(e.today().is_err());
    }

    #[test]
    fn test_malformed_file_is_lenient_but_strict_load_fails() {
        let dir = tempfile::tempdir().unwrap();
        let p = dir.path().join("config.toml");
        fs::write(&p, "[expiry\ntimezone = ").unwrap();

        assert!(load_config_from(&p).is_err());
        let (cfg, err) = load_config_lenient(&p);
        assert_eq!(cfg.log.level, "info");
        assert!(err.unwrap().to_string().contains("parse"));
    }

    #[test]
    fn test_missing_file_gives_defaults() {
        let cfg = load_config_from(Path::new("/nonexistent/shelfscan.toml")).unwrap();
        assert_eq!(cfg.expiry.timezone, "UTC");
    }
}
