use anyhow::{anyhow, bail, Context, Result};
use clap::ValueEnum;
use directories::ProjectDirs;
use duedeck_airtable::{AirtableConfig, AirtableSource};
use duedeck_core::{DataSource, DeckService, UserId};
use duedeck_json::{SnapshotStore, DEFAULT_MAX_BACKUPS, DEFAULT_PAGE_SIZE};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use crate::cli::opts::Cli;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceKind {
    Airtable,
    Json,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SnapshotSettings {
    pub dir: Option<PathBuf>,
    pub page_size: usize,
    pub max_backups: usize,
}

impl Default for SnapshotSettings {
    fn default() -> Self {
        Self {
            dir: None,
            page_size: DEFAULT_PAGE_SIZE,
            max_backups: DEFAULT_MAX_BACKUPS,
        }
    }
}

/// `duedeck.toml`, overlaid by flags and environment.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub source: SourceKind,
    pub user: Option<String>,
    pub request_timeout_secs: Option<u64>,
    /// Unset or 0 re-fetches on every request.
    pub cache_ttl_secs: Option<u64>,
    pub api_addr: String,
    pub airtable: Option<AirtableConfig>,
    pub snapshots: SnapshotSettings,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            source: SourceKind::Airtable,
            user: None,
            request_timeout_secs: Some(30),
            cache_ttl_secs: None,
            api_addr: "127.0.0.1:8080".to_string(),
            airtable: None,
            snapshots: SnapshotSettings::default(),
        }
    }
}

pub fn default_config_file() -> Option<PathBuf> {
    ProjectDirs::from("com", "duedeck", "DueDeck").map(|pd| pd.config_dir().join("duedeck.toml"))
}

impl Settings {
    pub fn from_toml(text: &str) -> Result<Self> {
        Ok(toml::from_str(text)?)
    }

    /// Reads `path`, or the default config file when it exists.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let file = match path {
            Some(p) => Some(p.to_path_buf()),
            None => default_config_file().filter(|p| p.exists()),
        };
        let Some(file) = file else {
            return Ok(Self::default());
        };
        let text = std::fs::read_to_string(&file)
            .with_context(|| format!("reading {}", file.display()))?;
        let settings = Self::from_toml(&text).with_context(|| format!("parsing {}", file.display()))?;
        tracing::debug!(file = %file.display(), "loaded settings");
        Ok(settings)
    }

    pub fn resolve(cli: &Cli) -> Result<Self> {
        let mut s = Self::load(cli.config.as_deref())?;
        s.apply_cli(cli)?;
        Ok(s)
    }

    pub fn apply_cli(&mut self, cli: &Cli) -> Result<()> {
        if let Some(src) = cli.source {
            self.source = src;
        }
        if let Some(u) = &cli.user {
            self.user = Some(u.clone());
        }
        if let Some(d) = &cli.snapshot_dir {
            self.snapshots.dir = Some(d.clone());
        }
        if let Some(at) = self.airtable.as_mut() {
            if let Some(k) = &cli.airtable_api_key {
                at.api_key = k.clone();
            }
            if let Some(b) = &cli.airtable_base_id {
                at.base_id = b.clone();
            }
        } else {
            match (&cli.airtable_api_key, &cli.airtable_base_id) {
                (Some(k), Some(b)) => self.airtable = Some(AirtableConfig::new(k.clone(), b.clone())),
                (None, None) => {}
                _ => bail!("Airtable needs both an API key and a base id"),
            }
        }
        Ok(())
    }

    pub fn user(&self) -> Result<UserId> {
        self.user
            .as_deref()
            .filter(|u| !u.trim().is_empty())
            .map(UserId::new)
            .ok_or_else(|| anyhow!("no user given; pass --user or set DUEDECK_USER"))
    }

    pub fn airtable_source(&self) -> Result<AirtableSource> {
        let cfg = self
            .airtable
            .clone()
            .ok_or_else(|| anyhow!("Airtable is not configured; set AIRTABLE_API_KEY and AIRTABLE_BASE_ID"))?;
        Ok(AirtableSource::new(cfg)?)
    }

    pub fn snapshot_store(&self) -> Result<SnapshotStore> {
        let store = match &self.snapshots.dir {
            Some(dir) => SnapshotStore::open_with(dir.clone(), self.snapshots.max_backups, self.snapshots.page_size)?,
            None => SnapshotStore::open_with(
                duedeck_json::paths::default_snapshot_root(),
                self.snapshots.max_backups,
                self.snapshots.page_size,
            )?,
        };
        Ok(store)
    }

    pub fn open_source(&self) -> Result<Arc<dyn DataSource>> {
        Ok(match self.source {
            SourceKind::Airtable => Arc::new(self.airtable_source()?),
            SourceKind::Json => Arc::new(self.snapshot_store()?),
        })
    }

    pub fn deck_service(&self) -> Result<DeckService> {
        let source = self.open_source()?;
        tracing::info!(source = ?self.source, cache_ttl_secs = ?self.cache_ttl_secs, "deck service ready");
        Ok(DeckService::new(source)
            .with_timeout(self.request_timeout_secs.filter(|s| *s > 0).map(Duration::from_secs))
            .with_cache_ttl(self.cache_ttl_secs.map(Duration::from_secs)))
    }
}
