use async_trait::async_trait;
use chrono::{DateTime, Utc};
use duedeck_core::schema::{Page, Record};
use duedeck_core::{Collection, CoreError, DataSource, UserId};
use serde::{Deserialize, Serialize};
use std::fs;
use std::io::{Read, Write};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use tokio::task;

pub mod paths;

const FILE_VERSION: u32 = 1;
pub const DEFAULT_PAGE_SIZE: usize = 100;
pub const DEFAULT_MAX_BACKUPS: usize = 10;

/// Both collections of one user, as last pulled from upstream.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct Snapshot {
    pub version: u32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub decks: Vec<Record>,
    pub scores: Vec<Record>,
}

impl Snapshot {
    pub fn new(decks: Vec<Record>, scores: Vec<Record>) -> Self {
        let now = Utc::now();
        Self {
            version: FILE_VERSION,
            created_at: now,
            updated_at: now,
            decks,
            scores,
        }
    }

    /// Changes on every save; ties page cursors to one file version.
    pub fn stamp(&self) -> i64 {
        self.updated_at.timestamp_micros()
    }

    pub fn records(&self, collection: Collection) -> &[Record] {
        match collection {
            Collection::Decks => &self.decks,
            Collection::Scores => &self.scores,
        }
    }
}

/// Serves per-user snapshot files as a paginated data source.
///
/// Layout under `root`: `users/<user>.json` plus `backups/<user>/` holding the
/// most recent `max_backups` timestamped copies. The cursor is
/// `<updated_at micros>:<index of next record>`, so a pass that spans a save is
/// rejected instead of mixing two files.
pub struct SnapshotStore {
    root: PathBuf,
    max_backups: usize,
    page_size: usize,
}

impl SnapshotStore {
    pub fn open_default() -> Result<Self, CoreError> {
        Self::open_with(paths::default_snapshot_root(), DEFAULT_MAX_BACKUPS, DEFAULT_PAGE_SIZE)
    }

    pub fn open_with(root: PathBuf, max_backups: usize, page_size: usize) -> Result<Self, CoreError> {
        ensure_dir(&root.join("users"))?;
        ensure_dir(&root.join("backups"))?;
        Ok(Self {
            root,
            max_backups: max_backups.max(1),
            page_size: page_size.max(1),
        })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn user_file(&self, user: &UserId) -> PathBuf {
        self.root
            .join("users")
            .join(format!("{}.json", paths::file_stem(user.as_str())))
    }

    fn backups_dir(&self, user: &UserId) -> PathBuf {
        self.root.join("backups").join(paths::file_stem(user.as_str()))
    }

    pub async fn load(&self, user: &UserId) -> Result<Option<Snapshot>, CoreError> {
        let p = self.user_file(user);
        let snap = task::spawn_blocking(move || read_snapshot(&p))
            .await
            .map_err(|e| CoreError::Storage(e.to_string()))?
            .map_err(|e| CoreError::Storage(e.to_string()))?;
        match snap {
            Some(s) if s.version > FILE_VERSION => Err(CoreError::Storage(format!(
                "snapshot version {} is newer than supported {FILE_VERSION}",
                s.version
            ))),
            other => Ok(other),
        }
    }

    /// Replaces the user's snapshot, keeping `created_at` of the previous one.
    pub async fn save_snapshot(&self, user: &UserId, mut snapshot: Snapshot) -> Result<(), CoreError> {
        snapshot.version = FILE_VERSION;
        snapshot.updated_at = Utc::now();
        if let Some(prev) = self.load(user).await? {
            snapshot.created_at = prev.created_at;
            if snapshot.stamp() <= prev.stamp() {
                snapshot.updated_at = prev.updated_at + chrono::Duration::microseconds(1);
            }
        }

        let path = self.user_file(user);
        let backups = self.backups_dir(user);
        let keep = self.max_backups;
        let stem = paths::file_stem(user.as_str());
        task::spawn_blocking(move || write_with_backup(&path, &backups, &stem, keep, &snapshot))
            .await
            .map_err(|e| CoreError::Storage(e.to_string()))?
            .map_err(|e| CoreError::Storage(e.to_string()))?;
        tracing::info!(%user, "snapshot saved");
        Ok(())
    }
}

fn ensure_dir(path: &Path) -> Result<(), CoreError> {
    fs::create_dir_all(path).map_err(|e| CoreError::Storage(format!("{}: {e}", path.display())))
}

fn read_snapshot(path: &Path) -> Result<Option<Snapshot>, std::io::Error> {
    if !path.exists() {
        return Ok(None);
    }
    let mut f = fs::File::open(path)?;
    let mut buf = String::new();
    f.read_to_string(&mut buf)?;
    let v = serde_json::from_str::<Snapshot>(&buf)?;
    Ok(Some(v))
}

fn write_with_backup(
    path: &Path,
    backups_dir: &Path,
    stem: &str,
    max_backups: usize,
    snap: &Snapshot,
) -> Result<(), std::io::Error> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::create_dir_all(backups_dir)?;

    let json = serde_json::to_vec_pretty(snap)?;
    let mut tmp = NamedTempFile::new_in(path.parent().unwrap_or_else(|| Path::new(".")))?;
    tmp.write_all(&json)?;
    tmp.flush()?;
    tmp.persist(path).map_err(|e| e.error)?;

    let ts = chrono::Local::now().format("%Y%m%d-%H%M%S-%3f");
    let backup_path = backups_dir.join(format!("{stem}-{ts}.json"));
    let mut btmp = NamedTempFile::new_in(backups_dir)?;
    btmp.write_all(&json)?;
    btmp.flush()?;
    btmp.persist(&backup_path).map_err(|e| e.error)?;

    rotate_backups(backups_dir, max_backups)
}

fn rotate_backups(dir: &Path, keep: usize) -> Result<(), std::io::Error> {
    let mut entries: Vec<_> = fs::read_dir(dir)?
        .filter_map(|e| e.ok())
        .filter(|e| e.path().extension().and_then(|s| s.to_str()) == Some("json"))
        .collect();
    // names embed the timestamp, so they break mtime ties
    entries.sort_by_key(|e| (e.metadata().and_then(|m| m.modified()).ok(), e.file_name()));
    if entries.len() > keep {
        for e in &entries[0..entries.len() - keep] {
            let _ = fs::remove_file(e.path());
        }
    }
    Ok(())
}

fn parse_cursor(collection: Collection, cursor: &str) -> Result<(i64, usize), CoreError> {
    let invalid = || CoreError::fetch(collection, format!("invalid cursor {cursor:?}"));
    let (stamp, index) = cursor.split_once(':').ok_or_else(|| invalid())?;
    Ok((stamp.parse().map_err(|_| invalid())?, index.parse().map_err(|_| invalid())?))
}

fn cursor_for(snap: &Snapshot, index: usize) -> String {
    format!("{}:{index}", snap.stamp())
}

#[async_trait]
impl DataSource for SnapshotStore {
    async fn fetch_page(
        &self,
        user: &UserId,
        collection: Collection,
        cursor: Option<&str>,
    ) -> Result<Page, CoreError> {
        let resume = cursor.map(|c| parse_cursor(collection, c)).transpose()?;
        let snap = self
            .load(user)
            .await
            .map_err(|e| CoreError::fetch(collection, e))?;
        let snap = match (snap, resume) {
            (Some(snap), _) => snap,
            (None, None) => {
                tracing::debug!(%user, "no snapshot on disk");
                return Ok(Page::last(Vec::new()));
            }
            (None, Some(_)) => return Err(CoreError::fetch(collection, "snapshot removed while paging")),
        };
        let start = match resume {
            None => 0,
            Some((stamp, _)) if stamp != snap.stamp() => {
                tracing::warn!(%user, %collection, "snapshot replaced while paging");
                return Err(CoreError::fetch(collection, "snapshot changed while paging; cursor expired"));
            }
            Some((_, index)) => index,
        };

        let all = snap.records(collection);
        if start > all.len() {
            return Err(CoreError::fetch(collection, format!("cursor {start} past end {}", all.len())));
        }
        let end = (start + self.page_size).min(all.len());
        let records = all[start..end].to_vec();
        if end < all.len() {
            Ok(Page::more(records, cursor_for(&snap, end)))
        } else {
            Ok(Page::last(records))
        }
    }
}
