//! File-backed lockout store.
//!
//! Layout inside the state directory:
//! - `lockouts.json`: the records, rewritten whole on every mutation via
//!   temp file + fsync + rename, so readers see the old file or the new one
//! - `lockouts.lock`: advisory `flock` target; shared for reads, exclusive
//!   for read-modify-write
//!
//! The lock is store-scoped rather than per-key.
//!
//! Expired records are pruned whenever the file is rewritten, but `history`
//! keeps one lockout counter for every identity ever locked out, so it grows
//! with the number of distinct identities. Clearing a record leaves the
//! counter alone; only [`LockoutStore::reset`] drops it.
//!
//! Writes go through `.lockouts-*.tmp` files in the state directory. A writer
//! killed before the rename leaves one behind; the next writer removes it
//! while it holds the exclusive lock.

use chrono::{DateTime, Utc};
use fs2::FileExt;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs::{File, OpenOptions};
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

use super::error::{StoreError, StoreResult};
use super::LockoutStore;
use crate::identity::IdentityKey;
use crate::types::LockoutRecord;

/// Name of the state file inside the state directory
pub const STATE_FILE_NAME: &str = "lockouts.json";
/// Name of the lock file inside the state directory
pub const LOCK_FILE_NAME: &str = "lockouts.lock";

const FORMAT_VERSION: u32 = 1;

const TEMP_PREFIX: &str = ".lockouts-";
const TEMP_SUFFIX: &str = ".tmp";

#[derive(Debug, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
struct StoreFile {
    version: u32,
    #[serde(default)]
    lockouts: BTreeMap<IdentityKey, LockoutRecord>,
    #[serde(default)]
    history: BTreeMap<IdentityKey, u32>,
}

impl Default for StoreFile {
    fn default() -> Self {
        Self {
            version: FORMAT_VERSION,
            lockouts: BTreeMap::new(),
            history: BTreeMap::new(),
        }
    }
}

impl StoreFile {
    fn prune_expired(&mut self, now: DateTime<Utc>) -> usize {
        let before = self.lockouts.len();
        self.lockouts.retain(|_, record| record.is_active_at(now));
        before - self.lockouts.len()
    }
}

/// Lockout store persisted in a directory on disk.
#[derive(Debug, Clone)]
pub struct FileLockoutStore {
    dir: PathBuf,
    state_path: PathBuf,
    lock_path: PathBuf,
}

impl FileLockoutStore {
    /// Use `dir` for state. Nothing touches the disk until the first mutation.
    pub fn open(dir: impl AsRef<Path>) -> Self {
        let dir = dir.as_ref().to_path_buf();
        Self {
            state_path: dir.join(STATE_FILE_NAME),
            lock_path: dir.join(LOCK_FILE_NAME),
            dir,
        }
    }

    /// Path of the state file
    pub fn state_path(&self) -> &Path {
        &self.state_path
    }

    /// Shared lock, or `None` when no lock file exists yet. Writers replace
    /// the state file by rename, so reading it unlocked still sees a whole
    /// file.
    fn lock_shared(&self) -> StoreResult<Option<File>> {
        let file = match OpenOptions::new().read(true).open(&self.lock_path) {
            Ok(file) => file,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(StoreError::io(&self.lock_path, e)),
        };
        FileExt::lock_shared(&file).map_err(|e| StoreError::io(&self.lock_path, e))?;
        Ok(Some(file))
    }

    fn lock_exclusive(&self) -> StoreResult<File> {
        std::fs::create_dir_all(&self.dir).map_err(|e| StoreError::io(&self.dir, e))?;
        let file = OpenOptions::new()
            .create(true)
            .read(true)
            .write(true)
            .truncate(false)
            .open(&self.lock_path)
            .map_err(|e| StoreError::io(&self.lock_path, e))?;
        FileExt::lock_exclusive(&file).map_err(|e| StoreError::io(&self.lock_path, e))?;
        Ok(file)
    }

    fn read_state(&self) -> StoreResult<StoreFile> {
        let content = match std::fs::read_to_string(&self.state_path) {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(StoreFile::default()),
            Err(e) if e.kind() == ErrorKind::InvalidData => {
                return Err(StoreError::Corrupt {
                    path: self.state_path.clone(),
                    detail: e.to_string(),
                })
            }
            Err(e) => return Err(StoreError::io(&self.state_path, e)),
        };

        let state: StoreFile =
            serde_json::from_str(&content).map_err(|e| StoreError::Corrupt {
                path: self.state_path.clone(),
                detail: e.to_string(),
            })?;
        if state.version != FORMAT_VERSION {
            return Err(StoreError::Corrupt {
                path: self.state_path.clone(),
                detail: format!("unsupported format version {}", state.version),
            });
        }
        Ok(state)
    }

    fn write_state(&self, state: &StoreFile) -> StoreResult<()> {
        let payload = serde_json::to_vec_pretty(state)?;
        let mut temp = tempfile::Builder::new()
            .prefix(TEMP_PREFIX)
            .suffix(TEMP_SUFFIX)
            .tempfile_in(&self.dir)
            .map_err(|e| StoreError::io(&self.dir, e))?;
        temp.write_all(&payload)
            .map_err(|e| StoreError::io(temp.path(), e))?;
        temp.as_file()
            .sync_all()
            .map_err(|e| StoreError::io(temp.path(), e))?;
        temp.persist(&self.state_path)
            .map_err(|e| StoreError::io(&self.state_path, e.error))?;
        self.sync_dir()
    }

    /// Make the rename itself durable
    #[cfg(unix)]
    fn sync_dir(&self) -> StoreResult<()> {
        File::open(&self.dir)
            .and_then(|dir| dir.sync_all())
            .map_err(|e| StoreError::io(&self.dir, e))
    }

    #[cfg(not(unix))]
    fn sync_dir(&self) -> StoreResult<()> {
        Ok(())
    }

    /// Remove temp files left by writers that died before renaming. Caller
    /// holds the exclusive lock, so none of them belongs to a live writer.
    fn sweep_stale_temp_files(&self) {
        let entries = match std::fs::read_dir(&self.dir) {
            Ok(entries) => entries,
            Err(e) => {
                warn!("Cannot scan {} for stale temp files: {}", self.dir.display(), e);
                return;
            }
        };
        for entry in entries.flatten() {
            let name = entry.file_name();
            let Some(name) = name.to_str() else { continue };
            if !(name.starts_with(TEMP_PREFIX) && name.ends_with(TEMP_SUFFIX)) {
                continue;
            }
            match std::fs::remove_file(entry.path()) {
                Ok(()) => debug!("Removed stale temp file {}", name),
                Err(e) if e.kind() == ErrorKind::NotFound => {}
                Err(e) => warn!("Cannot remove stale temp file {}: {}", name, e),
            }
        }
    }

    fn with_shared<T>(
        &self,
        operation: impl FnOnce(&StoreFile) -> T,
    ) -> StoreResult<T> {
        let lock = self.lock_shared()?;
        let state = self.read_state()?;
        let result = operation(&state);
        drop(lock);
        Ok(result)
    }

    /// Read-modify-write under the exclusive lock. The file is rewritten only
    /// when `operation` reports a change.
    fn with_exclusive_if<T>(
        &self,
        operation: impl FnOnce(&mut StoreFile) -> StoreResult<(T, bool)>,
    ) -> StoreResult<T> {
        let lock = self.lock_exclusive()?;
        let mut state = self.read_state()?;
        let (result, changed) = operation(&mut state)?;
        if changed {
            self.sweep_stale_temp_files();
            self.write_state(&state)?;
        }
        drop(lock);
        Ok(result)
    }

    fn with_exclusive<T>(
        &self,
        operation: impl FnOnce(&mut StoreFile) -> StoreResult<T>,
    ) -> StoreResult<T> {
        self.with_exclusive_if(|state| operation(state).map(|r| (r, true)))
    }
}

impl LockoutStore for FileLockoutStore {
    fn get(&self, identity: &IdentityKey, now: DateTime<Utc>) -> StoreResult<Option<LockoutRecord>> {
        self.with_shared(|state| {
            state
                .lockouts
                .get(identity)
                .filter(|record| record.is_active_at(now))
                .cloned()
        })
    }

    fn put_or_extend(
        &self,
        identity: &IdentityKey,
        reason: &str,
        now: DateTime<Utc>,
    ) -> StoreResult<LockoutRecord> {
        self.with_exclusive(|state| {
            let pruned = state.prune_expired(now);
            if pruned > 0 {
                debug!("Pruned {} expired lockout(s)", pruned);
            }

            let record = match state.lockouts.get_mut(identity) {
                Some(existing) => {
                    existing.extend(reason, now);
                    info!(identity = %identity, expires_at = %existing.expires_at, "Extended lockout");
                    existing.clone()
                }
                None => {
                    let record = LockoutRecord::issue(identity.clone(), reason, now);
                    let count = state.history.entry(identity.clone()).or_insert(0);
                    *count = count.saturating_add(1);
                    info!(identity = %identity, expires_at = %record.expires_at, "Issued lockout");
                    state.lockouts.insert(identity.clone(), record.clone());
                    record
                }
            };
            Ok(record)
        })
    }

    fn clear(&self, identity: &IdentityKey) -> StoreResult<bool> {
        self.with_exclusive_if(|state| {
            let removed = state.lockouts.remove(identity).is_some();
            Ok((removed, removed))
        })
    }

    fn reset(&self) -> StoreResult<()> {
        let lock = self.lock_exclusive()?;
        match std::fs::remove_file(&self.state_path) {
            Ok(()) => info!("Removed lockout state at {}", self.state_path.display()),
            Err(e) if e.kind() == ErrorKind::NotFound => {}
            Err(e) => return Err(StoreError::io(&self.state_path, e)),
        }
        drop(lock);
        Ok(())
    }

    fn prior_lockouts(&self, identity: &IdentityKey) -> StoreResult<u32> {
        self.with_shared(|state| state.history.get(identity).copied().unwrap_or(0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};
    use tempfile::TempDir;

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, 1, 9, 0, 0).unwrap()
    }

    fn temp_store() -> (FileLockoutStore, TempDir) {
        let dir = TempDir::new().expect("temp dir");
        (FileLockoutStore::open(dir.path().join("state")), dir)
    }

    #[test]
    fn missing_state_reads_as_empty_without_creating_files() {
        let (store, dir) = temp_store();
        let u1 = IdentityKey::new("u1");

        assert_eq!(store.get(&u1, t0()).unwrap(), None);
        assert_eq!(store.prior_lockouts(&u1).unwrap(), 0);
        assert!(!dir.path().join("state").exists());
    }

    #[test]
    fn put_then_get_round_trips_through_disk() {
        let (store, _dir) = temp_store();
        let u1 = IdentityKey::new("u1");

        let written = store.put_or_extend(&u1, "Mercury is in retrograde.", t0()).unwrap();
        let reopened = FileLockoutStore::open(store.dir.clone());
        let read = reopened.get(&u1, t0() + Duration::hours(1)).unwrap();

        assert_eq!(read, Some(written));
    }

    #[test]
    fn second_denial_extends_instead_of_stacking() {
        let (store, _dir) = temp_store();
        let u1 = IdentityKey::new("u1");
        let second = t0() + Duration::hours(6);

        store.put_or_extend(&u1, "first", t0()).unwrap();
        let extended = store.put_or_extend(&u1, "second", second).unwrap();

        assert_eq!(extended.issued_at, t0());
        assert_eq!(extended.expires_at, second + Duration::hours(24));
        assert_eq!(extended.reason, "second");
        assert_eq!(store.prior_lockouts(&u1).unwrap(), 1);

        let raw = std::fs::read_to_string(store.state_path()).unwrap();
        let parsed: serde_json::Value = serde_json::from_str(&raw).unwrap();
        assert_eq!(parsed["lockouts"].as_object().unwrap().len(), 1);
    }

    #[test]
    fn expired_record_is_absent_and_replaced_on_next_denial() {
        let (store, _dir) = temp_store();
        let u1 = IdentityKey::new("u1");
        store.put_or_extend(&u1, "old", t0()).unwrap();

        let after = t0() + Duration::hours(24);
        assert_eq!(store.get(&u1, after).unwrap(), None);

        let fresh = store.put_or_extend(&u1, "new", after).unwrap();
        assert_eq!(fresh.issued_at, after);
        assert_eq!(store.prior_lockouts(&u1).unwrap(), 2);
    }

    #[test]
    fn keys_are_independent() {
        let (store, _dir) = temp_store();
        let u1 = IdentityKey::new("u1");
        let u2 = IdentityKey::new("u2");

        store.put_or_extend(&u1, "nope", t0()).unwrap();
        assert!(store.get(&u1, t0()).unwrap().is_some());
        assert!(store.get(&u2, t0()).unwrap().is_none());
    }

    #[test]
    fn clear_removes_only_the_named_record() {
        let (store, _dir) = temp_store();
        let u1 = IdentityKey::new("u1");
        let u2 = IdentityKey::new("u2");
        store.put_or_extend(&u1, "nope", t0()).unwrap();
        store.put_or_extend(&u2, "nope", t0()).unwrap();

        assert!(store.clear(&u1).unwrap());
        assert!(!store.clear(&u1).unwrap());
        assert!(store.get(&u1, t0()).unwrap().is_none());
        assert!(store.get(&u2, t0()).unwrap().is_some());
    }

    #[test]
    fn corrupt_state_is_reported_not_ignored() {
        let (store, _dir) = temp_store();
        let u1 = IdentityKey::new("u1");
        store.put_or_extend(&u1, "nope", t0()).unwrap();
        std::fs::write(store.state_path(), "{ not json").unwrap();

        assert!(store.get(&u1, t0()).unwrap_err().is_corrupt());
        assert!(store.put_or_extend(&u1, "again", t0()).unwrap_err().is_corrupt());
    }

    #[test]
    fn state_written_without_a_lock_file_is_still_read() {
        let (store, _dir) = temp_store();
        std::fs::create_dir_all(&store.dir).unwrap();
        std::fs::write(store.state_path(), "not json").unwrap();

        assert!(store
            .get(&IdentityKey::new("u1"), t0())
            .unwrap_err()
            .is_corrupt());
        assert!(!store.lock_path.exists());
    }

    #[test]
    fn unknown_version_is_corrupt() {
        let (store, _dir) = temp_store();
        let u1 = IdentityKey::new("u1");
        store.put_or_extend(&u1, "nope", t0()).unwrap();
        std::fs::write(store.state_path(), r#"{"version": 99}"#).unwrap();

        assert!(store.get(&u1, t0()).unwrap_err().is_corrupt());
    }

    #[test]
    fn reset_recovers_from_corruption() {
        let (store, _dir) = temp_store();
        let u1 = IdentityKey::new("u1");
        store.put_or_extend(&u1, "nope", t0()).unwrap();
        std::fs::write(store.state_path(), "garbage").unwrap();

        store.reset().unwrap();
        assert_eq!(store.get(&u1, t0()).unwrap(), None);
        assert_eq!(store.prior_lockouts(&u1).unwrap(), 0);
    }

    #[test]
    fn writer_sweeps_temp_files_left_by_a_dead_writer() {
        let (store, _dir) = temp_store();
        let u1 = IdentityKey::new("u1");
        store.put_or_extend(&u1, "first", t0()).unwrap();

        let stale = store.dir.join(".lockouts-abc123.tmp");
        let unrelated = store.dir.join("notes.tmp");
        std::fs::write(&stale, "half a write").unwrap();
        std::fs::write(&unrelated, "keep me").unwrap();

        store.put_or_extend(&u1, "second", t0()).unwrap();

        assert!(!stale.exists());
        assert!(unrelated.exists());
        let leftovers: Vec<_> = std::fs::read_dir(&store.dir)
            .unwrap()
            .filter_map(|entry| entry.ok())
            .filter(|entry| entry.file_name().to_string_lossy().starts_with(TEMP_PREFIX))
            .collect();
        assert!(leftovers.is_empty());
    }

    #[test]
    fn history_outlives_clear_and_only_reset_drops_it() {
        let (store, _dir) = temp_store();
        let u1 = IdentityKey::new("u1");
        store.put_or_extend(&u1, "nope", t0()).unwrap();
        store.clear(&u1).unwrap();
        store
            .put_or_extend(&IdentityKey::new("u2"), "nope", t0() + Duration::hours(30))
            .unwrap();

        assert_eq!(store.prior_lockouts(&u1).unwrap(), 1);

        store.reset().unwrap();
        assert_eq!(store.prior_lockouts(&u1).unwrap(), 0);
    }

    #[test]
    fn reads_never_modify_the_state_file() {
        let (store, _dir) = temp_store();
        let u1 = IdentityKey::new("u1");
        store.put_or_extend(&u1, "nope", t0()).unwrap();
        let before = std::fs::read(store.state_path()).unwrap();

        for hours in [0, 12, 48] {
            store.get(&u1, t0() + Duration::hours(hours)).unwrap();
            store.prior_lockouts(&u1).unwrap();
        }

        assert_eq!(std::fs::read(store.state_path()).unwrap(), before);
    }
}
