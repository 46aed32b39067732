//! # State File
//!
//! The registry runtime persisted as pretty-printed JSON. Mutating commands
//! load the file, apply one operation in memory, and write the result back
//! only if the operation succeeded. A rejected operation never touches the
//! file.
//!
//! Every read-modify-write holds an exclusive `fs2` lock on a sibling
//! `<state>.lock` file from before the load until after the replacement,
//! so concurrent invocations are serialized and none loses another's
//! update. Writes go to a uniquely named temporary file in the same
//! directory that is then persisted over the target, so an interrupted
//! write cannot leave a truncated state file.

use std::ffi::OsString;
use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use fs2::FileExt;
use tempfile::NamedTempFile;

use diploma_state::{RegistryError, RegistryRuntime, SNAPSHOT_VERSION};

/// Exclusive lock on a state file, released on drop.
#[derive(Debug)]
pub struct StateLock {
    file: File,
}

impl Drop for StateLock {
    fn drop(&mut self) {
        // Closing the handle releases the lock as well.
        let _ = self.file.unlock();
    }
}

/// Handle to a state file on disk.
#[derive(Debug, Clone)]
pub struct StateStore {
    path: PathBuf,
}

impl StateStore {
    /// Refer to the state file at `path`. Nothing is read yet.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Location of the state file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Location of the lock file guarding the state file.
    pub fn lock_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(OsString::from)
            .unwrap_or_else(|| OsString::from("state"));
        name.push(".lock");
        self.path.with_file_name(name)
    }

    /// Whether the state file exists.
    pub fn exists(&self) -> bool {
        self.path.exists()
    }

    fn parent_dir(&self) -> &Path {
        match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        }
    }

    /// Block until this process holds the exclusive state lock.
    pub fn lock(&self) -> Result<StateLock> {
        let parent = self.parent_dir();
        std::fs::create_dir_all(parent)
            .with_context(|| format!("failed to create state directory: {}", parent.display()))?;
        let lock_path = self.lock_path();
        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(false)
            .open(&lock_path)
            .with_context(|| format!("failed to open lock file: {}", lock_path.display()))?;
        file.lock_exclusive()
            .with_context(|| format!("failed to lock state file: {}", lock_path.display()))?;
        tracing::trace!(path = %lock_path.display(), "state lock acquired");
        Ok(StateLock { file })
    }

    /// Read and validate the runtime.
    pub fn load(&self) -> Result<RegistryRuntime> {
        if !self.path.exists() {
            bail!(
                "state file not found: {} (run `diploma init` first)",
                self.path.display()
            );
        }
        let content = std::fs::read_to_string(&self.path)
            .with_context(|| format!("failed to read state file: {}", self.path.display()))?;
        let runtime: RegistryRuntime = serde_json::from_str(&content)
            .with_context(|| format!("corrupted state file: {}", self.path.display()))?;
        if runtime.version != SNAPSHOT_VERSION {
            bail!(
                "unsupported state file version {} (expected {SNAPSHOT_VERSION})",
                runtime.version
            );
        }
        tracing::debug!(
            path = %self.path.display(),
            students = runtime.registry.students().len(),
            events = runtime.events.len(),
            "state loaded"
        );
        Ok(runtime)
    }

    /// Replace the state file while `_lock` is held.
    pub fn write(&self, _lock: &StateLock, runtime: &RegistryRuntime) -> Result<()> {
        let json = serde_json::to_string_pretty(runtime)?;
        let parent = self.parent_dir();
        let mut tmp = NamedTempFile::new_in(parent)
            .with_context(|| format!("failed to create temporary file in {}", parent.display()))?;
        tmp.write_all(json.as_bytes())
            .and_then(|()| tmp.as_file().sync_all())
            .with_context(|| format!("failed to write state file: {}", tmp.path().display()))?;
        tmp.persist(&self.path)
            .with_context(|| format!("failed to replace state file: {}", self.path.display()))?;
        tracing::debug!(path = %self.path.display(), "state saved");
        Ok(())
    }

    /// Write the runtime under the state lock, replacing any existing file.
    pub fn save(&self, runtime: &RegistryRuntime) -> Result<()> {
        let lock = self.lock()?;
        self.write(&lock, runtime)
    }

    /// Load, change and write back the runtime under one lock.
    ///
    /// Nothing is written when `op` fails.
    pub fn update<T>(&self, op: impl FnOnce(&mut RegistryRuntime) -> Result<T>) -> Result<T> {
        let lock = self.lock()?;
        let mut runtime = self.load()?;
        let value = op(&mut runtime)?;
        self.write(&lock, &runtime)?;
        Ok(value)
    }

    /// Apply one registry operation and persist the result if it succeeds.
    pub fn apply<T>(
        &self,
        op: impl FnOnce(&mut RegistryRuntime) -> Result<T, RegistryError>,
    ) -> Result<T> {
        self.update(|runtime| Ok(op(runtime)?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use diploma_core::{AccountId, Amount, CredentialId, RegistryConfig};

    fn runtime() -> RegistryRuntime {
        RegistryRuntime::new(RegistryConfig::new(
            AccountId::new("university").unwrap(),
            Amount::new(10),
        ))
    }

    #[test]
    fn save_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let store = StateStore::new(dir.path().join("nested").join("state.json"));
        store.save(&runtime()).unwrap();
        assert!(store.exists());
        assert_eq!(store.load().unwrap(), runtime());
    }

    #[test]
    fn load_missing_mentions_init() {
        let dir = tempfile::tempdir().unwrap();
        let store = StateStore::new(dir.path().join("absent.json"));
        let err = store.load().unwrap_err().to_string();
        assert!(err.contains("diploma init"));
    }

    #[test]
    fn load_rejects_garbage() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("state.json");
        std::fs::write(&path, "{ not json").unwrap();
        let err = StateStore::new(&path).load().unwrap_err();
        assert!(format!("{err:#}").contains("corrupted state file"));
    }

    #[test]
    fn load_rejects_unknown_version() {
        let dir = tempfile::tempdir().unwrap();
        let store = StateStore::new(dir.path().join("state.json"));
        let mut rt = runtime();
        rt.version = 99;
        store.save(&rt).unwrap();
        assert!(store.load().unwrap_err().to_string().contains("version 99"));
    }

    #[test]
    fn failed_apply_leaves_file_untouched() {
        let dir = tempfile::tempdir().unwrap();
        let store = StateStore::new(dir.path().join("state.json"));
        store.save(&runtime()).unwrap();
        let before = std::fs::read(store.path()).unwrap();

        let result = store.apply(|rt| {
            rt.set_eligible(
                &AccountId::new("mallory").unwrap(),
                &CredentialId::new("x").unwrap(),
                true,
            )
        });
        assert!(result.is_err());
        assert_eq!(std::fs::read(store.path()).unwrap(), before);
    }

    #[test]
    fn lock_file_sits_next_to_state() {
        let store = StateStore::new("/var/lib/diploma/state.json");
        assert_eq!(store.lock_path(), PathBuf::from("/var/lib/diploma/state.json.lock"));
    }

    #[test]
    fn concurrent_applies_keep_every_update() {
        const THREADS: usize = 8;
        const PER_THREAD: usize = 25;

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("state.json");
        StateStore::new(&path).save(&runtime()).unwrap();

        let handles: Vec<_> = (0..THREADS)
            .map(|t| {
                let store = StateStore::new(&path);
                std::thread::spawn(move || {
                    for n in 0..PER_THREAD {
                        let name = format!("s{t}-{n}");
                        store
                            .apply(|rt| {
                                rt.submit_credential(
                                    &AccountId::new(name.as_str()).unwrap(),
                                    CredentialId::new(name.as_str()).unwrap(),
                                )
                            })
                            .unwrap();
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        let stored = StateStore::new(&path).load().unwrap();
        assert_eq!(stored.registry.students().len(), THREADS * PER_THREAD);
        assert_eq!(stored.events.len(), THREADS * PER_THREAD);
        assert!(stored.registry.students().check_consistency().is_ok());
    }

    #[test]
    fn failed_update_keeps_lock_usable() {
        let dir = tempfile::tempdir().unwrap();
        let store = StateStore::new(dir.path().join("state.json"));
        store.save(&runtime()).unwrap();

        let err = store
            .update(|_| -> Result<()> { bail!("refused") })
            .unwrap_err();
        assert_eq!(err.to_string(), "refused");
        store.save(&runtime()).unwrap();
    }

    #[test]
    fn successful_apply_persists() {
        let dir = tempfile::tempdir().unwrap();
        let store = StateStore::new(dir.path().join("state.json"));
        store.save(&runtime()).unwrap();
        store
            .apply(|rt| {
                rt.submit_credential(
                    &AccountId::new("alice").unwrap(),
                    CredentialId::new("alice").unwrap(),
                )
            })
            .unwrap();
        assert_eq!(store.load().unwrap().registry.students().len(), 1);
    }
}
