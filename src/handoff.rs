// src/handoff.rs

use std::fs;
use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use chrono::Utc;
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::debug;

/// Run-scoped hand-off between pipeline steps: each step writes its output
/// under a key and the downstream step takes it back out. Keys are
/// write-once and read-once, which is all a linear four-step run needs and
/// makes accidental reuse of stale payloads a hard error.
///
/// Payloads live as `<key>.json` files in a per-run directory, so steps can
/// also execute as separate processes sharing the directory.
pub struct RunStore {
    run_dir: PathBuf,
}

impl RunStore {
    /// Create a fresh run directory under `root`, named by UTC timestamp.
    pub fn create(root: impl Into<PathBuf>) -> Result<Self> {
        let run_dir = root
            .into()
            .join(format!("run-{}", Utc::now().format("%Y%m%dT%H%M%S%.3f")));
        fs::create_dir_all(&run_dir)
            .with_context(|| format!("creating run directory {:?}", &run_dir))?;
        Ok(RunStore { run_dir })
    }

    /// Open an existing run directory, for steps running as separate
    /// processes against a shared run.
    pub fn open(run_dir: impl Into<PathBuf>) -> Result<Self> {
        let run_dir = run_dir.into();
        if !run_dir.is_dir() {
            bail!("run directory {:?} does not exist", run_dir);
        }
        Ok(RunStore { run_dir })
    }

    pub fn run_dir(&self) -> &PathBuf {
        &self.run_dir
    }

    /// Store a step output. Writing a key twice is an error.
    pub fn put<T: Serialize>(&self, key: &str, value: &T) -> Result<()> {
        let path = self.key_path(key)?;
        if path.exists() {
            bail!("hand-off key \"{}\" already written for this run", key);
        }
        let payload = serde_json::to_vec(value).with_context(|| format!("serializing {}", key))?;
        fs::write(&path, payload).with_context(|| format!("writing {:?}", &path))?;
        debug!(key, path = %path.display(), "hand-off stored");
        Ok(())
    }

    /// Take a step output back out, consuming it.
    pub fn take<T: DeserializeOwned>(&self, key: &str) -> Result<T> {
        let path = self.key_path(key)?;
        let payload = fs::read(&path)
            .with_context(|| format!("hand-off key \"{}\" was never written", key))?;
        let value =
            serde_json::from_slice(&payload).with_context(|| format!("deserializing {}", key))?;
        fs::remove_file(&path).with_context(|| format!("consuming {:?}", &path))?;
        debug!(key, "hand-off consumed");
        Ok(value)
    }

    fn key_path(&self, key: &str) -> Result<PathBuf> {
        if key.is_empty() || !key.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
            bail!("invalid hand-off key \"{}\"", key);
        }
        Ok(self.run_dir.join(format!("{}.json", key)))
    }
}
