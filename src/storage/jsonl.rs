//! JSONL storage for the network
//!
//! The network lives in `.subway/network.jsonl` with one tagged JSON record
//! per line. Writers hold an exclusive lock on `.subway/network.lock` for the
//! whole read → decide → write cycle, so concurrent commands touching the
//! same line are serialized.

use std::fs::{self, File, OpenOptions};
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use fs2::FileExt;
use tracing::debug;

use super::network::{Network, Record};

/// Store for network data in JSONL format
pub struct NetworkStore {
    path: PathBuf,
    lock_path: PathBuf,
}

impl NetworkStore {
    /// Creates a new network store at the given path
    pub fn new(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let lock_path = path.with_extension("lock");
        Self { path, lock_path }
    }

    /// Creates the default store for a project
    pub fn for_project(project_root: &Path) -> Self {
        Self::new(project_root.join(".subway").join("network.jsonl"))
    }

    /// Returns the path to the store file
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Reads the whole network under a shared lock
    pub fn load(&self) -> Result<Network> {
        let lock = self.open_lock()?;
        lock.lock_shared()
            .context("Failed to acquire read lock on network store")?;

        // Lock is released when `lock` is dropped
        self.read_all()
    }

    /// Runs `f` against the stored network and writes the result back
    ///
    /// The exclusive lock is held from the read until the write completes.
    /// If `f` fails nothing is written, so the file keeps its prior state.
    pub fn transaction<T, F>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&mut Network) -> Result<T>,
    {
        let lock = self.open_lock()?;
        lock.lock_exclusive()
            .context("Failed to acquire write lock on network store")?;
        debug!(path = %self.path.display(), "Network store locked");

        let mut network = self.read_all()?;
        let value = f(&mut network)?;
        self.write_all(&network)?;

        debug!(path = %self.path.display(), "Network store committed");
        Ok(value)
    }

    fn open_lock(&self) -> Result<File> {
        if let Some(parent) = self.lock_path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
        }

        OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(false)
            .open(&self.lock_path)
            .with_context(|| format!("Failed to open lock file: {}", self.lock_path.display()))
    }

    fn read_all(&self) -> Result<Network> {
        if !self.path.exists() {
            return Ok(Network::new());
        }

        let file = File::open(&self.path)
            .with_context(|| format!("Failed to open network store: {}", self.path.display()))?;

        let reader = BufReader::new(file);
        let mut records = Vec::new();

        for (line_num, line) in reader.lines().enumerate() {
            let line = line.with_context(|| format!("Failed to read line {}", line_num + 1))?;

            if line.trim().is_empty() {
                continue;
            }

            let record: Record = serde_json::from_str(&line)
                .with_context(|| format!("Failed to parse record at line {}", line_num + 1))?;
            records.push(record);
        }

        debug!(path = %self.path.display(), records = records.len(), "Network store read");
        Ok(Network::from_records(records)?)
    }

    /// Writes all records (full rewrite via temp file + rename)
    fn write_all(&self, network: &Network) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
        }

        let temp_path = self.path.with_extension("jsonl.tmp");

        {
            let file = File::create(&temp_path)
                .with_context(|| format!("Failed to create temp file: {}", temp_path.display()))?;
            let mut writer = BufWriter::new(file);

            for record in network.records() {
                let line = serde_json::to_string(&record).context("Failed to serialize record")?;
                writeln!(writer, "{}", line).context("Failed to write record")?;
            }

            writer.flush().context("Failed to flush network store")?;
        }

        // Atomic rename
        fs::rename(&temp_path, &self.path).with_context(|| {
            format!(
                "Failed to rename {} to {}",
                temp_path.display(),
                self.path.display()
            )
        })?;

        Ok(())
    }
}
