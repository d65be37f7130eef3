use anyhow::{Context, Result};
use focusme_core::{default_data_dir, FileStore};
use std::fs::{self, File};
use std::path::PathBuf;

pub struct Persistence;

impl Persistence {
    fn data_dir() -> Result<PathBuf> {
        let data_dir = default_data_dir().context("Could not determine data directory")?;
        fs::create_dir_all(&data_dir)
            .with_context(|| format!("Failed to create data directory {}", data_dir.display()))?;
        Ok(data_dir)
    }

    pub fn open_store() -> Result<FileStore> {
        let dir = Self::data_dir()?;
        FileStore::open(&dir).with_context(|| format!("Failed to open store in {}", dir.display()))
    }

    /// Log file next to the data; the terminal belongs to the UI.
    pub fn log_file() -> Result<File> {
        let path = Self::data_dir()?.join("focusme.log");
        fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .with_context(|| format!("Failed to open log file {}", path.display()))
    }
}
