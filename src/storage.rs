//! File-backed sync state.

use crate::core::traits::WatermarkStore;
use crate::utils::error::{AppError, AppResult};
use serde::{Deserialize, Serialize};
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct SyncState {
    #[serde(default)]
    last_epoch_second: u64,
}

/// Keeps the watermark in a small TOML file.
pub struct FileWatermarkStore {
    path: PathBuf,
}

impl FileWatermarkStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn load_state(&self) -> AppResult<SyncState> {
        if !self.path.exists() {
            return Ok(SyncState::default());
        }

        let content = fs::read_to_string(&self.path)
            .map_err(|e| AppError::Io(format!("Failed to read {}: {}", self.path.display(), e)))?;

        if content.trim().is_empty() {
            return Ok(SyncState::default());
        }

        toml::from_str(&content)
            .map_err(|e| AppError::System(format!("Failed to parse sync state {}: {}", self.path.display(), e)))
    }

    /// Write to a sibling file, flush it to disk, then rename over the target.
    fn save_state(&self, state: &SyncState) -> AppResult<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).map_err(|e| AppError::Io(e.to_string()))?;
        }

        let content = toml::to_string_pretty(state)
            .map_err(|e| AppError::System(format!("Failed to serialize sync state: {}", e)))?;

        let tmp_path = self.path.with_extension("toml.tmp");
        let mut file = fs::File::create(&tmp_path).map_err(|e| AppError::Io(e.to_string()))?;
        file.write_all(content.as_bytes())
            .and_then(|_| file.sync_all())
            .map_err(|e| AppError::Io(format!("Failed to write {}: {}", tmp_path.display(), e)))?;
        drop(file);

        fs::rename(&tmp_path, &self.path)
            .map_err(|e| AppError::Io(format!("Failed to replace {}: {}", self.path.display(), e)))?;

        Ok(())
    }
}

impl WatermarkStore for FileWatermarkStore {
    fn get(&self) -> AppResult<u64> {
        Ok(self.load_state()?.last_epoch_second)
    }

    fn set(&self, value: u64) -> AppResult<()> {
        let state = SyncState {
            last_epoch_second: value,
        };
        self.save_state(&state)?;
        tracing::debug!(watermark = value, path = %self.path.display(), "watermark stored");
        Ok(())
    }
}
