use std::path::{Path, PathBuf};

use anyhow::Context;

use crate::config::StorageConfig;

pub const DEFAULT_FONT_SIZE: u32 = 14;

/// Small integers persisted as one decimal text file per key.
#[derive(Debug, Clone)]
pub struct SettingsStore {
    dir: PathBuf,
    index_file: String,
    font_size_file: String,
}

impl SettingsStore {
    pub fn new(config: &StorageConfig) -> Self {
        Self {
            dir: PathBuf::from(&config.dir),
            index_file: config.index_file.clone(),
            font_size_file: config.font_size_file.clone(),
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Reads an integer, falling back to `default` when the file is missing,
    /// unparsable or outside `min..=max`.
    pub async fn read_int(&self, file: &str, default: i64, min: Option<i64>, max: Option<i64>) -> i64 {
        let path = self.dir.join(file);
        let value = match tokio::fs::read_to_string(&path).await {
            Ok(text) => match text.trim().parse::<i64>() {
                Ok(value) => value,
                Err(err) => {
                    tracing::warn!(path = %path.display(), error = %err, "stored value is not an integer");
                    return default;
                }
            },
            Err(err) => {
                tracing::warn!(path = %path.display(), error = %err, "stored value unavailable");
                return default;
            }
        };

        if min.is_some_and(|min| value < min) || max.is_some_and(|max| value > max) {
            tracing::debug!(path = %path.display(), value, "stored value out of range");
            return default;
        }

        value
    }

    pub async fn write_int(&self, file: &str, value: i64) -> anyhow::Result<()> {
        tokio::fs::create_dir_all(&self.dir)
            .await
            .with_context(|| format!("failed to create state dir {:?}", self.dir))?;
        let path = self.dir.join(file);
        tokio::fs::write(&path, value.to_string())
            .await
            .with_context(|| format!("failed to write {:?}", path))?;
        Ok(())
    }

    pub async fn read_current_index(&self, max_index: usize) -> usize {
        let value = self
            .read_int(&self.index_file, 0, Some(0), Some(max_index as i64))
            .await;
        usize::try_from(value).unwrap_or(0)
    }

    pub async fn write_current_index(&self, index: usize) -> anyhow::Result<()> {
        self.write_int(&self.index_file, index as i64).await
    }

    pub async fn read_font_size(&self) -> u32 {
        let value = self
            .read_int(
                &self.font_size_file,
                DEFAULT_FONT_SIZE as i64,
                Some(1),
                Some(u32::MAX as i64),
            )
            .await;
        u32::try_from(value).unwrap_or(DEFAULT_FONT_SIZE)
    }

    pub async fn write_font_size(&self, font_size: u32) -> anyhow::Result<()> {
        self.write_int(&self.font_size_file, font_size as i64).await
    }
}
