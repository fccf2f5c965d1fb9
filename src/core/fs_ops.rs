// src/core/fs_ops.rs
//! File system helpers for the user data snapshot

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use tokio::fs;

use crate::app_log;

pub struct FsOps;

impl FsOps {
    pub async fn ensure_dir_exists(path: &Path) -> Result<()> {
        if path.as_os_str().is_empty() || path.exists() {
            return Ok(());
        }
        fs::create_dir_all(path)
            .await
            .with_context(|| format!("Failed to create directory: {}", path.display()))?;
        app_log!(info, "Created directory: {}", path.display());
        Ok(())
    }

    /// `Ok(None)` when the file does not exist.
    pub async fn read_optional(path: &Path) -> Result<Option<String>> {
        match fs::read_to_string(path).await {
            Ok(content) => Ok(Some(content)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => {
                Err(e).with_context(|| format!("Failed to read file: {}", path.display()))
            }
        }
    }

    /// Write to a sibling temp file, then rename over `path`.
    pub async fn write_atomic(path: &Path, content: &str) -> Result<()> {
        if let Some(parent) = path.parent() {
            Self::ensure_dir_exists(parent).await?;
        }

        let tmp_path = Self::temp_path(path);
        fs::write(&tmp_path, content)
            .await
            .with_context(|| format!("Failed to write file: {}", tmp_path.display()))?;
        fs::rename(&tmp_path, path).await.with_context(|| {
            format!(
                "Failed to move {} to {}",
                tmp_path.display(),
                path.display()
            )
        })?;

        app_log!(debug, "Written file: {}", path.display());
        Ok(())
    }

    fn temp_path(path: &Path) -> PathBuf {
        let mut name = path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_default();
        name.push(".tmp");
        path.with_file_name(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_write_atomic_then_read() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("users.json");

        assert_eq!(FsOps::read_optional(&path).await.unwrap(), None);

        FsOps::write_atomic(&path, "{}").await.unwrap();
        FsOps::write_atomic(&path, "{\"a\":1}").await.unwrap();

        assert_eq!(
            FsOps::read_optional(&path).await.unwrap().as_deref(),
            Some("{\"a\":1}")
        );
        assert!(!dir.path().join("nested").join("users.json.tmp").exists());
    }
}
