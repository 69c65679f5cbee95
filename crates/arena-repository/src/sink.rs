use crate::error::{Error, Result};
use crate::summary::Summary;
use arena_types::RunResult;
use async_trait::async_trait;
use std::path::Path;

/// One format-specific output of the Result Repository. Each sink commits
/// atomically: write to a temp sibling file, then rename (spec §4.7). A
/// sink failing never corrupts its own prior output or any other sink's.
#[async_trait]
pub trait ResultSink: Send + Sync {
    fn name(&self) -> &'static str;

    async fn save(&self, results: &[RunResult], summary: &Summary) -> Result<()>;
}

/// Writes `contents` to `path` by first writing to `path.tmp` and renaming
/// it into place, so a crash or concurrent reader never observes a
/// half-written file.
pub async fn write_atomic(sink: &'static str, path: &Path, contents: &[u8]) -> Result<()> {
    if let Some(parent) = path.parent() {
        tokio::fs::create_dir_all(parent)
            .await
            .map_err(|source| Error::Io { sink: sink.to_string(), source })?;
    }

    let tmp_path = tmp_sibling(path);
    tokio::fs::write(&tmp_path, contents)
        .await
        .map_err(|source| Error::Io { sink: sink.to_string(), source })?;
    tokio::fs::rename(&tmp_path, path)
        .await
        .map_err(|source| Error::Io { sink: sink.to_string(), source })?;
    Ok(())
}

fn tmp_sibling(path: &Path) -> std::path::PathBuf {
    let mut name = path.file_name().and_then(|n| n.to_str()).unwrap_or("out").to_string();
    name.push_str(".tmp");
    match path.parent() {
        Some(parent) => parent.join(name),
        None => std::path::PathBuf::from(name),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn write_atomic_leaves_no_tmp_file_behind_on_success() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.json");
        write_atomic("json", &path, b"{}").await.unwrap();

        assert!(path.exists());
        assert!(!tmp_sibling(&path).exists());
        assert_eq!(tokio::fs::read(&path).await.unwrap(), b"{}");
    }

    #[tokio::test]
    async fn write_atomic_creates_missing_parent_directories() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested/deep/out.json");
        write_atomic("json", &path, b"x").await.unwrap();
        assert!(path.exists());
    }
}
