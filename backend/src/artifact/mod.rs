//! Artifact store - persist and serve processed CSV files.
//!
//! Every successful run writes its output twice:
//!
//! - `<dir>/processed_data.csv` - the latest artifact, served by `GET /download`
//! - `<dir>/runs/<run_id>.csv` - a per-run copy, where `run_id` is the SHA-256
//!   hex digest of the bytes
//!
//! Both writes go through a temp file followed by a rename, so a reader never
//! observes a partially written file. Identical bytes produce the same run id
//! and byte-identical files.

use std::fs;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::Serialize;
use sha2::{Digest, Sha256};

use crate::error::{ArtifactError, ArtifactResult};

/// File name of the latest artifact.
pub const LATEST_FILE_NAME: &str = "processed_data.csv";

const RUNS_DIR: &str = "runs";

/// Record of one artifact write.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ArtifactReceipt {
    /// SHA-256 hex digest of the artifact bytes.
    pub run_id: String,
    /// Path of the latest artifact.
    pub path: PathBuf,
    /// Size in bytes.
    pub bytes: usize,
    pub created_at: DateTime<Utc>,
}

/// Directory-backed artifact storage.
#[derive(Debug, Clone)]
pub struct ArtifactStore {
    dir: PathBuf,
}

impl ArtifactStore {
    /// Create a store rooted at `dir`. Nothing is created until the first write.
    pub fn new(dir: impl AsRef<Path>) -> Self {
        Self {
            dir: dir.as_ref().to_path_buf(),
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Path of the latest artifact (may not exist yet).
    pub fn latest_path(&self) -> PathBuf {
        self.dir.join(LATEST_FILE_NAME)
    }

    /// Path of the artifact for `run_id` (may not exist yet).
    pub fn run_path(&self, run_id: &str) -> ArtifactResult<PathBuf> {
        validate_run_id(run_id)?;
        Ok(self.dir.join(RUNS_DIR).join(format!("{run_id}.csv")))
    }

    /// Store `content` as the latest artifact and as a per-run copy.
    pub fn write(&self, content: &[u8]) -> ArtifactResult<ArtifactReceipt> {
        let run_id = run_id_for(content);
        let run_path = self.run_path(&run_id)?;

        fs::create_dir_all(self.dir.join(RUNS_DIR))?;
        atomic_write(&run_path, content)?;

        let latest = self.latest_path();
        atomic_write(&latest, content)?;

        Ok(ArtifactReceipt {
            run_id,
            path: latest,
            bytes: content.len(),
            created_at: Utc::now(),
        })
    }

    /// Bytes of the latest artifact.
    pub fn read_latest(&self) -> ArtifactResult<Vec<u8>> {
        read_existing(&self.latest_path(), LATEST_FILE_NAME)
    }

    /// Bytes of a specific run's artifact.
    pub fn read_run(&self, run_id: &str) -> ArtifactResult<Vec<u8>> {
        let path = self.run_path(run_id)?;
        read_existing(&path, run_id)
    }

    /// [`write`](Self::write) on the blocking thread pool.
    pub async fn write_async(&self, content: Vec<u8>) -> ArtifactResult<ArtifactReceipt> {
        let store = self.clone();
        blocking(move || store.write(&content)).await
    }

    /// [`read_latest`](Self::read_latest) on the blocking thread pool.
    pub async fn read_latest_async(&self) -> ArtifactResult<Vec<u8>> {
        let store = self.clone();
        blocking(move || store.read_latest()).await
    }

    /// [`read_run`](Self::read_run) on the blocking thread pool.
    pub async fn read_run_async(&self, run_id: &str) -> ArtifactResult<Vec<u8>> {
        let store = self.clone();
        let run_id = run_id.to_string();
        blocking(move || store.read_run(&run_id)).await
    }

    /// Run ids present in the store, sorted.
    pub fn list_runs(&self) -> ArtifactResult<Vec<String>> {
        let runs_dir = self.dir.join(RUNS_DIR);
        if !runs_dir.exists() {
            return Ok(Vec::new());
        }

        let mut runs: Vec<String> = fs::read_dir(runs_dir)?
            .flatten()
            .filter_map(|entry| {
                let path = entry.path();
                if path.extension().is_some_and(|e| e == "csv") {
                    path.file_stem().and_then(|s| s.to_str()).map(str::to_string)
                } else {
                    None
                }
            })
            .filter(|id| validate_run_id(id).is_ok())
            .collect();
        runs.sort();
        Ok(runs)
    }
}

async fn blocking<T, F>(f: F) -> ArtifactResult<T>
where
    F: FnOnce() -> ArtifactResult<T> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(f)
        .await
        .map_err(|e| ArtifactError::Io(std::io::Error::other(e)))?
}

/// SHA-256 hex digest of `content`.
pub fn run_id_for(content: &[u8]) -> String {
    hex::encode(Sha256::digest(content))
}

/// Run ids are 64 lowercase hex characters.
fn validate_run_id(run_id: &str) -> ArtifactResult<()> {
    let valid = run_id.len() == 64
        && run_id
            .chars()
            .all(|c| c.is_ascii_digit() || ('a'..='f').contains(&c));
    if valid {
        Ok(())
    } else {
        Err(ArtifactError::InvalidRunId(run_id.to_string()))
    }
}

fn read_existing(path: &Path, label: &str) -> ArtifactResult<Vec<u8>> {
    match fs::read(path) {
        Ok(bytes) => Ok(bytes),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            Err(ArtifactError::NotFound(label.to_string()))
        }
        Err(e) => Err(e.into()),
    }
}

/// Write to a sibling temp file, then rename over `path`.
fn atomic_write(path: &Path, content: &[u8]) -> std::io::Result<()> {
    let parent = path.parent().unwrap_or(Path::new("."));
    let temp_path = parent.join(format!(".tmp_{}", uuid::Uuid::new_v4()));

    fs::write(&temp_path, content)?;
    if let Err(e) = fs::rename(&temp_path, path) {
        let _ = fs::remove_file(&temp_path);
        return Err(e);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[tokio::test]
    async fn test_async_access_matches_sync() {
        let dir = tempdir().unwrap();
        let store = ArtifactStore::new(dir.path());

        assert!(matches!(
            store.read_latest_async().await,
            Err(ArtifactError::NotFound(_))
        ));

        let receipt = store.write_async(b"a\n1\n".to_vec()).await.unwrap();
        assert_eq!(store.read_latest_async().await.unwrap(), b"a\n1\n");
        assert_eq!(store.read_run_async(&receipt.run_id).await.unwrap(), b"a\n1\n");
        assert!(matches!(
            store.read_run_async("nope").await,
            Err(ArtifactError::InvalidRunId(_))
        ));
    }

    #[test]
    fn test_read_before_write_is_not_found() {
        let dir = tempdir().unwrap();
        let store = ArtifactStore::new(dir.path());
        assert!(matches!(store.read_latest(), Err(ArtifactError::NotFound(_))));
        assert!(store.list_runs().unwrap().is_empty());
    }

    #[test]
    fn test_write_then_read() {
        let dir = tempdir().unwrap();
        let store = ArtifactStore::new(dir.path().join("static"));

        let receipt = store.write(b"Name,Names_Pronounced\n").unwrap();
        assert_eq!(receipt.bytes, 22);
        assert_eq!(receipt.run_id.len(), 64);
        assert_eq!(receipt.path, store.latest_path());

        assert_eq!(store.read_latest().unwrap(), b"Name,Names_Pronounced\n");
        assert_eq!(store.read_run(&receipt.run_id).unwrap(), b"Name,Names_Pronounced\n");
        assert_eq!(store.list_runs().unwrap(), vec![receipt.run_id]);
    }

    #[test]
    fn test_latest_is_replaced_and_runs_are_kept() {
        let dir = tempdir().unwrap();
        let store = ArtifactStore::new(dir.path());

        let first = store.write(b"a\n1\n").unwrap();
        let second = store.write(b"a\n2\n").unwrap();

        assert_ne!(first.run_id, second.run_id);
        assert_eq!(store.read_latest().unwrap(), b"a\n2\n");
        assert_eq!(store.read_run(&first.run_id).unwrap(), b"a\n1\n");
        assert_eq!(store.list_runs().unwrap().len(), 2);
    }

    #[test]
    fn test_same_bytes_same_run_id() {
        let dir = tempdir().unwrap();
        let store = ArtifactStore::new(dir.path());

        let first = store.write(b"x\n").unwrap();
        let second = store.write(b"x\n").unwrap();
        assert_eq!(first.run_id, second.run_id);
        assert_eq!(store.list_runs().unwrap().len(), 1);
    }

    #[test]
    fn test_no_temp_files_left_behind() {
        let dir = tempdir().unwrap();
        let store = ArtifactStore::new(dir.path());
        store.write(b"x\n").unwrap();

        let leftovers = fs::read_dir(dir.path())
            .unwrap()
            .flatten()
            .filter(|e| e.file_name().to_string_lossy().starts_with(".tmp_"))
            .count();
        assert_eq!(leftovers, 0);
    }

    #[test]
    fn test_invalid_run_ids_never_touch_disk() {
        let dir = tempdir().unwrap();
        let store = ArtifactStore::new(dir.path());

        for id in ["../processed_data", "ABC", "", &"g".repeat(64)] {
            assert!(matches!(store.read_run(id), Err(ArtifactError::InvalidRunId(_))));
        }

        let unknown = "0".repeat(64);
        assert!(matches!(store.read_run(&unknown), Err(ArtifactError::NotFound(_))));
    }

    #[test]
    fn test_run_id_is_sha256() {
        assert_eq!(
            run_id_for(b""),
            "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
        );
    }
}
