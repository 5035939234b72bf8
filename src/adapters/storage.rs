use crate::core::Storage;
use crate::utils::error::Result;
use std::path::{Path, PathBuf};

/// Filesystem storage. Relative paths resolve against `base_path`; absolute
/// paths are used as given.
#[derive(Debug, Clone)]
pub struct LocalStorage {
    base_path: PathBuf,
}

impl LocalStorage {
    pub fn new(base_path: impl Into<PathBuf>) -> Self {
        Self {
            base_path: base_path.into(),
        }
    }

    fn resolve(&self, path: &str) -> PathBuf {
        self.base_path.join(path)
    }
}

impl Default for LocalStorage {
    fn default() -> Self {
        Self::new(".")
    }
}

impl Storage for LocalStorage {
    async fn read_file(&self, path: &str) -> Result<Vec<u8>> {
        let data = tokio::fs::read(self.resolve(path)).await?;
        Ok(data)
    }

    async fn write_file(&self, path: &str, data: &[u8]) -> Result<()> {
        let full_path = self.resolve(path);

        if let Some(parent) = full_path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent).await?;
        }

        tokio::fs::write(full_path, data).await?;
        Ok(())
    }
}

pub fn join_output(output_dir: &str, file_name: &str) -> String {
    Path::new(output_dir)
        .join(file_name)
        .to_string_lossy()
        .into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_write_then_read_under_base() {
        let dir = TempDir::new().unwrap();
        let storage = LocalStorage::new(dir.path());

        storage
            .write_file("nested/summary.json", b"{}")
            .await
            .unwrap();
        assert!(dir.path().join("nested/summary.json").exists());
        assert_eq!(storage.read_file("nested/summary.json").await.unwrap(), b"{}");
    }

    #[tokio::test]
    async fn test_absolute_path_ignores_base() {
        let dir = TempDir::new().unwrap();
        let file = dir.path().join("hits.tbl");
        std::fs::write(&file, "# empty\n").unwrap();

        let storage = LocalStorage::new("/nonexistent-base");
        let data = storage.read_file(file.to_str().unwrap()).await.unwrap();
        assert_eq!(data, b"# empty\n");
    }

    #[tokio::test]
    async fn test_missing_file_is_io_error() {
        let storage = LocalStorage::default();
        let err = storage.read_file("definitely/not/here.fa").await.unwrap_err();
        assert!(matches!(err, crate::utils::error::ClassifError::IoError(_)));
    }

    #[test]
    fn test_join_output() {
        assert_eq!(join_output("out", "job-summary.json"), "out/job-summary.json");
    }
}
