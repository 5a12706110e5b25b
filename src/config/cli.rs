use crate::core::Storage;
use crate::utils::error::Result;
use std::path::PathBuf;

/// File system storage. Relative paths resolve against `base_path`,
/// absolute paths are used as-is.
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
        let full_path = self.resolve(path);
        let data = tokio::fs::read(full_path).await?;
        Ok(data)
    }

    async fn write_file(&self, path: &str, data: &[u8]) -> Result<()> {
        let full_path = self.resolve(path);

        if let Some(parent) = full_path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent).await?;
        }

        tokio::fs::write(&full_path, data).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_write_creates_parent_directories() {
        let temp_dir = TempDir::new().unwrap();
        let storage = LocalStorage::new(temp_dir.path());

        storage
            .write_file("reports/clauses.json", b"[]")
            .await
            .unwrap();

        let data = storage.read_file("reports/clauses.json").await.unwrap();
        assert_eq!(data, b"[]");
        assert!(temp_dir.path().join("reports/clauses.json").exists());
    }

    #[tokio::test]
    async fn test_absolute_paths_ignore_base() {
        let temp_dir = TempDir::new().unwrap();
        let file = temp_dir.path().join("policy.txt");
        std::fs::write(&file, "Coverage applies.").unwrap();

        let storage = LocalStorage::new("/nonexistent-base");
        let data = storage.read_file(file.to_str().unwrap()).await.unwrap();
        assert_eq!(data, b"Coverage applies.");
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let storage = LocalStorage::default();
        let result = tokio_test::block_on(storage.read_file("definitely/missing/policy.pdf"));
        assert!(matches!(result, Err(crate::utils::error::EtlError::IoError(_))));
    }
}
