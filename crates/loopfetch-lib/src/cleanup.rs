use std::io;
use std::path::Path;

/// Best-effort removal of downloaded artifacts.
///
/// Cleanup only runs on paths that are already failing, so removal errors are
/// logged and discarded and never replace the error that triggered them.
#[derive(Clone, Copy, Debug, Default)]
pub struct CleanupManager;

impl CleanupManager {
    pub async fn remove_file(&self, path: &Path) {
        Self::discard(path, tokio::fs::remove_file(path).await);
    }

    pub async fn remove_tree(&self, root: &Path) {
        tracing::debug!(path = %root.display(), "Removing directory tree");
        Self::discard(root, tokio::fs::remove_dir_all(root).await);
    }

    fn discard(path: &Path, result: io::Result<()>) {
        match result {
            Ok(()) => {}
            Err(err) if err.kind() == io::ErrorKind::NotFound => {}
            Err(err) => {
                tracing::debug!(path = %path.display(), error = %err, "Ignoring cleanup failure")
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_remove_tree_removes_nested_content() {
        let temp_dir = tempfile::tempdir().unwrap();
        let root = temp_dir.path().join("garageband");
        let nested = root.join("lp10_ms3_content_2015");
        std::fs::create_dir_all(&nested).unwrap();
        std::fs::write(nested.join("Foo.pkg"), b"loops").unwrap();

        CleanupManager.remove_tree(&root).await;

        assert!(!root.exists());
        assert!(temp_dir.path().exists());
    }

    #[tokio::test]
    async fn test_missing_targets_are_ignored() {
        let temp_dir = tempfile::tempdir().unwrap();
        let missing = temp_dir.path().join("missing");

        CleanupManager.remove_tree(&missing).await;
        CleanupManager.remove_file(&missing.join("Foo.pkg")).await;
    }

    #[tokio::test]
    async fn test_remove_file_on_directory_is_swallowed() {
        let temp_dir = tempfile::tempdir().unwrap();

        CleanupManager.remove_file(temp_dir.path()).await;

        assert!(temp_dir.path().exists());
    }
}
