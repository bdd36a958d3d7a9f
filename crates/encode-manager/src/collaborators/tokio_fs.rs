//! `tokio::fs`-backed [`FsUtil`] (§4.8 Collaborator implementations).

use async_trait::async_trait;
use encode_engine::FsUtil;
use std::path::Path;

#[derive(Debug, Default, Clone, Copy)]
pub struct TokioFsUtil;

#[async_trait]
impl FsUtil for TokioFsUtil {
    async fn stat(&self, path: &Path) -> std::io::Result<()> {
        tokio::fs::metadata(path).await.map(|_| ())
    }

    async fn mkdir_recursive(&self, path: &Path) -> std::io::Result<()> {
        tokio::fs::create_dir_all(path).await
    }

    async fn unlink(&self, path: &Path) -> std::io::Result<()> {
        tokio::fs::remove_file(path).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn stat_reports_missing_files_as_errors() {
        let fs = TokioFsUtil;
        let err = fs.stat(Path::new("/nonexistent/path/surely")).await;
        assert!(err.is_err());
    }

    #[tokio::test]
    async fn mkdir_and_unlink_round_trip_through_a_temp_dir() {
        let fs = TokioFsUtil;
        let dir = std::env::temp_dir().join(format!("encode-manager-test-{}", std::process::id()));
        let nested = dir.join("a/b/c");
        fs.mkdir_recursive(&nested).await.unwrap();
        assert!(fs.stat(&nested).await.is_ok());

        let file = nested.join("out.mp4");
        tokio::fs::write(&file, b"x").await.unwrap();
        assert!(fs.stat(&file).await.is_ok());
        fs.unlink(&file).await.unwrap();
        assert!(fs.stat(&file).await.is_err());

        tokio::fs::remove_dir_all(&dir).await.unwrap();
    }
}
