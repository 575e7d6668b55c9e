//! Photo uploads on local disk.

use std::path::{Path, PathBuf};

/// URL prefix uploaded files are served under.
pub const UPLOADS_ROUTE: &str = "/uploads";

/// Directory holding uploaded photos.
#[derive(Debug, Clone)]
pub struct UploadDir {
    root: PathBuf,
}

impl UploadDir {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Creates the directory if it does not exist yet.
    pub async fn ensure(&self) -> std::io::Result<()> {
        tokio::fs::create_dir_all(&self.root).await
    }

    /// Writes `bytes` under the final component of `file_name`, replacing any
    /// existing file of that name. Returns the stored name, or `None` when the
    /// name has no usable file component.
    pub async fn save(&self, file_name: &str, bytes: &[u8]) -> std::io::Result<Option<String>> {
        let Some(name) = sanitize_file_name(file_name) else {
            return Ok(None);
        };

        self.ensure().await?;
        tokio::fs::write(self.root.join(&name), bytes).await?;
        tracing::info!(image_name = %name, size = bytes.len(), "Stored upload");

        Ok(Some(name))
    }

    /// Returns true if a stored file with exactly this name exists.
    ///
    /// Names that are not plain file names never match.
    pub async fn exists(&self, image_name: &str) -> bool {
        if !is_stored_name(image_name) {
            return false;
        }
        tokio::fs::try_exists(self.root.join(image_name))
            .await
            .unwrap_or(false)
    }

    /// Public URL of a stored file.
    pub fn url(&self, image_name: &str) -> String {
        format!("{}/{}", UPLOADS_ROUTE, urlencoding::encode(image_name))
    }
}

/// Returns true if `image_name` is a name `save` could have produced.
pub(crate) fn is_stored_name(image_name: &str) -> bool {
    sanitize_file_name(image_name).as_deref() == Some(image_name)
}

/// Keeps only the final path component of a client-supplied file name.
fn sanitize_file_name(file_name: &str) -> Option<String> {
    // Windows clients may send backslash-separated paths.
    let last = file_name.rsplit(['/', '\\']).next()?;
    let name = Path::new(last).file_name()?.to_str()?.trim();

    if name.is_empty() || name == "." || name == ".." {
        None
    } else {
        Some(name.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sanitize_strips_directories() {
        assert_eq!(sanitize_file_name("beach.jpg").as_deref(), Some("beach.jpg"));
        assert_eq!(
            sanitize_file_name("../../etc/passwd").as_deref(),
            Some("passwd")
        );
        assert_eq!(
            sanitize_file_name("C:\\Users\\bob\\trip.png").as_deref(),
            Some("trip.png")
        );
        assert_eq!(sanitize_file_name(".."), None);
        assert_eq!(sanitize_file_name("photos/"), None);
        assert_eq!(sanitize_file_name(""), None);
    }

    #[tokio::test]
    async fn test_save_and_exists() {
        let dir = tempfile::tempdir().unwrap();
        let uploads = UploadDir::new(dir.path().join("nested"));

        assert!(!uploads.exists("trip.png").await);

        let name = uploads.save("a/b/trip.png", b"png").await.unwrap();
        assert_eq!(name.as_deref(), Some("trip.png"));
        assert!(uploads.exists("trip.png").await);
        assert_eq!(uploads.url("trip.png"), "/uploads/trip.png");

        let bytes = std::fs::read(dir.path().join("nested").join("trip.png")).unwrap();
        assert_eq!(bytes, b"png");
    }

    #[test]
    fn test_stored_names() {
        assert!(is_stored_name("beach.png"));
        assert!(!is_stored_name("sub/beach.png"));
        assert!(!is_stored_name("..\\beach.png"));
        assert!(!is_stored_name(" beach.png"));
        assert!(!is_stored_name(""));
    }

    #[test]
    fn test_url_is_percent_encoded() {
        let uploads = UploadDir::new("/tmp");

        assert_eq!(uploads.url("trip #1.png"), "/uploads/trip%20%231.png");
        assert_eq!(uploads.url("été.jpg"), "/uploads/%C3%A9t%C3%A9.jpg");
    }

    #[tokio::test]
    async fn test_exists_ignores_path_components() {
        let dir = tempfile::tempdir().unwrap();
        let uploads = UploadDir::new(dir.path());
        uploads.save("beach.png", b"png").await.unwrap();

        assert!(uploads.exists("beach.png").await);
        assert!(!uploads.exists("sub/beach.png").await);
        assert!(!uploads.exists("../beach.png").await);
    }

    #[tokio::test]
    async fn test_save_rejects_unusable_name() {
        let dir = tempfile::tempdir().unwrap();
        let uploads = UploadDir::new(dir.path());

        assert_eq!(uploads.save("..", b"x").await.unwrap(), None);
    }
}
