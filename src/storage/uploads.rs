use std::path::{Path, PathBuf};

use bytes::Bytes;
use tokio::{fs, io::AsyncWriteExt};
use uuid::Uuid;

use crate::{config::UploadConfig, error::AppResult};

/// URL prefix under which the public directory is served.
pub const PUBLIC_URL_PREFIX: &str = "/public";
const AVATARS_DIR: &str = "avatars";

/// Stores uploaded avatars inside the public directory.
#[derive(Debug, Clone)]
pub struct AvatarStore {
    public_dir: PathBuf,
}

impl AvatarStore {
    pub fn new(config: &UploadConfig) -> Self {
        Self {
            public_dir: config.public_dir.clone(),
        }
    }

    pub fn public_dir(&self) -> &Path {
        &self.public_dir
    }

    pub async fn ensure_dirs(&self) -> AppResult<()> {
        let dir = self.public_dir.join(AVATARS_DIR);
        fs::create_dir_all(&dir).await?;
        tracing::info!("Avatar directory ready: {}", dir.display());
        Ok(())
    }

    /// Writes the file under a fresh random name and returns its URL path.
    pub async fn upload_file(&self, data: Bytes, extension: &str) -> AppResult<String> {
        let file_name = format!("{}.{}", Uuid::new_v4(), extension);
        let dir = self.public_dir.join(AVATARS_DIR);
        fs::create_dir_all(&dir).await?;

        let mut file = fs::OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(dir.join(&file_name))
            .await?;
        file.write_all(&data).await?;
        file.flush().await?;

        tracing::debug!("Stored avatar {} ({} bytes)", file_name, data.len());
        Ok(self.get_file_url(&file_name))
    }

    /// Removes a previously stored avatar. Unknown or already missing files
    /// are ignored.
    pub async fn delete_file(&self, url: &str) -> AppResult<()> {
        let Some(path) = self.resolve(url) else {
            tracing::warn!("Refusing to delete avatar outside the avatar directory: {}", url);
            return Ok(());
        };

        match fs::remove_file(&path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }

    pub fn get_file_url(&self, file_name: &str) -> String {
        format!("{}/{}/{}", PUBLIC_URL_PREFIX, AVATARS_DIR, file_name)
    }

    fn resolve(&self, url: &str) -> Option<PathBuf> {
        let file_name = url
            .strip_prefix(PUBLIC_URL_PREFIX)?
            .strip_prefix('/')?
            .strip_prefix(AVATARS_DIR)?
            .strip_prefix('/')?;

        let plain = !file_name.is_empty()
            && file_name != "."
            && file_name != ".."
            && !file_name.contains(['/', '\\']);
        plain.then(|| self.public_dir.join(AVATARS_DIR).join(file_name))
    }
}
