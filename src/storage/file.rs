use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use tokio::fs;
use tracing::debug;

use super::Storage;
use crate::error::Result;

/// Stores each key as `<dir>/<key>.json`.
///
/// Writes go to a sibling temporary file that is then renamed over the
/// target, so an interrupted write leaves the previous blob in place.
#[derive(Debug, Clone)]
pub struct FileStorage {
    dir: PathBuf,
}

impl FileStorage {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{key}.json"))
    }
}

impl Storage for FileStorage {
    async fn get(&self, key: &str) -> Result<Option<String>> {
        let path = self.path_for(key);
        match fs::read_to_string(&path).await {
            Ok(blob) => Ok(Some(blob)),
            Err(err) if err.kind() == ErrorKind::NotFound => {
                debug!("No stored data at {:?}", path);
                Ok(None)
            }
            Err(err) => Err(err.into()),
        }
    }

    async fn set(&self, key: &str, blob: String) -> Result<()> {
        fs::create_dir_all(&self.dir).await?;
        let path = self.path_for(key);
        let tmp_path = self.dir.join(format!("{key}.json.tmp"));
        fs::write(&tmp_path, blob).await?;
        fs::rename(&tmp_path, &path).await?;
        debug!("Wrote {:?}", path);
        Ok(())
    }
}
