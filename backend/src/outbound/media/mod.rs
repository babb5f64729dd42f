//! Filesystem media storage for uploaded images.
//!
//! Files live under a capability-scoped root directory; stored paths are
//! relative (`recipes/<uuid>.png`) so the public URL prefix can change
//! without rewriting rows.

use std::io::ErrorKind;
use std::path::{Component, Path};
use std::sync::Arc;

use async_trait::async_trait;
use cap_std::ambient_authority;
use cap_std::fs::Dir;
use tracing::debug;
use uuid::Uuid;

use crate::domain::ImageUpload;
use crate::domain::ports::{MediaStorage, MediaStorageError};

/// [`MediaStorage`] adapter writing into a directory on local disk.
#[derive(Clone)]
pub struct FsMediaStorage {
    root: Arc<Dir>,
}

impl FsMediaStorage {
    /// Open (creating if needed) the media root at `path`.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, MediaStorageError> {
        let path = path.as_ref();
        Dir::create_ambient_dir_all(path, ambient_authority())
            .map_err(|err| io_error(path.display(), err))?;
        let root = Dir::open_ambient_dir(path, ambient_authority())
            .map_err(|err| io_error(path.display(), err))?;
        Ok(Self {
            root: Arc::new(root),
        })
    }

    async fn blocking<T, F>(&self, op: F) -> Result<T, MediaStorageError>
    where
        T: Send + 'static,
        F: FnOnce(&Dir) -> Result<T, MediaStorageError> + Send + 'static,
    {
        let root = Arc::clone(&self.root);
        tokio::task::spawn_blocking(move || op(&root))
            .await
            .map_err(|err| MediaStorageError::io(format!("media task failed: {err}")))?
    }
}

fn io_error(target: impl std::fmt::Display, err: std::io::Error) -> MediaStorageError {
    MediaStorageError::io(format!("{target}: {err}"))
}

/// Accept only plain relative paths made of normal components.
fn checked_relative(path: &str) -> Result<&Path, MediaStorageError> {
    let candidate = Path::new(path);
    let plain = !path.is_empty()
        && candidate
            .components()
            .all(|component| matches!(component, Component::Normal(_)));
    if plain {
        Ok(candidate)
    } else {
        Err(MediaStorageError::io(format!("{path}: not a media path")))
    }
}

#[async_trait]
impl MediaStorage for FsMediaStorage {
    async fn save(&self, folder: &str, image: &ImageUpload) -> Result<String, MediaStorageError> {
        checked_relative(folder)?;
        let relative = format!(
            "{folder}/{}.{}",
            Uuid::new_v4().simple(),
            image.extension()
        );
        let folder = folder.to_owned();
        let target = relative.clone();
        let bytes = image.bytes().to_vec();
        self.blocking(move |root| {
            root.create_dir_all(&folder)
                .map_err(|err| io_error(&folder, err))?;
            root.write(&target, bytes)
                .map_err(|err| io_error(&target, err))
        })
        .await?;
        debug!(path = %relative, "media file stored");
        Ok(relative)
    }

    async fn delete(&self, path: &str) -> Result<(), MediaStorageError> {
        checked_relative(path)?;
        let target = path.to_owned();
        self.blocking(move |root| match root.remove_file(&target) {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(()),
            Err(err) => Err(io_error(&target, err)),
        })
        .await
    }
}
