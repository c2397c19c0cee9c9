//! Upload-side data models.
//!
//! `SelectedFile` is what a picker hands over; `UploadItem` is a selected file
//! that passed intake and got its id; `FilePreview` is the thumbnail entry that
//! mirrors it.

use std::{
    io,
    path::{Path, PathBuf},
    sync::Arc,
};

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Where the bytes of a selected file live.
#[derive(Debug, Clone)]
pub enum FileSource {
    Path(PathBuf),
    Memory(Arc<[u8]>),
}

/// A raw file handle as handed over by the file picker.
#[derive(Debug, Clone)]
pub struct SelectedFile {
    pub name: String,
    pub size_bytes: u64,
    pub source: FileSource,
}

impl SelectedFile {
    pub async fn from_path(path: impl AsRef<Path>) -> io::Result<Self> {
        let path = path.as_ref();
        let metadata = tokio::fs::metadata(path).await?;
        if !metadata.is_file() {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("{} is not a file", path.display()),
            ));
        }

        let name = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default();

        Ok(Self {
            name,
            size_bytes: metadata.len(),
            source: FileSource::Path(path.to_path_buf()),
        })
    }

    pub fn from_bytes(name: impl Into<String>, bytes: impl Into<Arc<[u8]>>) -> Self {
        let bytes = bytes.into();
        Self {
            name: name.into(),
            size_bytes: bytes.len() as u64,
            source: FileSource::Memory(bytes),
        }
    }

    pub async fn read(&self) -> io::Result<Vec<u8>> {
        match &self.source {
            FileSource::Path(path) => tokio::fs::read(path).await,
            FileSource::Memory(bytes) => Ok(bytes.to_vec()),
        }
    }

    /// Lower-cased extension including the leading dot, taken from the last `.`.
    pub fn extension(&self) -> Option<String> {
        self.name
            .rfind('.')
            .map(|index| self.name[index..].to_ascii_lowercase())
    }

    /// Validation-only identity: two selections with the same name and size are
    /// treated as the same upload. Never used as a correlation key.
    pub fn same_upload_as(&self, other: &SelectedFile) -> bool {
        self.name == other.name && self.size_bytes == other.size_bytes
    }
}

#[derive(Debug, Clone)]
pub struct UploadItem {
    pub id: Uuid,
    pub file: SelectedFile,
}

impl UploadItem {
    pub fn new(file: SelectedFile) -> Self {
        Self {
            id: Uuid::new_v4(),
            file,
        }
    }

    pub fn name(&self) -> &str {
        &self.file.name
    }

    pub fn size_bytes(&self) -> u64 {
        self.file.size_bytes
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FilePreview {
    pub id: Uuid,
    pub file_name: String,
    /// `data:` URL of a downscaled thumbnail; `None` when the type has no
    /// client-side preview (radiograph containers) or decoding failed.
    pub thumbnail_url: Option<String>,
}

impl FilePreview {
    pub fn placeholder(id: Uuid, file_name: impl Into<String>) -> Self {
        Self {
            id,
            file_name: file_name.into(),
            thumbnail_url: None,
        }
    }
}
