//! Video upload payload

use std::path::Path;

use reqwest::multipart::{Form, Part};

use crate::error::{ClientError, Result};

/// A video file plus the display name the analysis is stored under
#[derive(Debug, Clone)]
pub struct VideoUpload {
    pub name: String,
    pub file_name: String,
    pub content: Vec<u8>,
}

impl VideoUpload {
    /// Creates an upload from in-memory bytes
    pub fn new(name: impl Into<String>, file_name: impl Into<String>, content: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            file_name: file_name.into(),
            content,
        }
    }

    /// Reads the file at `path` into an upload
    pub async fn from_path(name: impl Into<String>, path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .ok_or_else(|| {
                ClientError::InvalidRequest(format!("{} is not a file path", path.display()))
            })?;

        let content = tokio::fs::read(path).await.map_err(|e| {
            ClientError::InvalidRequest(format!("Failed to read {}: {}", path.display(), e))
        })?;

        Ok(Self::new(name, file_name, content))
    }

    /// Checks the upload carries both a name and file content
    pub fn validate(&self) -> Result<()> {
        if self.name.trim().is_empty() {
            return Err(ClientError::InvalidRequest(
                "analysis name cannot be empty".to_string(),
            ));
        }
        if self.file_name.trim().is_empty() || self.content.is_empty() {
            return Err(ClientError::InvalidRequest(
                "video file cannot be empty".to_string(),
            ));
        }
        Ok(())
    }

    pub(crate) fn into_form(self) -> Result<Form> {
        let part = Part::bytes(self.content)
            .file_name(self.file_name)
            .mime_str("application/octet-stream")?;

        Ok(Form::new().part("file", part).text("name", self.name))
    }
}
