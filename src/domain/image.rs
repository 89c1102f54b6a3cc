use std::path::Path;

use serde::{Deserialize, Serialize};

use super::errors::{DomainError, DomainResult};

/// Image chosen by the user: raw bytes plus the media type and name it was declared with.
#[derive(Clone, PartialEq)]
pub struct ImageAsset {
    pub name: String,
    pub media_type: String,
    pub bytes: Vec<u8>,
}

impl ImageAsset {
    pub fn new(name: impl Into<String>, media_type: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self { name: name.into(), media_type: media_type.into(), bytes }
    }

    /// Reads a file from disk, inferring the media type from its extension.
    /// Unknown extensions get `application/octet-stream` and are later rejected by intake.
    pub async fn from_path(path: &Path) -> std::io::Result<Self> {
        let bytes = tokio::fs::read(path).await?;
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| "image".to_string());
        Ok(Self::new(name, media_type_for_path(path), bytes))
    }

    /// `image/<subtype>` with an optional `; key=value` parameter list, as sent on the wire.
    pub fn is_image(&self) -> bool {
        let mut parts = self.media_type.trim().split(';');
        let essence = parts.next().unwrap_or_default();
        let Some((kind, subtype)) = essence.split_once('/') else {
            return false;
        };
        kind.eq_ignore_ascii_case("image")
            && is_token(subtype)
            && parts.all(|param| {
                param
                    .trim()
                    .split_once('=')
                    .is_some_and(|(key, value)| is_token(key) && !value.is_empty())
            })
    }

    pub fn ensure_image(&self) -> DomainResult<()> {
        if self.is_image() {
            Ok(())
        } else {
            Err(DomainError::Validation(format!(
                "{} is not an image ({})",
                self.name, self.media_type
            )))
        }
    }

    pub fn summary(&self, preview: Option<String>) -> ImageSummary {
        ImageSummary {
            name: self.name.clone(),
            media_type: self.media_type.clone(),
            size_bytes: self.bytes.len(),
            preview,
        }
    }
}

impl std::fmt::Debug for ImageAsset {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ImageAsset")
            .field("name", &self.name)
            .field("media_type", &self.media_type)
            .field("bytes", &self.bytes.len())
            .finish()
    }
}

// RFC 7230 `token`.
fn is_token(s: &str) -> bool {
    !s.is_empty()
        && s.bytes().all(|b| b.is_ascii_alphanumeric() || b"!#$%&'*+-.^_`|~".contains(&b))
}

pub fn media_type_for_path(path: &Path) -> String {
    image::ImageFormat::from_path(path)
        .map(|f| f.to_mime_type().to_string())
        .unwrap_or_else(|_| "application/octet-stream".to_string())
}

/// What the dashboard shows about the held image.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ImageSummary {
    pub name: String,
    pub media_type: String,
    pub size_bytes: usize,
    pub preview: Option<String>,
}
