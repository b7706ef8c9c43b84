use crate::error::ClientError;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use log::debug;
use std::path::{Path, PathBuf};

/// Where a food photo comes from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImageSource {
    /// Image from a file path
    Path(PathBuf),
    /// Image as base64-encoded data, optionally a `data:` URL
    Base64(String),
}

/// An image ready to be sent as the `file` part of an upload
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageUpload {
    pub file_name: String,
    pub mime_type: &'static str,
    pub bytes: Vec<u8>,
}

impl ImageSource {
    /// Read and validate the image. Non-images and images larger than
    /// `max_bytes` are rejected before anything is sent.
    pub async fn load(&self, max_bytes: u64) -> Result<ImageUpload, ClientError> {
        let (file_name, bytes) = match self {
            ImageSource::Path(path) => {
                let size = tokio::fs::metadata(path).await?.len();
                if size > max_bytes {
                    debug!("Rejecting {} ({} bytes) before reading it", path.display(), size);
                    return Err(too_large(max_bytes));
                }
                let bytes = tokio::fs::read(path).await?;
                (file_name(path), bytes)
            }
            ImageSource::Base64(data) => {
                let payload = data.split_once("base64,").map_or(data.as_str(), |(_, b)| b);
                (
                    "upload".to_string(),
                    STANDARD.decode(payload.trim().as_bytes())?,
                )
            }
        };

        validate(file_name, bytes, max_bytes)
    }
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .and_then(|name| name.to_str())
        .unwrap_or("upload")
        .to_string()
}

fn validate(file_name: String, bytes: Vec<u8>, max_bytes: u64) -> Result<ImageUpload, ClientError> {
    let mime_type = sniff_mime(&bytes).ok_or_else(|| {
        ClientError::InvalidInput("Please select a valid image file".to_string())
    })?;

    if bytes.len() as u64 > max_bytes {
        return Err(too_large(max_bytes));
    }

    debug!("Prepared {} ({}, {} bytes)", file_name, mime_type, bytes.len());
    Ok(ImageUpload {
        file_name,
        mime_type,
        bytes,
    })
}

fn too_large(max_bytes: u64) -> ClientError {
    ClientError::InvalidInput(format!(
        "Image too large. Please select an image smaller than {}MB",
        max_bytes / (1024 * 1024)
    ))
}

/// Identify the image format from its magic bytes
pub fn sniff_mime(bytes: &[u8]) -> Option<&'static str> {
    match bytes {
        [0xFF, 0xD8, 0xFF, ..] => Some("image/jpeg"),
        [0x89, b'P', b'N', b'G', ..] => Some("image/png"),
        [b'G', b'I', b'F', b'8', ..] => Some("image/gif"),
        [b'R', b'I', b'F', b'F', _, _, _, _, b'W', b'E', b'B', b'P', ..] => Some("image/webp"),
        [b'B', b'M', ..] => Some("image/bmp"),
        [_, _, _, _, b'f', b't', b'y', b'p', b'h', b'e', b'i', b'c', ..] => Some("image/heic"),
        _ => None,
    }
}
