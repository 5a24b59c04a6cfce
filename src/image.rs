//! Image loading and data URI encoding.

use crate::error::{GlimpseError, Result};
use base64::Engine;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Image formats accepted by the tool.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageFormat {
    Jpeg,
    Png,
}

impl ImageFormat {
    /// Determine the format from a file extension, ignoring case.
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_ascii_lowercase().as_str() {
            "jpg" | "jpeg" => Some(Self::Jpeg),
            "png" => Some(Self::Png),
            _ => None,
        }
    }

    pub fn mime_type(&self) -> &'static str {
        match self {
            Self::Jpeg => "image/jpeg",
            Self::Png => "image/png",
        }
    }
}

/// An image read from disk, ready to be embedded in a request.
#[derive(Debug, Clone)]
pub struct ImagePayload {
    pub path: PathBuf,
    pub bytes: Vec<u8>,
    pub format: ImageFormat,
}

impl ImagePayload {
    /// Read an image from disk.
    ///
    /// Fails with [`GlimpseError::FileNotFound`] when the path does not exist
    /// and [`GlimpseError::UnsupportedFormat`] when the extension is not JPG or PNG.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();

        if !path.exists() {
            return Err(GlimpseError::FileNotFound(path.to_path_buf()));
        }

        let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("");
        let format = ImageFormat::from_extension(ext)
            .ok_or_else(|| GlimpseError::UnsupportedFormat(ext.to_string()))?;

        let bytes = std::fs::read(path)?;
        debug!(path = %path.display(), bytes = bytes.len(), mime = format.mime_type(), "Loaded image");

        Ok(Self {
            path: path.to_path_buf(),
            bytes,
            format,
        })
    }

    pub fn base64(&self) -> String {
        base64::engine::general_purpose::STANDARD.encode(&self.bytes)
    }

    /// `data:<mime>;base64,<payload>`
    pub fn data_uri(&self) -> String {
        format!("data:{};base64,{}", self.format.mime_type(), self.base64())
    }
}
