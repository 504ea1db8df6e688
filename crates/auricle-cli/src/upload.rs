//! Image loading and preview files.

use std::io::Write;
use std::path::{Path, PathBuf};

use auricle_spec::BackendError;
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use tempfile::NamedTempFile;
use thiserror::Error;
use tracing::debug;

/// Largest accepted upload, 5 MiB.
pub const MAX_IMAGE_BYTES: usize = 5 * 1024 * 1024;

/// Errors rejecting an uploaded image.
#[derive(Debug, Error)]
pub enum UploadError {
    #[error("image file is empty")]
    Empty,

    #[error("image is {size} bytes, larger than the {max} byte limit")]
    TooLarge { size: u64, max: usize },

    #[error("unsupported image type (expected PNG, JPEG, WebP or GIF)")]
    UnsupportedType,

    #[error("failed to read image {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to create preview file: {0}")]
    Preview(#[source] std::io::Error),
}

impl BackendError for UploadError {
    fn code(&self) -> &'static str {
        match self {
            UploadError::Empty => "UPLOAD_001",
            UploadError::TooLarge { .. } => "UPLOAD_002",
            UploadError::UnsupportedType => "UPLOAD_003",
            UploadError::Read { .. } => "UPLOAD_004",
            UploadError::Preview(_) => "UPLOAD_005",
        }
    }

    fn category(&self) -> &'static str {
        "upload"
    }
}

/// Image container recognized from its leading bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageMime {
    Png,
    Jpeg,
    Webp,
    Gif,
}

impl ImageMime {
    /// Detects the image type from magic bytes.
    pub fn sniff(bytes: &[u8]) -> Option<Self> {
        if bytes.starts_with(b"\x89PNG\r\n\x1a\n") {
            Some(ImageMime::Png)
        } else if bytes.starts_with(&[0xFF, 0xD8, 0xFF]) {
            Some(ImageMime::Jpeg)
        } else if bytes.len() >= 12 && &bytes[0..4] == b"RIFF" && &bytes[8..12] == b"WEBP" {
            Some(ImageMime::Webp)
        } else if bytes.starts_with(b"GIF87a") || bytes.starts_with(b"GIF89a") {
            Some(ImageMime::Gif)
        } else {
            None
        }
    }

    pub fn as_mime(&self) -> &'static str {
        match self {
            ImageMime::Png => "image/png",
            ImageMime::Jpeg => "image/jpeg",
            ImageMime::Webp => "image/webp",
            ImageMime::Gif => "image/gif",
        }
    }

    pub fn extension(&self) -> &'static str {
        match self {
            ImageMime::Png => "png",
            ImageMime::Jpeg => "jpg",
            ImageMime::Webp => "webp",
            ImageMime::Gif => "gif",
        }
    }
}

/// An accepted ear photo.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadedImage {
    pub file_name: String,
    pub mime: ImageMime,
    pub bytes: Vec<u8>,
}

impl UploadedImage {
    /// Checks size and type of an in-memory upload.
    pub fn from_bytes(file_name: impl Into<String>, bytes: Vec<u8>) -> Result<Self, UploadError> {
        if bytes.is_empty() {
            return Err(UploadError::Empty);
        }
        if bytes.len() > MAX_IMAGE_BYTES {
            return Err(UploadError::TooLarge {
                size: bytes.len() as u64,
                max: MAX_IMAGE_BYTES,
            });
        }
        let mime = ImageMime::sniff(&bytes).ok_or(UploadError::UnsupportedType)?;

        Ok(Self {
            file_name: file_name.into(),
            mime,
            bytes,
        })
    }

    /// Reads and checks an image file. Oversized files are rejected before
    /// their content is read.
    pub fn from_path(path: &Path) -> Result<Self, UploadError> {
        let read_err = |source| UploadError::Read {
            path: path.to_path_buf(),
            source,
        };

        let size = std::fs::metadata(path).map_err(read_err)?.len();
        if size > MAX_IMAGE_BYTES as u64 {
            return Err(UploadError::TooLarge {
                size,
                max: MAX_IMAGE_BYTES,
            });
        }

        let bytes = std::fs::read(path).map_err(read_err)?;
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "upload".to_string());

        let image = Self::from_bytes(file_name, bytes)?;
        debug!(
            file = %image.file_name,
            mime = image.mime.as_mime(),
            bytes = image.bytes.len(),
            "loaded image"
        );
        Ok(image)
    }

    /// Base64 (standard alphabet, padded) encoding of the image bytes.
    pub fn to_base64(&self) -> String {
        STANDARD.encode(&self.bytes)
    }
}

/// A temporary copy of an uploaded image, removed when dropped.
#[derive(Debug)]
pub struct PreviewHandle {
    file: NamedTempFile,
}

impl PreviewHandle {
    /// Writes the image to a fresh temporary file.
    pub fn open(image: &UploadedImage) -> Result<Self, UploadError> {
        let mut file = tempfile::Builder::new()
            .prefix("auricle-preview-")
            .suffix(&format!(".{}", image.mime.extension()))
            .tempfile()
            .map_err(UploadError::Preview)?;
        file.write_all(&image.bytes).map_err(UploadError::Preview)?;
        file.flush().map_err(UploadError::Preview)?;

        debug!(path = %file.path().display(), "opened preview");
        Ok(Self { file })
    }

    pub fn path(&self) -> &Path {
        self.file.path()
    }

    /// Deletes the preview file now, reporting any I/O error.
    pub fn release(self) -> std::io::Result<()> {
        debug!(path = %self.file.path().display(), "releasing preview");
        self.file.close()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PNG_BYTES: &[u8] = b"\x89PNG\r\n\x1a\n\0\0\0\rIHDR";

    #[test]
    fn test_sniff_types() {
        assert_eq!(ImageMime::sniff(PNG_BYTES), Some(ImageMime::Png));
        assert_eq!(ImageMime::sniff(&[0xFF, 0xD8, 0xFF, 0xE0]), Some(ImageMime::Jpeg));
        assert_eq!(ImageMime::sniff(b"RIFF\0\0\0\0WEBPVP8 "), Some(ImageMime::Webp));
        assert_eq!(ImageMime::sniff(b"GIF89a..."), Some(ImageMime::Gif));
        assert_eq!(ImageMime::sniff(b"RIFF\0\0\0\0WAVEfmt "), None);
        assert_eq!(ImageMime::sniff(b"%PDF-1.7"), None);
    }

    #[test]
    fn test_rejects_empty_and_unknown() {
        assert!(matches!(
            UploadedImage::from_bytes("a.png", Vec::new()),
            Err(UploadError::Empty)
        ));
        assert!(matches!(
            UploadedImage::from_bytes("a.txt", b"hello".to_vec()),
            Err(UploadError::UnsupportedType)
        ));
    }

    #[test]
    fn test_rejects_oversized() {
        let mut bytes = PNG_BYTES.to_vec();
        bytes.resize(MAX_IMAGE_BYTES + 1, 0);
        let err = UploadedImage::from_bytes("big.png", bytes).unwrap_err();
        assert_eq!(err.code(), "UPLOAD_002");

        let mut exact = PNG_BYTES.to_vec();
        exact.resize(MAX_IMAGE_BYTES, 0);
        assert!(UploadedImage::from_bytes("ok.png", exact).is_ok());
    }

    #[test]
    fn test_from_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ear.png");
        std::fs::write(&path, PNG_BYTES).unwrap();

        let image = UploadedImage::from_path(&path).unwrap();
        assert_eq!(image.file_name, "ear.png");
        assert_eq!(image.mime, ImageMime::Png);
        assert_eq!(image.to_base64(), STANDARD.encode(PNG_BYTES));

        let err = UploadedImage::from_path(&dir.path().join("missing.png")).unwrap_err();
        assert!(matches!(err, UploadError::Read { .. }));
    }

    #[test]
    fn test_preview_released_on_drop_and_release() {
        let image = UploadedImage::from_bytes("ear.png", PNG_BYTES.to_vec()).unwrap();

        let preview = PreviewHandle::open(&image).unwrap();
        let path = preview.path().to_path_buf();
        assert_eq!(std::fs::read(&path).unwrap(), PNG_BYTES);
        drop(preview);
        assert!(!path.exists());

        let preview = PreviewHandle::open(&image).unwrap();
        let path = preview.path().to_path_buf();
        preview.release().unwrap();
        assert!(!path.exists());
    }
}
