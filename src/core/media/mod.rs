//! Media Acquisition Module
//!
//! Video assets enter the system from two sources: files picked by the
//! user and live camera recordings. Both produce a [`VideoAsset`].

mod recorder;

pub use recorder::*;

use serde::{Deserialize, Serialize};

use crate::core::{CoreError, CoreResult};

// =============================================================================
// Constants
// =============================================================================

/// Recognized video file extensions (used when the MIME type is missing or generic)
pub const VIDEO_EXTENSIONS: &[&str] = &["mp4", "webm", "mov", "mkv", "avi", "m4v"];

// =============================================================================
// Video Asset
// =============================================================================

/// An in-memory video payload with its source metadata
#[derive(Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VideoAsset {
    /// Original file name (or generated recording name)
    pub name: String,
    /// MIME type, e.g. `video/mp4`
    pub mime_type: String,
    /// Payload size in bytes
    pub size: u64,
    /// Encoded video bytes
    #[serde(skip)]
    pub data: Vec<u8>,
}

impl std::fmt::Debug for VideoAsset {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VideoAsset")
            .field("name", &self.name)
            .field("mime_type", &self.mime_type)
            .field("size", &self.size)
            .finish()
    }
}

impl VideoAsset {
    /// Creates an asset from a user-picked file, validating that it is a video.
    ///
    /// Acceptance: a `video/*` MIME type, or a recognized video extension when
    /// the MIME type is missing or generic (`application/octet-stream`).
    pub fn from_file(name: &str, mime_type: &str, data: Vec<u8>) -> CoreResult<Self> {
        if !is_video_source(name, mime_type) {
            return Err(CoreError::UnsupportedMediaFormat(format!(
                "Not a video file: {} ({})",
                name,
                if mime_type.is_empty() {
                    "no MIME type"
                } else {
                    mime_type
                }
            )));
        }

        let mime_type = if mime_type.starts_with("video/") {
            mime_type.to_string()
        } else {
            mime_for_extension(extension_of(name)).to_string()
        };

        Ok(Self {
            name: name.to_string(),
            mime_type,
            size: data.len() as u64,
            data,
        })
    }

    /// Creates an asset from already-validated parts (recordings)
    pub(crate) fn from_parts(name: String, mime_type: String, data: Vec<u8>) -> Self {
        Self {
            name,
            mime_type,
            size: data.len() as u64,
            data,
        }
    }
}

// =============================================================================
// Source Validation
// =============================================================================

/// Returns whether a (name, mime) pair denotes an acceptable video source
pub fn is_video_source(name: &str, mime_type: &str) -> bool {
    if mime_type.starts_with("video/") {
        return true;
    }

    if mime_type.is_empty() || mime_type == "application/octet-stream" {
        let ext = extension_of(name);
        return VIDEO_EXTENSIONS.contains(&ext.as_str());
    }

    false
}

fn extension_of(name: &str) -> String {
    std::path::Path::new(name)
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase())
        .unwrap_or_default()
}

fn mime_for_extension(ext: String) -> &'static str {
    match ext.as_str() {
        "mp4" | "m4v" => "video/mp4",
        "webm" => "video/webm",
        "mov" => "video/quicktime",
        "mkv" => "video/x-matroska",
        "avi" => "video/x-msvideo",
        _ => "video/mp4",
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_file_video_mime() {
        let asset = VideoAsset::from_file("clip.mp4", "video/mp4", vec![1, 2, 3]).unwrap();
        assert_eq!(asset.name, "clip.mp4");
        assert_eq!(asset.mime_type, "video/mp4");
        assert_eq!(asset.size, 3);
    }

    #[test]
    fn test_from_file_extension_fallback() {
        let asset = VideoAsset::from_file("clip.webm", "", vec![0u8; 10]).unwrap();
        assert_eq!(asset.mime_type, "video/webm");
    }

    #[test]
    fn test_from_file_octet_stream_with_video_extension() {
        let asset =
            VideoAsset::from_file("evidence.mkv", "application/octet-stream", vec![0]).unwrap();
        assert_eq!(asset.mime_type, "video/x-matroska");
    }

    #[test]
    fn test_from_file_rejects_non_video() {
        let result = VideoAsset::from_file("notes.pdf", "application/pdf", vec![0]);
        assert!(result.is_err());
    }

    #[test]
    fn test_from_file_rejects_unknown_extension() {
        let result = VideoAsset::from_file("data.bin", "", vec![0]);
        assert!(result.is_err());
    }

    #[test]
    fn test_is_video_source_case_insensitive_extension() {
        assert!(is_video_source("CLIP.MP4", ""));
        assert!(is_video_source("clip.MoV", "application/octet-stream"));
    }

    #[test]
    fn test_is_video_source_audio_rejected() {
        assert!(!is_video_source("song.mp3", "audio/mpeg"));
    }

    #[test]
    fn test_debug_elides_payload() {
        let asset = VideoAsset::from_file("clip.mp4", "video/mp4", vec![0u8; 1024]).unwrap();
        let debug = format!("{:?}", asset);
        assert!(debug.contains("clip.mp4"));
        assert!(!debug.contains("data"));
    }
}
