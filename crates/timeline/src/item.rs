//! Media item types.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

/// Still-image extensions recognized when classifying by path.
const IMAGE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "gif", "bmp"];

/// Video extensions recognized when classifying by path.
const VIDEO_EXTENSIONS: &[&str] = &["mp4", "avi", "mov", "mkv"];

/// The kind of media a timeline item refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MediaKind {
    /// A still image, shown for a fixed display duration.
    Image,
    /// A video clip, played at its own encoded length.
    Video,
}

impl MediaKind {
    /// Classify a file by its extension.
    ///
    /// Returns `None` for unrecognized extensions so callers can decide
    /// whether to reject the file or ask for an explicit kind.
    pub fn from_path(path: impl AsRef<Path>) -> Option<Self> {
        let ext = path.as_ref().extension()?.to_str()?.to_ascii_lowercase();
        if IMAGE_EXTENSIONS.contains(&ext.as_str()) {
            Some(Self::Image)
        } else if VIDEO_EXTENSIONS.contains(&ext.as_str()) {
            Some(Self::Video)
        } else {
            None
        }
    }
}

/// One entry in a timeline.
///
/// `duration_secs` is the display duration for images and the probed clip
/// length for videos. It must be positive; constructors clamp it and the
/// compile engine re-validates before use.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MediaItem {
    /// Path to the source media file.
    pub path: PathBuf,

    /// Whether this entry is a still image or a video clip.
    pub kind: MediaKind,

    /// Duration in seconds. Always positive.
    pub duration_secs: f64,
}

impl MediaItem {
    /// Smallest accepted duration, in seconds.
    pub const MIN_DURATION_SECS: f64 = 0.001;

    /// Create a still-image item with the given display duration.
    pub fn image(path: impl Into<PathBuf>, duration_secs: f64) -> Self {
        Self {
            path: path.into(),
            kind: MediaKind::Image,
            duration_secs: duration_secs.max(Self::MIN_DURATION_SECS),
        }
    }

    /// Create a video item with its probed duration.
    pub fn video(path: impl Into<PathBuf>, duration_secs: f64) -> Self {
        Self {
            path: path.into(),
            kind: MediaKind::Video,
            duration_secs: duration_secs.max(Self::MIN_DURATION_SECS),
        }
    }

    /// Whether this item is a still image.
    pub fn is_image(&self) -> bool {
        self.kind == MediaKind::Image
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_from_path() {
        assert_eq!(MediaKind::from_path("photo.JPG"), Some(MediaKind::Image));
        assert_eq!(MediaKind::from_path("a/b/pic.png"), Some(MediaKind::Image));
        assert_eq!(MediaKind::from_path("clip.mp4"), Some(MediaKind::Video));
        assert_eq!(MediaKind::from_path("clip.MKV"), Some(MediaKind::Video));
        assert_eq!(MediaKind::from_path("notes.txt"), None);
        assert_eq!(MediaKind::from_path("no_extension"), None);
    }

    #[test]
    fn test_image_constructor_clamps_duration() {
        let item = MediaItem::image("photo.png", 0.0);
        assert!(item.duration_secs > 0.0);
        assert!(item.is_image());
    }

    #[test]
    fn test_item_serialization() {
        let item = MediaItem::video("clip.mp4", 12.5);
        let json = serde_json::to_string(&item).unwrap();
        let parsed: MediaItem = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, item);
        assert!(json.contains("\"video\""));
    }
}
