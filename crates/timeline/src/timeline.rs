//! The ordered timeline and its on-disk representation.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::item::MediaItem;

/// An ordered sequence of media items.
///
/// Order is significant: it defines both play order and concatenation
/// order. The on-disk form is a plain JSON array of items with no schema
/// versioning; decoding is structural only.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Timeline {
    items: Vec<MediaItem>,
}

impl Timeline {
    /// Create an empty timeline.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an item at the end of the play order.
    pub fn push(&mut self, item: MediaItem) {
        self.items.push(item);
    }

    /// Number of items.
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Whether the timeline has no items.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Iterate items in play order.
    pub fn iter(&self) -> std::slice::Iter<'_, MediaItem> {
        self.items.iter()
    }

    /// Sum of all item durations, in seconds.
    ///
    /// For videos this is the probed duration, which may differ slightly
    /// from the encoded length; treat the total as an estimate.
    pub fn total_duration_secs(&self) -> f64 {
        self.items.iter().map(|i| i.duration_secs).sum()
    }

    /// Load a timeline from a JSON file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, TimelineError> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|e| TimelineError::Io {
            path: path.to_path_buf(),
            source: e,
        })?;
        serde_json::from_str(&json).map_err(|e| TimelineError::Parse {
            path: path.to_path_buf(),
            source: e,
        })
    }

    /// Save the timeline to a JSON file.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), TimelineError> {
        let path = path.as_ref();
        let json = serde_json::to_string_pretty(self).map_err(|e| TimelineError::Parse {
            path: path.to_path_buf(),
            source: e,
        })?;
        std::fs::write(path, json).map_err(|e| TimelineError::Io {
            path: path.to_path_buf(),
            source: e,
        })
    }
}

impl FromIterator<MediaItem> for Timeline {
    fn from_iter<T: IntoIterator<Item = MediaItem>>(iter: T) -> Self {
        Self {
            items: iter.into_iter().collect(),
        }
    }
}

impl<'a> IntoIterator for &'a Timeline {
    type Item = &'a MediaItem;
    type IntoIter = std::slice::Iter<'a, MediaItem>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}

/// Errors that can occur when loading or saving a timeline file.
#[derive(Debug, thiserror::Error)]
pub enum TimelineError {
    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Parse error in {path}: {source}")]
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_timeline() -> Timeline {
        let mut timeline = Timeline::new();
        timeline.push(MediaItem::image("slides/intro.png", 2.0));
        timeline.push(MediaItem::video("clips/demo.mp4", 14.2));
        timeline.push(MediaItem::image("slides/outro.jpg", 3.5));
        timeline
    }

    #[test]
    fn test_order_is_preserved() {
        let timeline = sample_timeline();
        let paths: Vec<_> = timeline.iter().map(|i| i.path.clone()).collect();
        assert_eq!(
            paths,
            vec![
                PathBuf::from("slides/intro.png"),
                PathBuf::from("clips/demo.mp4"),
                PathBuf::from("slides/outro.jpg"),
            ]
        );
    }

    #[test]
    fn test_total_duration() {
        let timeline = sample_timeline();
        assert!((timeline.total_duration_secs() - 19.7).abs() < 1e-9);
    }

    #[test]
    fn test_save_and_load_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("timeline.json");

        let timeline = sample_timeline();
        timeline.save(&path).unwrap();

        let loaded = Timeline::load(&path).unwrap();
        assert_eq!(loaded, timeline);
    }

    #[test]
    fn test_on_disk_form_is_a_plain_array() {
        let json = serde_json::to_string(&sample_timeline()).unwrap();
        assert!(json.starts_with('['));
    }

    #[test]
    fn test_load_missing_file_is_io_error() {
        let err = Timeline::load("/nonexistent/timeline.json").unwrap_err();
        assert!(matches!(err, TimelineError::Io { .. }));
    }

    #[test]
    fn test_load_malformed_file_is_parse_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.json");
        std::fs::write(&path, "{not json").unwrap();

        let err = Timeline::load(&path).unwrap_err();
        assert!(matches!(err, TimelineError::Parse { .. }));
    }
}
