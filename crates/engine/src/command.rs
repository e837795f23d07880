//! Argument-list construction for the external transcoding tool.
//!
//! These are pure functions: no subprocess is launched here, so malformed
//! geometry is rejected before any work starts.

use std::path::Path;

/// A parsed output resolution.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Resolution {
    /// Output width in pixels.
    pub width: u32,
    /// Output height in pixels.
    pub height: u32,
}

impl std::str::FromStr for Resolution {
    type Err = ParseResolutionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let err = || ParseResolutionError {
            input: s.to_string(),
        };
        let (w, h) = s.split_once('x').ok_or_else(err)?;
        let width: u32 = w.trim().parse().map_err(|_| err())?;
        let height: u32 = h.trim().parse().map_err(|_| err())?;
        if width == 0 || height == 0 {
            return Err(err());
        }
        Ok(Self { width, height })
    }
}

impl std::fmt::Display for Resolution {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

/// Error parsing a `WIDTHxHEIGHT` resolution string.
#[derive(Debug, Clone, thiserror::Error)]
#[error("invalid resolution '{input}': use WIDTHxHEIGHT, e.g. 1280x720")]
pub struct ParseResolutionError {
    input: String,
}

/// Build the filter expression that fits an image inside the target box.
///
/// Scales down to fit (never upscaling past the box, never cropping), pads
/// to exactly the target geometry with the image centered, and forces
/// yuv420p for broad player compatibility.
fn fit_and_pad_filter(resolution: Resolution) -> String {
    let Resolution { width, height } = resolution;
    format!(
        "scale=w={width}:h={height}:force_original_aspect_ratio=decrease,\
         pad=w={width}:h={height}:x=(ow-iw)/2:y=(oh-ih)/2,format=yuv420p"
    )
}

/// Arguments that convert one still image into a duration-bound segment.
///
/// The still is looped for exactly `duration_secs` at `frame_rate`, encoded
/// with libx264, and written fast-start-flagged to `segment_path`. Video
/// items never pass through here; they are referenced directly from the
/// manifest.
pub fn image_segment_args(
    image_path: &Path,
    duration_secs: f64,
    resolution: Resolution,
    frame_rate: &str,
    segment_path: &Path,
) -> Vec<String> {
    vec![
        "-y".to_string(),
        "-hide_banner".to_string(),
        "-nostdin".to_string(),
        "-loop".to_string(),
        "1".to_string(),
        "-i".to_string(),
        image_path.display().to_string(),
        "-c:v".to_string(),
        "libx264".to_string(),
        "-t".to_string(),
        format!("{duration_secs}"),
        "-pix_fmt".to_string(),
        "yuv420p".to_string(),
        "-vf".to_string(),
        fit_and_pad_filter(resolution),
        "-r".to_string(),
        frame_rate.to_string(),
        "-movflags".to_string(),
        "+faststart".to_string(),
        segment_path.display().to_string(),
    ]
}

/// Arguments that concatenate every manifest entry into the final output.
///
/// Uses the concat demuxer (`-safe 0` so absolute paths are accepted) and
/// re-encodes to a fixed codec/pixel-format at the requested frame rate so
/// heterogeneous-but-compatible inputs join cleanly.
pub fn concat_args(manifest_path: &Path, output_path: &Path, frame_rate: &str) -> Vec<String> {
    vec![
        "-y".to_string(),
        "-hide_banner".to_string(),
        "-nostdin".to_string(),
        "-f".to_string(),
        "concat".to_string(),
        "-safe".to_string(),
        "0".to_string(),
        "-i".to_string(),
        manifest_path.display().to_string(),
        "-c:v".to_string(),
        "libx264".to_string(),
        "-pix_fmt".to_string(),
        "yuv420p".to_string(),
        "-preset".to_string(),
        "fast".to_string(),
        "-r".to_string(),
        frame_rate.to_string(),
        output_path.display().to_string(),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use std::path::PathBuf;

    #[test]
    fn test_resolution_parse_valid() {
        let res: Resolution = "1280x720".parse().unwrap();
        assert_eq!(res.width, 1280);
        assert_eq!(res.height, 720);
        assert_eq!(res.to_string(), "1280x720");
    }

    #[test]
    fn test_resolution_parse_rejects_garbage() {
        assert!("abc".parse::<Resolution>().is_err());
        assert!("1280".parse::<Resolution>().is_err());
        assert!("1280x".parse::<Resolution>().is_err());
        assert!("x720".parse::<Resolution>().is_err());
        assert!("0x720".parse::<Resolution>().is_err());
        assert!("1280x0".parse::<Resolution>().is_err());
        assert!("-1280x720".parse::<Resolution>().is_err());
        assert!("1280x720x60".parse::<Resolution>().is_err());
    }

    proptest! {
        #[test]
        fn prop_valid_resolution_roundtrips(w in 1u32..=7680, h in 1u32..=4320) {
            let parsed: Resolution = format!("{w}x{h}").parse().unwrap();
            prop_assert_eq!(parsed, Resolution { width: w, height: h });
        }

        #[test]
        fn prop_strings_without_separator_are_rejected(s in "[0-9a-wyzA-Z]*") {
            prop_assert!(s.parse::<Resolution>().is_err());
        }
    }

    #[test]
    fn test_fit_and_pad_filter_geometry() {
        let filter = fit_and_pad_filter(Resolution {
            width: 1280,
            height: 720,
        });
        assert!(filter.contains("scale=w=1280:h=720:force_original_aspect_ratio=decrease"));
        assert!(filter.contains("pad=w=1280:h=720:x=(ow-iw)/2:y=(oh-ih)/2"));
        assert!(filter.ends_with("format=yuv420p"));
    }

    #[test]
    fn test_image_segment_args_requests_exact_duration() {
        let args = image_segment_args(
            &PathBuf::from("/media/photo.png"),
            2.0,
            "1280x720".parse().unwrap(),
            "30",
            &PathBuf::from("/tmp/work/photo_x.mp4"),
        );

        let t_pos = args.iter().position(|a| a == "-t").unwrap();
        assert_eq!(args[t_pos + 1], "2");

        let r_pos = args.iter().position(|a| a == "-r").unwrap();
        assert_eq!(args[r_pos + 1], "30");

        assert!(args.contains(&"-loop".to_string()));
        assert!(args.contains(&"+faststart".to_string()));
        assert_eq!(args.last().unwrap(), "/tmp/work/photo_x.mp4");
    }

    #[test]
    fn test_image_segment_args_fractional_duration() {
        let args = image_segment_args(
            &PathBuf::from("photo.png"),
            2.5,
            "640x480".parse().unwrap(),
            "24",
            &PathBuf::from("seg.mp4"),
        );
        let t_pos = args.iter().position(|a| a == "-t").unwrap();
        assert_eq!(args[t_pos + 1], "2.5");
    }

    #[test]
    fn test_concat_args_reference_manifest_and_output() {
        let args = concat_args(
            &PathBuf::from("/tmp/work/manifest.txt"),
            &PathBuf::from("/out/final.mp4"),
            "30",
        );

        let i_pos = args.iter().position(|a| a == "-i").unwrap();
        assert_eq!(args[i_pos + 1], "/tmp/work/manifest.txt");
        assert!(args.windows(2).any(|w| w == ["-f", "concat"]));
        assert!(args.windows(2).any(|w| w == ["-safe", "0"]));
        assert!(args.windows(2).any(|w| w == ["-preset", "fast"]));
        assert_eq!(args.last().unwrap(), "/out/final.mp4");
    }
}
