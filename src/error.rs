// THEORY:
// The `error` module holds the console-level failure taxonomy. Every variant here
// is recoverable from the point of view of the command loop: a failed command
// prints its diagnostic and the loop asks for the next line. Component-specific
// failures (feature gating, stitcher status codes) live next to the component
// that produces them and are folded into this enum only where the console needs
// a single type.

use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConsoleError {
    #[error(transparent)]
    OpenCv(#[from] opencv::Error),
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error("Could not read the image from {}", .path.display())]
    ImageDecode { path: PathBuf },
    #[error("Could not write the image to {}", .path.display())]
    ImageEncode { path: PathBuf },
    #[error("Path is not valid UTF-8: {}", .0.display())]
    InvalidPathEncoding(PathBuf),
    #[error("Images not loaded. Use 'load' command first.")]
    NotLoaded,
    #[error("Image is empty")]
    EmptyImage,
}

pub type Result<T> = std::result::Result<T, ConsoleError>;

/// OpenCV's path-taking functions want `&str`; reject anything that is not UTF-8.
pub(crate) fn path_to_str(path: &std::path::Path) -> Result<&str> {
    path.to_str()
        .ok_or_else(|| ConsoleError::InvalidPathEncoding(path.to_path_buf()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decode_error_names_the_attempted_path() {
        let err = ConsoleError::ImageDecode { path: PathBuf::from("/data/1.png") };
        assert_eq!(err.to_string(), "Could not read the image from /data/1.png");
    }

    #[test]
    fn not_loaded_carries_the_guidance() {
        assert_eq!(
            ConsoleError::NotLoaded.to_string(),
            "Images not loaded. Use 'load' command first."
        );
    }
}
