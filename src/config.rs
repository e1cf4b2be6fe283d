// THEORY:
// `ConsoleConfig` gathers every fixed value the console works with: where input
// images are looked up, what they are called, where results are written, and the
// tuning of the viewer and the feature detector. There are no flags and no config
// file; the base directory is captured once at startup and then passed around
// explicitly so tests can point it at a temporary directory.

use crate::core_modules::feature_inspector::FeatureConfig;
use crate::core_modules::viewer::ViewerConfig;
use std::path::{Path, PathBuf};

pub const FIRST_IMAGE: &str = "1.png";
pub const SECOND_IMAGE: &str = "2.png";
pub const SCANS_OUTPUT: &str = "scans_result.jpg";
pub const PANORAMA_OUTPUT: &str = "panorama_result.jpg";

/// Configuration for the `Console`, fixed for the lifetime of the process.
#[derive(Debug, Clone)]
pub struct ConsoleConfig {
    /// Directory the input filenames are resolved against.
    pub base_dir: PathBuf,
    pub first_image: String,
    pub second_image: String,
    /// Written relative to the process working directory.
    pub scans_output: PathBuf,
    pub panorama_output: PathBuf,
    /// Trim the black margin the warper leaves around a panorama before saving it.
    pub crop_panorama: bool,
    pub viewer: ViewerConfig,
    pub features: FeatureConfig,
}

impl ConsoleConfig {
    /// Builds a config whose base directory is `base_dir`, with every other value
    /// at its default.
    pub fn with_base_dir(base_dir: impl Into<PathBuf>) -> Self {
        Self {
            base_dir: base_dir.into(),
            first_image: FIRST_IMAGE.to_string(),
            second_image: SECOND_IMAGE.to_string(),
            scans_output: PathBuf::from(SCANS_OUTPUT),
            panorama_output: PathBuf::from(PANORAMA_OUTPUT),
            crop_panorama: false,
            viewer: ViewerConfig::default(),
            features: FeatureConfig::default(),
        }
    }

    /// Captures the parent of the current working directory as the base directory.
    pub fn from_current_dir() -> std::io::Result<Self> {
        let cwd = std::env::current_dir()?;
        Ok(Self::with_base_dir(base_dir_for(&cwd)))
    }
}

/// The parent of `cwd`, or `cwd` itself at the filesystem root.
pub fn base_dir_for(cwd: &Path) -> PathBuf {
    cwd.parent().map(Path::to_path_buf).unwrap_or_else(|| cwd.to_path_buf())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn base_dir_is_the_parent_of_the_working_directory() {
        assert_eq!(base_dir_for(Path::new("/home/user/build")), PathBuf::from("/home/user"));
    }

    #[test]
    fn base_dir_falls_back_to_root() {
        assert_eq!(base_dir_for(Path::new("/")), PathBuf::from("/"));
    }

    #[test]
    fn defaults_match_the_fixed_filenames() {
        let config = ConsoleConfig::with_base_dir("/tmp/images");
        assert_eq!(config.base_dir, PathBuf::from("/tmp/images"));
        assert_eq!(config.first_image, "1.png");
        assert_eq!(config.second_image, "2.png");
        assert_eq!(config.scans_output, PathBuf::from("scans_result.jpg"));
        assert_eq!(config.panorama_output, PathBuf::from("panorama_result.jpg"));
        assert!(!config.crop_panorama);
        assert_eq!(config.viewer.target_width, 800);
        assert_eq!(config.features.max_features, 5000);
    }
}
