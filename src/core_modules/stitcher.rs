// THEORY:
// The `stitcher` module is a thin adapter over OpenCV's `Stitcher`. Everything
// hard (feature extraction, pairwise matching, camera estimation, bundle
// adjustment, warping, seam finding, exposure compensation, blending) happens
// inside OpenCV; this module only chooses the preset, swaps in the same
// 5000-keypoint ORB detector the feature inspector uses, and turns whatever comes
// back into one `Result`.
//
// Key architectural principles:
// 1.  **Closed Status Set**: OpenCV's status code is decoded into `StitchStatus`,
//     whose variants cover every documented code plus `Unknown(code)`. The
//     diagnostic hint for each is picked by an exhaustive match.
// 2.  **One Failure Channel**: Errors raised inside the pipeline (OpenCV
//     exceptions surface as `opencv::Error`) and non-OK status codes both come
//     back as `StitchError`. Nothing escapes as a panic.

use crate::core_modules::feature_inspector::{create_orb, FeatureConfig};
use opencv::{
    core::{Mat, Ptr, Vector},
    features2d::Feature2D,
    prelude::*,
    stitching::{Stitcher, Stitcher_Mode},
};
use std::fmt;
use thiserror::Error;

/// The two stitching presets OpenCV ships.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StitchMode {
    /// Spherical warping with full camera estimation, for photos taken by rotating a camera.
    Panorama,
    /// Affine model with no warping, for flatbed scans and other translated inputs.
    Scans,
}

impl StitchMode {
    fn to_opencv(self) -> Stitcher_Mode {
        match self {
            StitchMode::Panorama => Stitcher_Mode::PANORAMA,
            StitchMode::Scans => Stitcher_Mode::SCANS,
        }
    }
}

impl fmt::Display for StitchMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StitchMode::Panorama => write!(f, "PANORAMA"),
            StitchMode::Scans => write!(f, "SCANS"),
        }
    }
}

/// Outcome reported by the stitching pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StitchStatus {
    Ok,
    NeedMoreImages,
    HomographyEstimationFailed,
    CameraParamsAdjustFailed,
    Unknown(i32),
}

impl StitchStatus {
    pub fn from_code(code: i32) -> Self {
        match code {
            0 => StitchStatus::Ok,
            1 => StitchStatus::NeedMoreImages,
            2 => StitchStatus::HomographyEstimationFailed,
            3 => StitchStatus::CameraParamsAdjustFailed,
            other => StitchStatus::Unknown(other),
        }
    }

    pub fn code(&self) -> i32 {
        match self {
            StitchStatus::Ok => 0,
            StitchStatus::NeedMoreImages => 1,
            StitchStatus::HomographyEstimationFailed => 2,
            StitchStatus::CameraParamsAdjustFailed => 3,
            StitchStatus::Unknown(code) => *code,
        }
    }

    /// The human-readable cause printed after a failed stitch.
    pub fn hint(&self) -> &'static str {
        match self {
            StitchStatus::Ok => "Stitching completed successfully",
            StitchStatus::NeedMoreImages => "Error: Need more images or failed to find features",
            StitchStatus::HomographyEstimationFailed => "Error: Homography estimation failed",
            StitchStatus::CameraParamsAdjustFailed => "Error: Camera parameters adjustment failed",
            StitchStatus::Unknown(_) => "Error: Unknown stitching error",
        }
    }
}

#[derive(Error, Debug)]
pub enum StitchError {
    #[error("Stitching failed with status code: {}", .0.code())]
    Status(StitchStatus),
    #[error("OpenCV exception caught during stitching: {0}")]
    Library(#[from] opencv::Error),
}

impl StitchError {
    /// The status-specific hint, when the failure came from a status code.
    pub fn hint(&self) -> Option<&'static str> {
        match self {
            StitchError::Status(status) => Some(status.hint()),
            StitchError::Library(_) => None,
        }
    }
}

pub struct StitcherAdapter {
    features: FeatureConfig,
}

impl StitcherAdapter {
    pub fn new(features: FeatureConfig) -> Self {
        Self { features }
    }

    /// Runs the full OpenCV stitching pipeline over `images` in the given mode.
    pub fn stitch_images(&self, images: &[Mat], mode: StitchMode) -> Result<Mat, StitchError> {
        let mut stitcher = Stitcher::create(mode.to_opencv())?;

        let finder: Ptr<Feature2D> = create_orb(self.features.max_features)?.into();
        stitcher.set_features_finder(finder)?;

        let inputs: Vector<Mat> = images.iter().cloned().collect();
        let mut result = Mat::default();

        log::info!("stitching {} images in {} mode", images.len(), mode);
        let status = StitchStatus::from_code(stitcher.stitch(&inputs, &mut result)? as i32);

        match status {
            StitchStatus::Ok => Ok(result),
            failed => {
                log::warn!("stitcher returned status {:?}", failed);
                Err(StitchError::Status(failed))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core_modules::test_support;
    use opencv::core::Rect;

    #[test]
    fn status_codes_decode_to_the_closed_set() {
        assert_eq!(StitchStatus::from_code(0), StitchStatus::Ok);
        assert_eq!(StitchStatus::from_code(1), StitchStatus::NeedMoreImages);
        assert_eq!(StitchStatus::from_code(2), StitchStatus::HomographyEstimationFailed);
        assert_eq!(StitchStatus::from_code(3), StitchStatus::CameraParamsAdjustFailed);
        assert_eq!(StitchStatus::from_code(42), StitchStatus::Unknown(42));
        assert_eq!(StitchStatus::Unknown(-7).code(), -7);
    }

    #[test]
    fn every_failure_has_a_hint() {
        assert_eq!(
            StitchStatus::NeedMoreImages.hint(),
            "Error: Need more images or failed to find features"
        );
        assert_eq!(
            StitchStatus::HomographyEstimationFailed.hint(),
            "Error: Homography estimation failed"
        );
        assert_eq!(
            StitchStatus::CameraParamsAdjustFailed.hint(),
            "Error: Camera parameters adjustment failed"
        );
        assert_eq!(StitchStatus::Unknown(9).hint(), "Error: Unknown stitching error");
    }

    #[test]
    fn status_error_reports_the_raw_code() {
        let err = StitchError::Status(StitchStatus::HomographyEstimationFailed);
        assert_eq!(err.to_string(), "Stitching failed with status code: 2");
        assert_eq!(err.hint(), Some("Error: Homography estimation failed"));
    }

    #[test]
    fn a_single_image_needs_more_images() {
        let adapter = StitcherAdapter::new(FeatureConfig::default());
        let scene = test_support::textured_scene(640, 480);

        match adapter.stitch_images(&[scene], StitchMode::Scans) {
            Err(StitchError::Status(status)) => assert_eq!(status, StitchStatus::NeedMoreImages),
            other => panic!("expected NeedMoreImages, got {:?}", other.map(|m| m.cols())),
        }
    }

    #[test]
    fn overlapping_scans_stitch_into_a_wider_image() {
        let scene = test_support::textured_scene(1200, 600);
        let left = test_support::crop(&scene, Rect::new(0, 0, 800, 600));
        let right = test_support::crop(&scene, Rect::new(400, 0, 800, 600));

        let result = StitcherAdapter::new(FeatureConfig::default())
            .stitch_images(&[left, right], StitchMode::Scans)
            .expect("Error stitching overlapping scans.");

        assert!(!result.empty());
        assert!(result.cols() >= 800);
    }

    #[test]
    fn unrelated_noise_does_not_stitch() {
        let first = test_support::textured_scene(640, 480);
        let mut second = test_support::uniform(640, 480, 0.0);
        opencv::core::randu(
            &mut second,
            &opencv::core::Scalar::all(0.0),
            &opencv::core::Scalar::all(255.0),
        )
        .expect("Error filling noise.");

        let result = StitcherAdapter::new(FeatureConfig::default())
            .stitch_images(&[first, second], StitchMode::Scans);

        match result {
            Err(StitchError::Status(
                StitchStatus::NeedMoreImages | StitchStatus::HomographyEstimationFailed,
            )) => {}
            Err(e) => panic!("expected a matching failure status, got {}", e),
            Ok(m) => panic!("unrelated images stitched into {}x{}", m.cols(), m.rows()),
        }
    }
}
