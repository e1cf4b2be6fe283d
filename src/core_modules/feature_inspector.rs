// THEORY:
// The `FeatureInspector` is a diagnostic aid. It answers the question "do these
// two images share enough distinctive points to be stitched?" by running the same
// high-capacity ORB detector the stitcher uses, matching the binary descriptors
// by Hamming distance, and drawing the matches side by side.
//
// Key architectural principles:
// 1.  **Two Gates**: Detection is rejected when either image yields fewer than
//     `min_keypoints` keypoints, and matching is rejected when fewer than
//     `min_matches` matches come back. Both rejections carry the counts that were
//     observed so the console can report them.
// 2.  **Loose Matching**: Matching is one nearest neighbour per descriptor of the
//     first image, with no cross-check, ratio test or outlier rejection. The
//     result only feeds a picture; it never reaches the stitching path.
// 3.  **Transient Output**: Keypoints and descriptors live for a single call.

use crate::core_modules::viewer::Viewer;
use opencv::{
    core::{self, KeyPoint, Mat, Ptr, Scalar, Vector},
    features2d::{self, ORB},
    prelude::*,
};
use thiserror::Error;

pub const MATCHES_WINDOW: &str = "Feature Matches";

/// Tuning shared by the inspector and the stitcher's feature finder.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FeatureConfig {
    /// Upper bound on keypoints ORB retains per image.
    pub max_features: i32,
    pub min_keypoints: usize,
    pub min_matches: usize,
}

impl Default for FeatureConfig {
    fn default() -> Self {
        Self {
            max_features: 5000,
            min_keypoints: 50,
            min_matches: 10,
        }
    }
}

#[derive(Error, Debug)]
pub enum InspectError {
    #[error("Not enough features detected in images")]
    NotEnoughFeatures { first: usize, second: usize },
    #[error("Not enough matches between images")]
    NotEnoughMatches { first: usize, second: usize, matches: usize },
    #[error(transparent)]
    OpenCv(#[from] opencv::Error),
}

/// What a successful inspection found, plus the drawn visualization.
#[derive(Debug)]
pub struct FeatureMatches {
    pub first_keypoints: usize,
    pub second_keypoints: usize,
    pub matches: usize,
    pub visualization: Mat,
}

/// Builds an ORB detector with OpenCV's default pyramid and patch settings and
/// the given keypoint budget.
pub fn create_orb(max_features: i32) -> opencv::Result<Ptr<ORB>> {
    ORB::create(
        max_features,
        1.2, // scaleFactor
        8,   // nlevels
        31,  // edgeThreshold
        0,   // firstLevel
        2,   // WTA_K
        features2d::ORB_ScoreType::HARRIS_SCORE,
        31, // patchSize
        20, // fastThreshold
    )
}

pub struct FeatureInspector {
    config: FeatureConfig,
}

impl FeatureInspector {
    pub fn new(config: FeatureConfig) -> Self {
        Self { config }
    }

    /// Detects, gates, matches and draws. Nothing is shown.
    pub fn inspect(&self, first: &Mat, second: &Mat) -> Result<FeatureMatches, InspectError> {
        let mut orb = create_orb(self.config.max_features)?;

        let mut first_keypoints = Vector::<KeyPoint>::new();
        let mut first_descriptors = Mat::default();
        orb.detect_and_compute(
            first,
            &Mat::default(),
            &mut first_keypoints,
            &mut first_descriptors,
            false,
        )?;

        let mut second_keypoints = Vector::<KeyPoint>::new();
        let mut second_descriptors = Mat::default();
        orb.detect_and_compute(
            second,
            &Mat::default(),
            &mut second_keypoints,
            &mut second_descriptors,
            false,
        )?;

        let (first_count, second_count) = (first_keypoints.len(), second_keypoints.len());
        log::info!("detected {} / {} keypoints", first_count, second_count);

        if first_count < self.config.min_keypoints || second_count < self.config.min_keypoints {
            return Err(InspectError::NotEnoughFeatures {
                first: first_count,
                second: second_count,
            });
        }

        let matcher = features2d::BFMatcher::create(core::NORM_HAMMING, false)?;
        let mut matches = Vector::<core::DMatch>::new();
        matcher.train_match(
            &first_descriptors,
            &second_descriptors,
            &mut matches,
            &Mat::default(),
        )?;
        log::info!("found {} matches", matches.len());

        if matches.len() < self.config.min_matches {
            return Err(InspectError::NotEnoughMatches {
                first: first_count,
                second: second_count,
                matches: matches.len(),
            });
        }

        let mut visualization = Mat::default();
        features2d::draw_matches(
            first,
            &first_keypoints,
            second,
            &second_keypoints,
            &matches,
            &mut visualization,
            Scalar::all(-1.0),
            Scalar::all(-1.0),
            &Vector::<i8>::new(),
            features2d::DrawMatchesFlags::DEFAULT,
        )?;

        Ok(FeatureMatches {
            first_keypoints: first_count,
            second_keypoints: second_count,
            matches: matches.len(),
            visualization,
        })
    }

    /// Inspects the pair and, when both gates pass, shows the matches in the
    /// "Feature Matches" window.
    pub fn detect_and_show_features(
        &self,
        first: &Mat,
        second: &Mat,
        viewer: &mut Viewer,
    ) -> Result<FeatureMatches, InspectError> {
        let found = self.inspect(first, second)?;
        viewer.show(MATCHES_WINDOW, &found.visualization)?;
        Ok(found)
    }
}
