// THEORY:
// `SessionState` is the only mutable state the console carries between commands:
// the pair of images from the last `load` and the composite from the last
// successful stitch. The pair is stored as a single `Option`, so "loaded" and
// "both slots hold an image" can never disagree. Only `load` replaces or clears
// the pair; everything else reads it.

use opencv::core::Mat;

/// The two images the stitching commands operate on.
#[derive(Debug)]
pub struct ImagePair {
    pub first: Mat,
    pub second: Mat,
}

impl ImagePair {
    pub fn to_vec(&self) -> Vec<Mat> {
        vec![self.first.clone(), self.second.clone()]
    }
}

#[derive(Debug, Default)]
pub struct SessionState {
    images: Option<ImagePair>,
    last_result: Option<Mat>,
}

impl SessionState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn images_loaded(&self) -> bool {
        self.images.is_some()
    }

    pub fn images(&self) -> Option<&ImagePair> {
        self.images.as_ref()
    }

    /// Replaces the pair. Any previous stitch result belongs to the old pair and is dropped.
    pub fn store_images(&mut self, first: Mat, second: Mat) {
        self.images = Some(ImagePair { first, second });
        self.last_result = None;
    }

    pub fn invalidate(&mut self) {
        self.images = None;
        self.last_result = None;
    }

    pub fn last_result(&self) -> Option<&Mat> {
        self.last_result.as_ref()
    }

    pub fn record_result(&mut self, result: Mat) {
        self.last_result = Some(result);
    }
}
