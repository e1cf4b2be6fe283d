// Synthetic images for unit tests.

use opencv::{
    core::{self, Mat, Point, Rect, Scalar, Vector},
    imgcodecs, imgproc,
    prelude::*,
};
use std::path::Path;

/// A noisy background covered in a deterministic scatter of colored shapes.
/// Rich enough for ORB to find thousands of corners.
pub fn textured_scene(width: i32, height: i32) -> Mat {
    let mut img = Mat::new_rows_cols_with_default(height, width, core::CV_8UC3, Scalar::all(0.0))
        .expect("Error allocating scene.");
    core::randu(&mut img, &Scalar::all(0.0), &Scalar::all(255.0)).expect("Error filling noise.");

    let mut state = 0x2545_f491u32;
    let mut next = |bound: i32| -> i32 {
        state ^= state << 13;
        state ^= state >> 17;
        state ^= state << 5;
        (state % bound.max(1) as u32) as i32
    };

    for i in 0..(width * height / 2000).max(20) {
        let color = Scalar::new(next(256) as f64, next(256) as f64, next(256) as f64, 0.0);
        let x = next(width);
        let y = next(height);
        if i % 2 == 0 {
            imgproc::circle(&mut img, Point::new(x, y), 4 + next(20), color, -1, imgproc::LINE_8, 0)
                .expect("Error drawing circle.");
        } else {
            let rect = Rect::new(x, y, 6 + next(30), 6 + next(30));
            imgproc::rectangle(&mut img, rect, color, -1, imgproc::LINE_8, 0)
                .expect("Error drawing rectangle.");
        }
    }
    img
}

pub fn uniform(width: i32, height: i32, value: f64) -> Mat {
    Mat::new_rows_cols_with_default(height, width, core::CV_8UC3, Scalar::all(value))
        .expect("Error allocating image.")
}

pub fn crop(img: &Mat, rect: Rect) -> Mat {
    Mat::roi(img, rect)
        .expect("Error taking roi.")
        .try_clone()
        .expect("Error cloning roi.")
}

pub fn write_image(dir: &Path, name: &str, img: &Mat) {
    let path = dir.join(name);
    let written = imgcodecs::imwrite(path.to_str().expect("utf-8 path"), img, &Vector::new())
        .expect("Error writing image.");
    assert!(written, "imwrite refused {}", path.display());
}
