// THEORY:
// Warped composites come back framed by pure black where no input pixel landed.
// The `border` module finds the rectangle that actually holds content: anything
// above 1 in grayscale counts as content, and the bounding box of the
// largest external contour of that mask is the content rectangle.

use opencv::{
    core::{Mat, Point, Rect, Scalar, Vector},
    imgproc,
    prelude::*,
};

pub const BORDER_WINDOW: &str = "Black Border";

/// Bounding rectangle of the largest non-black region, or `None` when the image
/// is empty or entirely black.
pub fn find_content_rect(image: &Mat) -> opencv::Result<Option<Rect>> {
    if image.empty() {
        return Ok(None);
    }

    let gray = if image.channels() == 1 {
        image.try_clone()?
    } else {
        let mut gray = Mat::default();
        imgproc::cvt_color(image, &mut gray, imgproc::COLOR_BGR2GRAY, 0)?;
        gray
    };

    let mut mask = Mat::default();
    imgproc::threshold(&gray, &mut mask, 1.0, 255.0, imgproc::THRESH_BINARY)?;

    let mut contours = Vector::<Vector<Point>>::new();
    imgproc::find_contours(
        &mask,
        &mut contours,
        imgproc::RETR_EXTERNAL,
        imgproc::CHAIN_APPROX_SIMPLE,
        Point::new(0, 0),
    )?;

    let mut largest: Option<(f64, Vector<Point>)> = None;
    for contour in contours {
        let area = imgproc::contour_area(&contour, false)?;
        if largest.as_ref().is_none_or(|(best, _)| area > *best) {
            largest = Some((area, contour));
        }
    }

    match largest {
        Some((_, contour)) => Ok(Some(imgproc::bounding_rect(&contour)?)),
        None => Ok(None),
    }
}

/// Copies out the content rectangle. Images without one come back unchanged.
pub fn crop_black_borders(image: &Mat) -> opencv::Result<Mat> {
    match find_content_rect(image)? {
        Some(rect) => Mat::roi(image, rect)?.try_clone(),
        None => image.try_clone(),
    }
}

/// A copy of `image` with its content rectangle outlined in red and labelled.
pub fn draw_black_border(image: &Mat) -> opencv::Result<Mat> {
    let mut annotated = image.try_clone()?;
    let Some(rect) = find_content_rect(image)? else {
        return Ok(annotated);
    };

    let red = Scalar::new(0.0, 0.0, 255.0, 0.0);
    imgproc::rectangle(&mut annotated, rect, red, 3, imgproc::LINE_8, 0)?;
    imgproc::put_text(
        &mut annotated,
        &format!("Border: ({}, {}, {}, {})", rect.x, rect.y, rect.width, rect.height),
        Point::new(10, 30),
        imgproc::FONT_HERSHEY_SIMPLEX,
        0.7,
        red,
        2,
        imgproc::LINE_8,
        false,
    )?;
    Ok(annotated)
}
