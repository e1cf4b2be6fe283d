// THEORY:
// The `Viewer` puts an image on screen at a predictable size. Every image is
// scaled to a fixed display width with its aspect ratio preserved, so a 4000px
// scan and a 300px thumbnail both arrive at a window the user can read.
//
// Key architectural principles:
// 1.  **Never Blocks**: A show call renders and returns after a short fixed wait
//     that only exists to let the window system pump its event queue. The command
//     loop stays responsive while windows stay open.
// 2.  **Surface Seam**: The actual drawing is behind the `DisplaySurface` trait.
//     `HighGuiSurface` talks to OpenCV's highgui; `HeadlessSurface` only records
//     what would have been shown. Tests and display-less machines use the latter.
// 3.  **Process-Wide Windows**: Windows are keyed by name and reused. They are
//     torn down together, once, when the console exits.

use opencv::{
    core::{Mat, Size},
    highgui, imgproc,
    prelude::*,
};
use std::cell::RefCell;
use std::rc::Rc;

/// Configuration for the `Viewer`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ViewerConfig {
    /// Width in pixels every shown image is scaled to.
    pub target_width: i32,
    /// Milliseconds handed to `wait_key` after each render.
    pub refresh_delay_ms: i32,
}

impl Default for ViewerConfig {
    fn default() -> Self {
        Self {
            target_width: 800,
            refresh_delay_ms: 100,
        }
    }
}

/// Something that can put a frame in a named window.
pub trait DisplaySurface {
    fn present(&mut self, window_name: &str, frame: &Mat) -> opencv::Result<()>;
    fn close_all(&mut self) -> opencv::Result<()>;
}

/// OpenCV highgui windows.
#[derive(Debug)]
pub struct HighGuiSurface {
    refresh_delay_ms: i32,
}

impl HighGuiSurface {
    pub fn new(refresh_delay_ms: i32) -> Self {
        Self { refresh_delay_ms }
    }
}

impl DisplaySurface for HighGuiSurface {
    fn present(&mut self, window_name: &str, frame: &Mat) -> opencv::Result<()> {
        highgui::named_window(window_name, highgui::WINDOW_NORMAL)?;
        highgui::imshow(window_name, frame)?;
        highgui::wait_key(self.refresh_delay_ms)?;
        Ok(())
    }

    fn close_all(&mut self) -> opencv::Result<()> {
        highgui::destroy_all_windows()
    }
}

/// A frame that was handed to a `HeadlessSurface`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PresentedFrame {
    pub window_name: String,
    pub width: i32,
    pub height: i32,
}

/// Records presented frames instead of drawing them. Clones share one record, so
/// a caller can keep a handle after giving the surface to a `Viewer`.
#[derive(Debug, Default, Clone)]
pub struct HeadlessSurface {
    record: Rc<RefCell<HeadlessRecord>>,
}

#[derive(Debug, Default)]
struct HeadlessRecord {
    presented: Vec<PresentedFrame>,
    closed: bool,
}

impl HeadlessSurface {
    pub fn presented(&self) -> Vec<PresentedFrame> {
        self.record.borrow().presented.clone()
    }

    pub fn is_closed(&self) -> bool {
        self.record.borrow().closed
    }
}

impl DisplaySurface for HeadlessSurface {
    fn present(&mut self, window_name: &str, frame: &Mat) -> opencv::Result<()> {
        self.record.borrow_mut().presented.push(PresentedFrame {
            window_name: window_name.to_string(),
            width: frame.cols(),
            height: frame.rows(),
        });
        Ok(())
    }

    fn close_all(&mut self) -> opencv::Result<()> {
        self.record.borrow_mut().closed = true;
        Ok(())
    }
}

/// Computes the display size for an image of `cols`x`rows` scaled to `target_width`.
pub fn display_size(cols: i32, rows: i32, target_width: i32) -> Size {
    let aspect_ratio = cols as f64 / rows as f64;
    let height = (target_width as f64 / aspect_ratio) as i32;
    Size::new(target_width, height.max(1))
}

pub struct Viewer {
    config: ViewerConfig,
    surface: Box<dyn DisplaySurface>,
}

impl Viewer {
    pub fn new(config: ViewerConfig, surface: Box<dyn DisplaySurface>) -> Self {
        Self { config, surface }
    }

    /// Scales `image` to the configured width and shows it. Returns `Ok(false)`
    /// without touching the surface when the image is empty.
    pub fn show(&mut self, window_name: &str, image: &Mat) -> opencv::Result<bool> {
        if image.empty() {
            return Ok(false);
        }

        let size = display_size(image.cols(), image.rows(), self.config.target_width);
        let mut resized = Mat::default();
        imgproc::resize(image, &mut resized, size, 0.0, 0.0, imgproc::INTER_LINEAR)?;

        log::debug!("showing '{}' at {}x{}", window_name, size.width, size.height);
        self.surface.present(window_name, &resized)?;
        Ok(true)
    }

    pub fn close_all(&mut self) -> opencv::Result<()> {
        self.surface.close_all()
    }
}
