// THEORY:
// The `Console` is the read-eval loop that ties the components together. It owns
// the session state and the viewer, reads one line at a time, dispatches the
// typed command, and writes every reply to its output. The loop is strictly
// sequential: a command runs to completion before the next prompt is written.
//
// Key architectural principles:
// 1.  **Single Owner**: Only the console mutates `SessionState`, and only the
//     `load` command replaces or clears the image pair.
// 2.  **Recover Everything**: Every component failure becomes a printed message.
//     The only errors `run` returns are failures to read input or write output.
// 3.  **Injectable I/O**: Input is any `BufRead`, output any `Write`, and the
//     display surface is chosen by the caller, so whole sessions can be replayed
//     in memory.

use crate::config::ConsoleConfig;
use crate::core_modules::border;
use crate::core_modules::feature_inspector::{FeatureInspector, InspectError};
use crate::core_modules::image_loader::image_loader::{write_image, ImageLoader};
use crate::core_modules::stitcher::{StitchError, StitchMode, StitcherAdapter};
use crate::core_modules::viewer::{DisplaySurface, Viewer};
use crate::error::{ConsoleError, Result};
use crate::session::SessionState;
use opencv::{core::Mat, prelude::*};
use std::io::{self, BufRead, Write};
use std::ops::ControlFlow;
use std::path::Path;

pub const RESULT_WINDOW: &str = "Final Result";

/// A parsed command line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Exit,
    Help,
    Load,
    Features,
    StitchScans,
    StitchPanorama,
    Borders,
    Unknown(String),
}

impl Command {
    /// Surrounding whitespace is ignored; anything unrecognised is kept verbatim.
    pub fn parse(line: &str) -> Self {
        match line.trim() {
            "exit" => Command::Exit,
            "help" => Command::Help,
            "load" => Command::Load,
            "features" => Command::Features,
            "stitch_scans" => Command::StitchScans,
            "stitch_panorama" => Command::StitchPanorama,
            "borders" => Command::Borders,
            other => Command::Unknown(other.to_string()),
        }
    }
}

pub struct Console<W: Write> {
    config: ConsoleConfig,
    loader: ImageLoader,
    inspector: FeatureInspector,
    stitcher: StitcherAdapter,
    viewer: Viewer,
    session: SessionState,
    out: W,
}

impl<W: Write> Console<W> {
    pub fn new(config: ConsoleConfig, surface: Box<dyn DisplaySurface>, out: W) -> Self {
        Self {
            loader: ImageLoader::new(config.base_dir.clone()),
            inspector: FeatureInspector::new(config.features),
            stitcher: StitcherAdapter::new(config.features),
            viewer: Viewer::new(config.viewer, surface),
            session: SessionState::new(),
            config,
            out,
        }
    }

    pub fn session(&self) -> &SessionState {
        &self.session
    }

    pub fn into_output(self) -> W {
        self.out
    }

    /// Prints the banner, then reads and executes commands until `exit` or end of
    /// input. All windows are closed before returning, whether or not the loop
    /// ended cleanly.
    pub fn run<R: BufRead>(&mut self, mut input: R) -> Result<()> {
        let outcome = self.command_loop(&mut input);

        if let Err(e) = self.viewer.close_all() {
            log::warn!("failed to close windows: {}", e);
        }
        outcome?;
        self.out.flush()?;
        Ok(())
    }

    fn command_loop<R: BufRead>(&mut self, input: &mut R) -> Result<()> {
        self.print_banner()?;

        // Raw bytes: a line that is not UTF-8 is an unknown command, not a read failure.
        let mut line = Vec::new();
        loop {
            write!(self.out, "\n> ")?;
            self.out.flush()?;

            line.clear();
            let command = match input.read_until(b'\n', &mut line)? {
                0 => Command::Exit,
                _ => Command::parse(&String::from_utf8_lossy(&line)),
            };
            log::debug!("dispatching {:?}", command);

            if self.execute(command)?.is_break() {
                return Ok(());
            }
        }
    }

    fn print_banner(&mut self) -> Result<()> {
        let version = opencv::core::get_version_string()?;
        writeln!(self.out, "OpenCV Image Stitching Console")?;
        writeln!(self.out, "OpenCV version: {}", version)?;
        writeln!(self.out, "Working directory: {}", self.config.base_dir.display())?;
        writeln!(self.out, "Type 'exit' to quit or 'help' for commands")?;
        Ok(())
    }

    /// Runs one command. `Break` means the console has reached its terminal state.
    pub fn execute(&mut self, command: Command) -> io::Result<ControlFlow<()>> {
        match command {
            Command::Exit => {
                writeln!(self.out, "Exiting console. Goodbye!")?;
                return Ok(ControlFlow::Break(()));
            }
            Command::Help => self.print_help()?,
            Command::Load => self.load()?,
            Command::Features => self.features()?,
            Command::StitchScans => self.stitch_scans()?,
            Command::StitchPanorama => self.stitch_panorama()?,
            Command::Borders => self.borders()?,
            Command::Unknown(text) => {
                writeln!(
                    self.out,
                    "Unknown command: {}. Type 'help' for available commands.",
                    text
                )?;
            }
        }
        Ok(ControlFlow::Continue(()))
    }

    fn print_help(&mut self) -> io::Result<()> {
        writeln!(self.out, "Available commands:")?;
        writeln!(
            self.out,
            "  load            - Load images ({} and {})",
            self.config.first_image, self.config.second_image
        )?;
        writeln!(self.out, "  features        - Detect and show features")?;
        writeln!(self.out, "  stitch_scans    - Stitch images in SCANS mode")?;
        writeln!(self.out, "  stitch_panorama - Stitch images in PANORAMA mode")?;
        writeln!(
            self.out,
            "  borders         - Show the content border of the last stitch result"
        )?;
        writeln!(self.out, "  exit            - Exit the program")?;
        Ok(())
    }

    fn load(&mut self) -> io::Result<()> {
        let first_name = self.config.first_image.clone();
        let second_name = self.config.second_image.clone();
        let first = self.read_image(&first_name)?;
        let second = self.read_image(&second_name)?;

        match (first, second) {
            (Some(first), Some(second)) => {
                self.session.store_images(first, second);
                writeln!(self.out, "Images loaded successfully")?;
            }
            _ => {
                self.session.invalidate();
                writeln!(self.out, "Failed to load one or both images")?;
            }
        }
        Ok(())
    }

    fn read_image(&mut self, name: &str) -> io::Result<Option<Mat>> {
        writeln!(self.out, "Reading image from: {}", self.loader.resolve(name).display())?;
        match self.loader.read_image(name) {
            Ok(img) => {
                writeln!(self.out, "Image read successfully. Size: {}x{}", img.cols(), img.rows())?;
                Ok(Some(img))
            }
            Err(e) => {
                writeln!(self.out, "Error: {}", e)?;
                Ok(None)
            }
        }
    }

    fn features(&mut self) -> io::Result<()> {
        let Some(pair) = self.session.images() else {
            return writeln!(self.out, "{}", ConsoleError::NotLoaded);
        };

        match self.inspector.detect_and_show_features(&pair.first, &pair.second, &mut self.viewer) {
            Ok(found) => {
                writeln!(self.out, "Detected {} keypoints in image 1", found.first_keypoints)?;
                writeln!(self.out, "Detected {} keypoints in image 2", found.second_keypoints)?;
                writeln!(self.out, "Found {} matches between images", found.matches)?;
            }
            Err(InspectError::NotEnoughFeatures { first, second }) => {
                writeln!(self.out, "Detected {} keypoints in image 1", first)?;
                writeln!(self.out, "Detected {} keypoints in image 2", second)?;
                writeln!(self.out, "Error: Not enough features detected in images")?;
            }
            Err(InspectError::NotEnoughMatches { first, second, matches }) => {
                writeln!(self.out, "Detected {} keypoints in image 1", first)?;
                writeln!(self.out, "Detected {} keypoints in image 2", second)?;
                writeln!(self.out, "Found {} matches between images", matches)?;
                writeln!(self.out, "Error: Not enough matches between images")?;
            }
            Err(InspectError::OpenCv(e)) => writeln!(self.out, "Error: {}", e)?,
        }
        Ok(())
    }

    /// Stitches the loaded pair, printing the pipeline's diagnostics. `None` when
    /// nothing is loaded or stitching failed.
    fn stitch_loaded(&mut self, mode: StitchMode) -> io::Result<Option<Mat>> {
        let images = match self.session.images() {
            Some(pair) => pair.to_vec(),
            None => {
                writeln!(self.out, "{}", ConsoleError::NotLoaded)?;
                return Ok(None);
            }
        };

        match self.stitcher.stitch_images(&images, mode) {
            Ok(result) => {
                writeln!(self.out, "Stitching completed successfully")?;
                Ok(Some(result))
            }
            Err(e) => {
                self.report_stitch_failure(&e)?;
                Ok(None)
            }
        }
    }

    fn report_stitch_failure(&mut self, err: &StitchError) -> io::Result<()> {
        writeln!(self.out, "{}", err)?;
        if let Some(hint) = err.hint() {
            writeln!(self.out, "{}", hint)?;
        }
        Ok(())
    }

    fn save_result(&mut self, path: &Path, image: &Mat) -> io::Result<bool> {
        match write_image(path, image) {
            Ok(()) => {
                writeln!(self.out, "Result saved as {}", path.display())?;
                Ok(true)
            }
            Err(e) => {
                writeln!(self.out, "Error: {}", e)?;
                Ok(false)
            }
        }
    }

    fn stitch_scans(&mut self) -> io::Result<()> {
        let Some(result) = self.stitch_loaded(StitchMode::Scans)? else {
            return Ok(());
        };

        let output = self.config.scans_output.clone();
        self.save_result(&output, &result)?;
        self.session.record_result(result);
        Ok(())
    }

    fn stitch_panorama(&mut self) -> io::Result<()> {
        let Some(mut result) = self.stitch_loaded(StitchMode::Panorama)? else {
            return Ok(());
        };

        if self.config.crop_panorama {
            match border::crop_black_borders(&result) {
                Ok(cropped) => result = cropped,
                Err(e) => log::warn!("keeping uncropped panorama: {}", e),
            }
        }

        let output = self.config.panorama_output.clone();
        self.save_result(&output, &result)?;
        self.show(RESULT_WINDOW, &result);
        self.session.record_result(result);
        Ok(())
    }

    fn borders(&mut self) -> io::Result<()> {
        let Some(result) = self.session.last_result() else {
            return writeln!(
                self.out,
                "No stitch result yet. Use 'stitch_scans' or 'stitch_panorama' first."
            );
        };

        let found = (border::find_content_rect(result), border::draw_black_border(result));
        let annotated = match found {
            (Ok(rect), Ok(annotated)) => {
                match rect {
                    Some(rect) => writeln!(
                        self.out,
                        "Content border: ({}, {}, {}, {})",
                        rect.x, rect.y, rect.width, rect.height
                    )?,
                    None => writeln!(self.out, "No content border found")?,
                }
                annotated
            }
            (Err(e), _) | (_, Err(e)) => return writeln!(self.out, "Error: {}", e),
        };
        self.show(border::BORDER_WINDOW, &annotated);
        Ok(())
    }

    fn show(&mut self, window_name: &str, image: &Mat) {
        if let Err(e) = self.viewer.show(window_name, image) {
            log::warn!("could not show '{}': {}", window_name, e);
        }
    }
}
