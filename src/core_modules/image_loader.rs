// THEORY:
// The `ImageLoader` is the console's only way of bringing pixels into memory. It
// knows one directory (the base directory captured at startup) and turns short
// filenames typed by the user into full paths under it. Decoding always produces
// a 3-channel color raster; anything OpenCV cannot decode (missing file, unknown
// format, truncated data) is reported as a recoverable `ImageDecode` error that
// names the full path that was tried.

pub mod image_loader {
    use crate::error::{path_to_str, ConsoleError, Result};
    use opencv::{
        core::{Mat, Vector},
        imgcodecs,
        prelude::*,
    };
    use std::path::{Path, PathBuf};

    /// Resolves relative filenames against a fixed base directory and decodes them.
    #[derive(Debug, Clone)]
    pub struct ImageLoader {
        base_dir: PathBuf,
    }

    impl ImageLoader {
        pub fn new(base_dir: impl Into<PathBuf>) -> Self {
            Self { base_dir: base_dir.into() }
        }

        pub fn resolve(&self, relative_path: &str) -> PathBuf {
            self.base_dir.join(relative_path)
        }

        /// Decodes `relative_path` as a color image. An empty decode is an error,
        /// never an empty `Mat`.
        pub fn read_image(&self, relative_path: &str) -> Result<Mat> {
            let path = self.resolve(relative_path);
            log::debug!("decoding {}", path.display());

            let img = imgcodecs::imread(path_to_str(&path)?, imgcodecs::IMREAD_COLOR)?;
            if img.empty() {
                return Err(ConsoleError::ImageDecode { path });
            }

            log::info!("decoded {} ({}x{})", path.display(), img.cols(), img.rows());
            Ok(img)
        }
    }

    /// Encodes `image` to `path`; the format follows the file extension.
    pub fn write_image(path: &Path, image: &Mat) -> Result<()> {
        if image.empty() {
            return Err(ConsoleError::EmptyImage);
        }
        if !imgcodecs::imwrite(path_to_str(path)?, image, &Vector::new())? {
            return Err(ConsoleError::ImageEncode { path: path.to_path_buf() });
        }
        log::info!("wrote {} ({}x{})", path.display(), image.cols(), image.rows());
        Ok(())
    }
}
