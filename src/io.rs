use std::fs::File;
use std::io::BufWriter;
use std::path::{Path, PathBuf};

use image::{ImageBuffer, Rgba};

use crate::Result;

/// Writes debug images next to the photo they were made from
pub(crate) struct ImageSaver {
    base_path: PathBuf,
    is_debugging: bool,
}

impl ImageSaver {
    /// Base path is the photo path without its extension
    pub(crate) fn new(photo: &Path, is_debugging: bool) -> Self {
        let stem = photo.file_stem().unwrap_or(photo.as_os_str());
        let base_path = match photo.parent() {
            Some(parent) => parent.join(stem),
            None => PathBuf::from(stem),
        };
        Self {
            base_path,
            is_debugging,
        }
    }

    /// Save RGBA image to PNG file with suffix appended before extension
    pub(crate) fn save_rgba_image_as(
        &self,
        img: &ImageBuffer<Rgba<u8>, Vec<u8>>,
        suffix: &str,
    ) -> Result<PathBuf> {
        let filename = self.compute_path(suffix);
        let file = File::create(&filename)?;
        let mut encoder = png::Encoder::new(BufWriter::new(file), img.width(), img.height());
        encoder.set_color(png::ColorType::Rgba);
        encoder.set_depth(png::BitDepth::Eight);
        encoder.write_header()?.write_image_data(img.as_raw())?;
        Ok(filename)
    }

    pub(crate) fn is_debugging(&self) -> bool {
        self.is_debugging
    }

    /// Compute full file path from base path and suffix
    pub(crate) fn compute_path(&self, suffix: &str) -> PathBuf {
        format!("{}-{suffix}.png", self.base_path.display()).into()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn debug_images_go_next_to_the_photo() {
        let saver = ImageSaver::new(Path::new("photos/client-before.jpg"), true);
        assert_eq!(
            saver.compute_path("sample-window"),
            PathBuf::from("photos/client-before-sample-window.png")
        );
    }

    #[test]
    fn saves_png_that_decodes_back() {
        let photo = std::env::temp_dir().join(format!("shade-match-io-{}.jpg", std::process::id()));
        let saver = ImageSaver::new(&photo, true);
        let image = ImageBuffer::from_pixel(3, 2, Rgba([74, 29, 17, 255]));
        let path = saver.save_rgba_image_as(&image, "swatch").unwrap();
        let decoded = image::open(&path).unwrap().to_rgba8();
        std::fs::remove_file(&path).unwrap();
        assert_eq!(decoded, image);
    }
}
