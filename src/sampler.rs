//! Average hair color sampled from the middle of a photo

use std::io::Cursor;
use std::path::PathBuf;

use image::{DynamicImage, ImageBuffer, Rgba};
use imageproc::rect::Rect;
use serde::Serialize;

use crate::{Error, Result, Rgb};

/// Where a photo comes from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PhotoSource {
    Path(PathBuf),
    /// Encoded image bytes, format is guessed from the content
    Bytes(Vec<u8>),
}

impl PhotoSource {
    /// Name used in messages
    pub fn name(&self) -> String {
        match self {
            PhotoSource::Path(path) => path.display().to_string(),
            PhotoSource::Bytes(bytes) => format!("<{} bytes>", bytes.len()),
        }
    }
}

impl From<PathBuf> for PhotoSource {
    fn from(path: PathBuf) -> Self {
        PhotoSource::Path(path)
    }
}

impl From<Vec<u8>> for PhotoSource {
    fn from(bytes: Vec<u8>) -> Self {
        PhotoSource::Bytes(bytes)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SamplingConfig {
    /// Upper bound for half the window side, in pixels
    pub max_half_size: u32,
    /// Half the window side is at most the shorter image side divided by this
    pub size_divisor: u32,
    /// Distance between sampled pixels on both axes
    pub stride: u32,
}

impl Default for SamplingConfig {
    fn default() -> Self {
        Self {
            max_half_size: 100,
            size_divisor: 4,
            stride: 2,
        }
    }
}

/// Square window centered on the image, spanning [center - half, center + half) on both axes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SamplingWindow {
    pub center_x: u32,
    pub center_y: u32,
    pub half_size: u32,
}

impl SamplingWindow {
    /// Window for an image of the given size, `None` when the image is too small to sample
    pub fn centered(width: u32, height: u32, config: &SamplingConfig) -> Option<Self> {
        let divisor = config.size_divisor.max(1);
        let half_size = config.max_half_size.min(width.min(height) / divisor);
        if half_size == 0 {
            return None;
        }
        Some(Self {
            center_x: width / 2,
            center_y: height / 2,
            half_size,
        })
    }

    pub fn left(&self) -> i64 {
        i64::from(self.center_x) - i64::from(self.half_size)
    }

    pub fn top(&self) -> i64 {
        i64::from(self.center_y) - i64::from(self.half_size)
    }

    pub fn side(&self) -> u32 {
        self.half_size * 2
    }

    pub fn to_rect(&self) -> Rect {
        Rect::at(self.left() as i32, self.top() as i32).of_size(self.side(), self.side())
    }
}

/// Result of sampling one photo
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ColorSample {
    pub color: Rgb,
    pub sample_count: u32,
    pub window: SamplingWindow,
}

/// Decode a photo from a file or from memory
pub fn load_photo(source: &PhotoSource) -> Result<DynamicImage> {
    let bytes = match source {
        PhotoSource::Path(path) => {
            std::fs::read(path).map_err(|e| Error::image_load(source.name(), e))?
        }
        PhotoSource::Bytes(bytes) => bytes.clone(),
    };
    let image_reader = image::ImageReader::new(Cursor::new(bytes))
        .with_guessed_format()
        .map_err(|e| Error::image_load(source.name(), e))?;
    image_reader
        .decode()
        .map_err(|e| Error::image_load(source.name(), e))
}

/// Average the colors in the centered sampling window
///
/// Only pixels inside the image that are not fully transparent count as samples.
pub fn sample_average(
    image: &ImageBuffer<Rgba<u8>, Vec<u8>>,
    config: &SamplingConfig,
) -> Result<ColorSample> {
    let (width, height) = image.dimensions();
    let window = SamplingWindow::centered(width, height, config).ok_or_else(|| {
        Error::ImageProcessing {
            reason: format!("image of {width}x{height} pixels is too small to sample"),
        }
    })?;
    let stride = config.stride.max(1) as usize;
    let (mut total_r, mut total_g, mut total_b) = (0u64, 0u64, 0u64);
    let mut sample_count = 0u32;
    for y in (window.top()..window.top() + i64::from(window.side())).step_by(stride) {
        for x in (window.left()..window.left() + i64::from(window.side())).step_by(stride) {
            if x < 0 || y < 0 || x >= i64::from(width) || y >= i64::from(height) {
                continue;
            }
            let pixel = image.get_pixel(x as u32, y as u32);
            if pixel[3] == 0 {
                continue;
            }
            total_r += u64::from(pixel[0]);
            total_g += u64::from(pixel[1]);
            total_b += u64::from(pixel[2]);
            sample_count += 1;
        }
    }
    if sample_count == 0 {
        return Err(Error::ImageProcessing {
            reason: "no valid color samples in the sampling window".to_string(),
        });
    }
    let count = f64::from(sample_count);
    let color = Rgb::from_channels(
        total_r as f64 / count,
        total_g as f64 / count,
        total_b as f64 / count,
    )?;
    Ok(ColorSample {
        color,
        sample_count,
        window,
    })
}

/// Load a photo and sample its color
pub fn sample_photo(source: &PhotoSource, config: &SamplingConfig) -> Result<ColorSample> {
    let image = load_photo(source)?;
    sample_average(&image.to_rgba8(), config)
}
