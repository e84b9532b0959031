//! Color values and the RGB to HSL conversion used for shade matching

use std::fmt;

use ::color::{AlphaColor, ParseError};
use image::Rgba;
use itertools::Itertools; // for join()
use palette::{FromColor, Hsl, Lab, Srgb};
use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// An 8-bit sRGB color
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

/// Unvalidated color channels as handed over by a caller, may contain NaN
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RawRgb {
    pub r: f64,
    pub g: f64,
    pub b: f64,
}

/// HSL color with hue in turns [0, 1), saturation and lightness in [0, 1]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HslColor {
    pub hue: f32,
    pub saturation: f32,
    pub lightness: f32,
}

impl Rgb {
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Validate and round raw channel values into an 8-bit color
    pub fn from_channels(r: f64, g: f64, b: f64) -> Result<Self> {
        let valid = |v: f64| v.is_finite() && (0.0..=255.0).contains(&v);
        if !(valid(r) && valid(g) && valid(b)) {
            return Err(Error::InvalidColorInput { r, g, b });
        }
        Ok(Self::new(r.round() as u8, g.round() as u8, b.round() as u8))
    }

    /// Parse a CSS color string, e.g. #RRGGBB or a named color
    pub fn parse(color: &str) -> core::result::Result<Self, ParseError> {
        let color = ::color::parse_color(color)?;
        let color: AlphaColor<::color::Srgb> = color.to_alpha_color();
        let [r, g, b, _] = color.to_rgba8().to_u8_array();
        Ok(Self::new(r, g, b))
    }

    /// Format as #RRGGBB
    pub fn to_hex(self) -> String {
        format!(
            "#{}",
            [self.r, self.g, self.b]
                .iter()
                .map(|c| format!("{c:02X}"))
                .join("")
        )
    }

    /// Channels scaled to 0.0-1.0 as a palette color
    pub fn to_srgb(self) -> Srgb<f32> {
        Srgb::new(
            self.r as f32 / 255.0,
            self.g as f32 / 255.0,
            self.b as f32 / 255.0,
        )
    }

    /// Convert to CIE Lab for perceptual comparison
    pub fn to_lab(self) -> Lab {
        Lab::from_color(self.to_srgb())
    }

    pub fn to_hsl(self) -> HslColor {
        HslColor::from(self)
    }

    pub fn to_rgba(self) -> Rgba<u8> {
        Rgba([self.r, self.g, self.b, 255])
    }

    pub fn is_achromatic(self) -> bool {
        self.r == self.g && self.g == self.b
    }
}

impl fmt::Display for Rgb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl From<Rgba<u8>> for Rgb {
    fn from(pixel: Rgba<u8>) -> Self {
        Self::new(pixel[0], pixel[1], pixel[2])
    }
}

impl From<Rgb> for RawRgb {
    fn from(color: Rgb) -> Self {
        Self::new(color.r.into(), color.g.into(), color.b.into())
    }
}

impl RawRgb {
    pub const fn new(r: f64, g: f64, b: f64) -> Self {
        Self { r, g, b }
    }

    pub fn validate(self) -> Result<Rgb> {
        Rgb::from_channels(self.r, self.g, self.b)
    }
}

impl From<Rgb> for HslColor {
    fn from(color: Rgb) -> Self {
        // Gray has no hue, skip the division by a zero chroma
        if color.is_achromatic() {
            return Self {
                hue: 0.0,
                saturation: 0.0,
                lightness: color.r as f32 / 255.0,
            };
        }
        let hsl: Hsl = Hsl::from_color(color.to_srgb());
        let mut hue = hsl.hue.into_positive_degrees() / 360.0;
        // Rounding can land exactly on a full turn
        if !(0.0..1.0).contains(&hue) {
            hue = hue.rem_euclid(1.0);
            if hue >= 1.0 {
                hue = 0.0;
            }
        }
        Self {
            hue,
            saturation: hsl.saturation.clamp(0.0, 1.0),
            lightness: hsl.lightness.clamp(0.0, 1.0),
        }
    }
}

impl HslColor {
    /// Hue difference on the shorter arc, in turns [0, 0.5]
    pub fn hue_difference(&self, other: &HslColor) -> f32 {
        let d = (self.hue - other.hue).abs();
        d.min(1.0 - d)
    }
}
