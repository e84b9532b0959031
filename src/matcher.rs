//! Nearest reference shade for a sampled color

use clap::ValueEnum;
use itertools::Itertools; // for sorted_by()
use serde::Serialize;

use crate::catalog::{ReferenceShade, ShadeCatalog};
use crate::{RawRgb, Rgb};

/// How the distance between two colors is measured
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum DistanceMetric {
    /// Weighted hue, saturation and lightness differences
    #[default]
    WeightedHsl,
    /// Plain euclidean distance of the 0-255 channels
    Rgb,
    /// Euclidean distance in CIE Lab
    Lab,
}

/// Weights applied to the HSL differences (hue in degrees, the rest in percentage points)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HslWeights {
    pub hue: f32,
    pub saturation: f32,
    pub lightness: f32,
}

impl Default for HslWeights {
    fn default() -> Self {
        Self {
            hue: 2.0,
            saturation: 1.0,
            lightness: 1.5,
        }
    }
}

impl DistanceMetric {
    pub fn distance(self, a: Rgb, b: Rgb) -> f32 {
        match self {
            DistanceMetric::WeightedHsl => weighted_hsl_distance(a, b, &HslWeights::default()),
            DistanceMetric::Rgb => rgb_distance(a, b),
            DistanceMetric::Lab => lab_distance(a, b),
        }
    }
}

pub fn weighted_hsl_distance(a: Rgb, b: Rgb, weights: &HslWeights) -> f32 {
    let (a, b) = (a.to_hsl(), b.to_hsl());
    let hue = a.hue_difference(&b) * 360.0 * weights.hue;
    let saturation = (a.saturation - b.saturation).abs() * 100.0 * weights.saturation;
    let lightness = (a.lightness - b.lightness).abs() * 100.0 * weights.lightness;
    (hue.powi(2) + saturation.powi(2) + lightness.powi(2)).sqrt()
}

pub fn rgb_distance(a: Rgb, b: Rgb) -> f32 {
    let channel = |x: u8, y: u8| (f32::from(x) - f32::from(y)).powi(2);
    (channel(a.r, b.r) + channel(a.g, b.g) + channel(a.b, b.b)).sqrt()
}

/// Figure out how similar two colors are based on euclidean distance in Lab colorspace
pub fn lab_distance(a: Rgb, b: Rgb) -> f32 {
    let (lab_a, lab_b) = (a.to_lab(), b.to_lab());
    let delta_e =
        (lab_a.l - lab_b.l).powi(2) + (lab_a.a - lab_b.a).powi(2) + (lab_a.b - lab_b.b).powi(2);
    delta_e.sqrt()
}

/// A shade paired with its distance to the sampled color
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Candidate<'a> {
    pub shade: &'a ReferenceShade,
    pub distance: f32,
}

/// Shade code and distance of a runner-up
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RankedShade {
    pub code: String,
    pub distance: f32,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MatchReport {
    pub shade: ReferenceShade,
    pub distance: f32,
    /// Closest candidates within the shortlist tolerance, nearest first
    pub shortlist: Vec<RankedShade>,
    /// Set when the input was invalid and the darkest shade was picked instead
    pub fallback: bool,
}

pub const SHORTLIST_TOLERANCE: f32 = 1.2;
pub const SHORTLIST_LEN: usize = 3;

pub struct PaletteMatcher<'a> {
    catalog: &'a ShadeCatalog,
    metric: DistanceMetric,
}

impl<'a> PaletteMatcher<'a> {
    pub fn new(catalog: &'a ShadeCatalog, metric: DistanceMetric) -> Self {
        Self { catalog, metric }
    }

    pub fn metric(&self) -> DistanceMetric {
        self.metric
    }

    /// Distance from `color` to every shade, in catalog order
    pub fn candidates(&self, color: Rgb) -> Vec<Candidate<'a>> {
        self.catalog
            .shades()
            .iter()
            .map(|shade| Candidate {
                shade,
                distance: self.metric.distance(color, shade.rgb),
            })
            .collect()
    }

    /// Pick the nearest shade; invalid input gets the darkest shade instead of an error
    pub fn match_color(&self, color: RawRgb) -> MatchReport {
        let Ok(color) = color.validate() else {
            return self.fallback();
        };
        let candidates = self.candidates(color);
        let mut nearest: Option<Candidate<'a>> = None;
        for candidate in &candidates {
            if !candidate.distance.is_finite() {
                continue;
            }
            if nearest.is_none_or(|n| candidate.distance < n.distance) {
                nearest = Some(*candidate);
            }
        }
        let Some(nearest) = nearest else {
            return self.fallback();
        };
        let limit = nearest.distance * SHORTLIST_TOLERANCE;
        let shortlist = candidates
            .iter()
            .filter(|c| c.distance.is_finite() && c.distance <= limit)
            .sorted_by(|a, b| a.distance.total_cmp(&b.distance))
            .take(SHORTLIST_LEN)
            .map(|c| RankedShade {
                code: c.shade.code.clone(),
                distance: c.distance,
            })
            .collect();
        MatchReport {
            shade: nearest.shade.clone(),
            distance: nearest.distance,
            shortlist,
            fallback: false,
        }
    }

    /// Code of the nearest shade
    pub fn nearest_code(&self, color: RawRgb) -> String {
        self.match_color(color).shade.code
    }

    fn fallback(&self) -> MatchReport {
        MatchReport {
            shade: self.catalog.darkest().clone(),
            distance: f32::NAN,
            shortlist: Vec::new(),
            fallback: true,
        }
    }
}
