//! Reference shade catalog
//!
//! The catalog is an ordered, immutable list of hair shades. Order matters: when two
//! shades are equally close to a sampled color the earlier one wins.

use std::collections::HashSet;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::formulation::ShadeLevel;
use crate::{Error, Result, Rgb};

/// One entry of the reference catalog
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReferenceShade {
    /// Level code, e.g. "7.1"
    pub code: String,
    pub description: String,
    pub rgb: Rgb,
}

impl ReferenceShade {
    pub fn new(code: &str, description: &str, rgb: Rgb) -> Self {
        Self {
            code: code.to_owned(),
            description: description.to_owned(),
            rgb,
        }
    }

    pub fn level(&self) -> Result<ShadeLevel> {
        ShadeLevel::from_code(&self.code)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShadeCatalog {
    shades: Vec<ReferenceShade>,
}

impl ShadeCatalog {
    /// Build a catalog, rejecting empty lists, duplicate codes and codes without a level
    pub fn new(shades: Vec<ReferenceShade>) -> Result<Self> {
        if shades.is_empty() {
            return Err(Error::InvalidCatalog {
                reason: "catalog has no shades".to_string(),
            });
        }
        let mut codes = HashSet::new();
        for shade in &shades {
            if !codes.insert(shade.code.as_str()) {
                return Err(Error::InvalidCatalog {
                    reason: format!("duplicate shade code {}", shade.code),
                });
            }
            shade.level()?;
        }
        Ok(Self { shades })
    }

    /// The catalog shipped with the crate
    pub fn builtin() -> Self {
        let shades = BUILTIN_SHADES
            .iter()
            .map(|&(code, description, (r, g, b))| {
                ReferenceShade::new(code, description, Rgb::new(r, g, b))
            })
            .collect();
        Self { shades }
    }

    /// Load a catalog from a JSON array of shades
    pub fn from_json_file(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)?;
        Self::from_json_str(&contents)
    }

    pub fn from_json_str(json: &str) -> Result<Self> {
        let shades: Vec<ReferenceShade> = serde_json::from_str(json)?;
        Self::new(shades)
    }

    pub fn to_json_string(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(&self.shades)?)
    }

    pub fn shades(&self) -> &[ReferenceShade] {
        &self.shades
    }

    pub fn len(&self) -> usize {
        self.shades.len()
    }

    pub fn is_empty(&self) -> bool {
        self.shades.is_empty()
    }

    pub fn find(&self, code: &str) -> Option<&ReferenceShade> {
        self.shades.iter().find(|shade| shade.code == code)
    }

    /// Like `find`, but an unknown code is an error
    pub fn get(&self, code: &str) -> Result<&ReferenceShade> {
        self.find(code).ok_or_else(|| Error::UnknownShade {
            code: code.to_owned(),
        })
    }

    /// The shade with the lowest lightness, first one on ties
    pub fn darkest(&self) -> &ReferenceShade {
        let mut darkest = &self.shades[0];
        let mut lightness = darkest.rgb.to_hsl().lightness;
        for shade in &self.shades[1..] {
            let l = shade.rgb.to_hsl().lightness;
            if l < lightness {
                darkest = shade;
                lightness = l;
            }
        }
        darkest
    }
}

impl Default for ShadeCatalog {
    fn default() -> Self {
        Self::builtin()
    }
}

const BUILTIN_SHADES: [(&str, &str, (u8, u8, u8)); 19] = [
    ("1", "Black", (14, 14, 14)),
    ("3", "Dark Brown", (55, 20, 14)),
    ("4", "Medium Brown", (64, 22, 15)),
    ("5", "Light Brown", (74, 29, 17)),
    ("6", "Dark Blonde", (73, 45, 21)),
    ("6.1", "Dark Ash Blonde", (71, 43, 28)),
    ("6.12", "Dark Ash Iridescent Blonde", (69, 41, 32)),
    ("7", "Medium Blonde", (78, 55, 25)),
    ("7.1", "Medium Ash Blonde", (76, 53, 32)),
    ("7.12", "Medium Ash Iridescent Blonde", (74, 51, 38)),
    ("8", "Light Blonde", (140, 115, 64)),
    ("8.1", "Light Ash Blonde", (138, 113, 71)),
    ("8.12", "Light Ash Iridescent Blonde", (136, 111, 77)),
    ("9", "Very Light Blonde", (193, 167, 103)),
    ("9.1", "Very Light Ash Blonde", (191, 165, 110)),
    ("9.12", "Very Light Ash Iridescent Blonde", (189, 163, 116)),
    ("10", "Lightest Blonde", (223, 211, 142)),
    ("10.1", "Lightest Ash Blonde", (221, 209, 149)),
    ("10.12", "Lightest Ash Iridescent Blonde", (219, 207, 155)),
];
