//! Lightening plan derived from a base and a target shade level

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// Integer lightness level of a shade code, "7.12" is level 7
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ShadeLevel(pub u8);

impl ShadeLevel {
    /// Parse the leading digits of a shade code
    pub fn from_code(code: &str) -> Result<Self> {
        let digits: String = code
            .trim()
            .chars()
            .take_while(char::is_ascii_digit)
            .collect();
        digits
            .parse::<u8>()
            .map(ShadeLevel)
            .map_err(|_| Error::InvalidShadeCode {
                code: code.to_owned(),
            })
    }
}

impl fmt::Display for ShadeLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Warm pigment exposed when hair of a given level is lightened
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Undertone {
    DarkRed,
    Red,
    RedOrange,
    Orange,
    OrangeGold,
    Gold,
    Yellow,
    PaleYellow,
    PalestYellow,
}

impl Undertone {
    pub fn for_level(level: ShadeLevel) -> Self {
        match level.0 {
            0..=2 => Undertone::DarkRed,
            3 => Undertone::Red,
            4 => Undertone::RedOrange,
            5 => Undertone::Orange,
            6 => Undertone::OrangeGold,
            7 => Undertone::Gold,
            8 => Undertone::Yellow,
            9 => Undertone::PaleYellow,
            _ => Undertone::PalestYellow,
        }
    }

    /// Red through gold backdrops usually need toning after lift
    pub fn is_warm(self) -> bool {
        matches!(
            self,
            Undertone::DarkRed
                | Undertone::Red
                | Undertone::RedOrange
                | Undertone::Orange
                | Undertone::OrangeGold
                | Undertone::Gold
        )
    }
}

impl fmt::Display for Undertone {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Undertone::DarkRed => "dark red",
            Undertone::Red => "red",
            Undertone::RedOrange => "red-orange",
            Undertone::Orange => "orange",
            Undertone::OrangeGold => "orange-gold",
            Undertone::Gold => "gold",
            Undertone::Yellow => "yellow",
            Undertone::PaleYellow => "pale yellow",
            Undertone::PalestYellow => "palest yellow",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FormulationResult {
    pub levels_needed: u8,
    /// Developer strength in volumes, e.g. 20
    pub oxidant_volume: u8,
    pub estimated_minutes: u32,
    pub undertone: Undertone,
    pub recommended_products: Vec<String>,
}

pub const DEFAULT_MINUTES_PER_LEVEL: u32 = 15;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Formulator {
    pub minutes_per_level: u32,
}

impl Default for Formulator {
    fn default() -> Self {
        Self {
            minutes_per_level: DEFAULT_MINUTES_PER_LEVEL,
        }
    }
}

impl Formulator {
    pub fn new(minutes_per_level: u32) -> Self {
        Self { minutes_per_level }
    }

    /// Compute the plan to go from `base` to `target`, going darker needs no lift
    pub fn plan(&self, base: ShadeLevel, target: ShadeLevel) -> FormulationResult {
        let levels_needed = target.0.saturating_sub(base.0);
        let oxidant_volume = oxidant_volume(levels_needed);
        let undertone = Undertone::for_level(base);
        FormulationResult {
            levels_needed,
            oxidant_volume,
            estimated_minutes: u32::from(levels_needed) * self.minutes_per_level,
            undertone,
            recommended_products: recommended_products(levels_needed, oxidant_volume, undertone),
        }
    }

    /// Same as `plan`, starting from shade codes
    pub fn plan_codes(&self, base: &str, target: &str) -> Result<FormulationResult> {
        Ok(self.plan(ShadeLevel::from_code(base)?, ShadeLevel::from_code(target)?))
    }
}

/// Never decreases as the number of levels grows
pub fn oxidant_volume(levels_needed: u8) -> u8 {
    match levels_needed {
        0 => 10,
        1..=2 => 20,
        3 => 30,
        _ => 40,
    }
}

fn recommended_products(levels_needed: u8, oxidant_volume: u8, undertone: Undertone) -> Vec<String> {
    let mut products = Vec::new();
    if levels_needed == 0 {
        products.push("Permanent color".to_string());
    } else {
        products.push("Bleaching powder".to_string());
    }
    products.push(format!("{oxidant_volume} volume developer"));
    if levels_needed >= 3 {
        products.push("Bond builder".to_string());
    }
    if levels_needed > 0 && undertone.is_warm() {
        products.push("Toner".to_string());
    }
    products
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn shade_level_parses_leading_digits() {
        assert_eq!(ShadeLevel::from_code("7").unwrap(), ShadeLevel(7));
        assert_eq!(ShadeLevel::from_code("7.12").unwrap(), ShadeLevel(7));
        assert_eq!(ShadeLevel::from_code("10.1").unwrap(), ShadeLevel(10));
        assert!(ShadeLevel::from_code("").is_err());
        assert!(ShadeLevel::from_code(".1").is_err());
    }

    #[test]
    fn lifting_three_levels() {
        let result = Formulator::default().plan(ShadeLevel(5), ShadeLevel(8));
        assert_eq!(result.levels_needed, 3);
        assert_eq!(result.estimated_minutes, 45);
        assert_eq!(result.undertone, Undertone::Orange);
        assert_eq!(result.oxidant_volume, 30);
        assert_eq!(
            result.recommended_products,
            vec![
                "Bleaching powder",
                "30 volume developer",
                "Bond builder",
                "Toner"
            ]
        );
    }

    #[test]
    fn going_darker_needs_no_lift() {
        let result = Formulator::default().plan(ShadeLevel(7), ShadeLevel(4));
        assert_eq!(result.levels_needed, 0);
        assert_eq!(result.estimated_minutes, 0);
        assert_eq!(
            result.recommended_products,
            vec!["Permanent color", "10 volume developer"]
        );
    }

    #[test]
    fn raising_target_never_reduces_lift_time_or_volume() {
        let formulator = Formulator::default();
        for base in 1..=10u8 {
            let mut previous = formulator.plan(ShadeLevel(base), ShadeLevel(1));
            for target in 2..=10u8 {
                let current = formulator.plan(ShadeLevel(base), ShadeLevel(target));
                assert!(current.levels_needed >= previous.levels_needed);
                assert!(current.estimated_minutes >= previous.estimated_minutes);
                assert!(current.oxidant_volume >= previous.oxidant_volume);
                previous = current;
            }
        }
    }

    #[test]
    fn undertone_is_keyed_by_base_level() {
        let formulator = Formulator::default();
        assert_eq!(
            formulator.plan(ShadeLevel(1), ShadeLevel(3)).undertone,
            Undertone::DarkRed
        );
        assert_eq!(
            formulator.plan(ShadeLevel(9), ShadeLevel(10)).undertone,
            Undertone::PaleYellow
        );
    }

    #[test]
    fn minutes_per_level_is_configurable() {
        let result = Formulator::new(20).plan_codes("6.1", "8.12").unwrap();
        assert_eq!(result.levels_needed, 2);
        assert_eq!(result.estimated_minutes, 40);
    }
}
