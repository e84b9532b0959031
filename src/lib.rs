pub use self::catalog::{ReferenceShade, ShadeCatalog};
pub use self::colorspace::{HslColor, RawRgb, Rgb};
pub use self::error::{Error, Result};
pub use self::formulation::{FormulationResult, Formulator, ShadeLevel, Undertone};
pub use self::matcher::{DistanceMetric, MatchReport, PaletteMatcher};
pub use self::sampler::{ColorSample, PhotoSource, SamplingConfig};
pub use self::session::{DetectionOutcome, SessionConfig, ShadeSelection, ShadeSession};

use std::ffi::OsString;
use std::path::PathBuf;
use std::time::Duration;

use clap::{Args as ClapArgs, Parser, Subcommand};

use analyzer::PhotoAnalyzer;

pub mod catalog;
pub mod colorspace;
pub mod formulation;
pub mod matcher;
pub mod sampler;
pub mod session;

mod analyzer;
mod arg_validators;
mod drawing;
mod error;
mod io;

#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// Reference shade catalog (JSON), the built-in catalog is used if omitted
    #[arg(short('c'), long, global = true)]
    catalog: Option<PathBuf>,
    /// Color distance used to find the nearest shade
    #[arg(short('m'), long, global = true, value_enum, default_value_t = DistanceMetric::WeightedHsl)]
    metric: DistanceMetric,
    /// Processing time per level of lift (minutes)
    #[arg(short('M'), long, global = true, default_value_t = formulation::DEFAULT_MINUTES_PER_LEVEL)]
    minutes_per_level: u32,
    /// Print results as JSON
    #[arg(short('j'), long, global = true, default_value_t = false)]
    json: bool,
    /// Verbose messages
    #[arg(short('v'), long, global = true, default_value_t = false)]
    verbose: bool,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Detect the base shade of photos
    Detect(DetectArgs),
    /// Find the reference shade nearest to a color
    Match {
        /// Color to match, e.g. #4A1D11
        #[arg(value_parser = arg_validators::validate_color)]
        color: Rgb,
    },
    /// Compute the lightening plan from a base to a target shade
    Plan {
        /// Base shade code
        #[arg(short, long)]
        base: String,
        /// Target shade code
        #[arg(short, long)]
        target: String,
    },
    /// List the reference shades
    Catalog,
}

#[derive(ClapArgs, Debug)]
struct DetectArgs {
    /// Input image files (glob patterns are expanded)
    #[arg(required(true))]
    files: Vec<String>,
    /// Target shade code, prints a lightening plan for each photo
    #[arg(short, long)]
    target: Option<String>,
    /// Give up waiting for a photo after this many seconds
    #[arg(long, default_value_t = 10, value_parser = arg_validators::validate_positive)]
    timeout_secs: u32,
    /// Largest half side of the sampling window (pixels)
    #[arg(long, default_value_t = 100, value_parser = arg_validators::validate_positive)]
    sample_max_half_size: u32,
    /// Half side of the sampling window is at most the shorter image side divided by this
    #[arg(long, default_value_t = 4, value_parser = arg_validators::validate_positive)]
    sample_size_divisor: u32,
    /// Sample every Nth pixel on both axes
    #[arg(long, default_value_t = 2, value_parser = arg_validators::validate_positive)]
    sample_stride: u32,
    /// Save intermediary images
    #[arg(short('s'), long, default_value_t = false)]
    save_intermediary_images: bool,
}

impl Args {
    fn load_catalog(&self) -> Result<ShadeCatalog> {
        match &self.catalog {
            Some(path) => {
                let catalog = ShadeCatalog::from_json_file(path)?;
                if self.verbose {
                    println!("{}: loaded {} shades", path.display(), catalog.len());
                }
                Ok(catalog)
            }
            None => Ok(ShadeCatalog::builtin()),
        }
    }

    fn session_config(&self, detect: Option<&DetectArgs>) -> SessionConfig {
        let mut config = SessionConfig {
            metric: self.metric,
            formulator: Formulator::new(self.minutes_per_level),
            ..SessionConfig::default()
        };
        if let Some(detect) = detect {
            config.sampling = SamplingConfig {
                max_half_size: detect.sample_max_half_size,
                size_divisor: detect.sample_size_divisor,
                stride: detect.sample_stride,
            };
            config.detection_timeout = Duration::from_secs(detect.timeout_secs.into());
        }
        config
    }
}

/// Parse command line arguments and run the selected command
pub fn run<I, T>(args: I) -> Result<()>
where
    I: IntoIterator<Item = T>,
    T: Into<OsString> + Clone,
{
    let args = Args::parse_from(args);
    let catalog = args.load_catalog()?;
    match &args.command {
        Command::Detect(detect) => {
            let config = args.session_config(Some(detect));
            for file in expand_file_patterns(&detect.files)? {
                let mut session = ShadeSession::new(catalog.clone(), config);
                if let Some(target) = &detect.target {
                    session.select_target(target)?;
                }
                let photo_analyzer = PhotoAnalyzer::new(file, &args, detect);
                photo_analyzer.process(&mut session)?;
            }
        }
        Command::Match { color } => {
            let report = PaletteMatcher::new(&catalog, args.metric).match_color((*color).into());
            if args.json {
                println!("{}", serde_json::to_string_pretty(&report)?);
            } else {
                println!(
                    "{color}: {} ({}), distance {:.2}",
                    report.shade.code, report.shade.description, report.distance
                );
                if args.verbose {
                    for ranked in &report.shortlist {
                        println!("{color}: candidate {} at {:.2}", ranked.code, ranked.distance);
                    }
                }
            }
        }
        Command::Plan { base, target } => {
            let config = args.session_config(None);
            let session = ShadeSession::new(catalog, config)
                .with_selection(Some(base.as_str()), Some(target.as_str()))?;
            if let Some(result) = session.calculate() {
                print_formulation(&format!("{base} -> {target}"), &result, args.json)?;
            }
        }
        Command::Catalog => {
            if args.json {
                println!("{}", catalog.to_json_string()?);
            } else {
                for shade in catalog.shades() {
                    println!("{:>6}  {}  {}", shade.code, shade.rgb, shade.description);
                }
            }
        }
    }
    Ok(())
}

/// Expand glob patterns, a pattern matching nothing is kept as a plain path
fn expand_file_patterns(patterns: &[String]) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for pattern in patterns {
        let before = files.len();
        for entry in glob::glob(pattern)? {
            files.push(entry?);
        }
        if files.len() == before {
            files.push(PathBuf::from(pattern));
        }
    }
    Ok(files)
}

pub(crate) fn print_formulation(label: &str, result: &FormulationResult, json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(result)?);
        return Ok(());
    }
    println!(
        "{label}: {} levels, {} volume developer, {} minutes, {} undertone",
        result.levels_needed, result.oxidant_volume, result.estimated_minutes, result.undertone
    );
    println!("{label}: {}", result.recommended_products.join(", "));
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn detect_arguments() {
        let args = Args::try_parse_from([
            "shade-match",
            "--metric",
            "lab",
            "detect",
            "before.jpg",
            "--target",
            "9.1",
            "--sample-stride",
            "3",
        ])
        .unwrap();
        assert_eq!(args.metric, DistanceMetric::Lab);
        let Command::Detect(detect) = &args.command else {
            panic!("expected the detect command");
        };
        assert_eq!(detect.target.as_deref(), Some("9.1"));
        let config = args.session_config(Some(detect));
        assert_eq!(config.sampling.stride, 3);
        assert_eq!(config.sampling.max_half_size, 100);
        assert_eq!(config.detection_timeout, Duration::from_secs(10));
        assert_eq!(config.formulator.minutes_per_level, 15);
    }

    #[test]
    fn zero_stride_is_rejected() {
        assert!(
            Args::try_parse_from(["shade-match", "detect", "a.jpg", "--sample-stride", "0"])
                .is_err()
        );
    }

    #[test]
    fn match_parses_colors() {
        let args = Args::try_parse_from(["shade-match", "match", "#0E0E0E"]).unwrap();
        assert!(matches!(
            args.command,
            Command::Match { color } if color == Rgb::new(14, 14, 14)
        ));
    }

    #[test]
    fn unmatched_pattern_is_kept_as_path() {
        let files = expand_file_patterns(&["/nonexistent/*.jpg".to_string()]).unwrap();
        assert_eq!(files, vec![PathBuf::from("/nonexistent/*.jpg")]);
    }
}
