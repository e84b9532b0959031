use std::path::PathBuf;

use image::Rgba;

use crate::io::ImageSaver;
use crate::sampler::{self, PhotoSource};
use crate::session::{Detection, DetectionOutcome, ShadeSession};
use crate::{Args, DetectArgs, Result, drawing};

/// Runs shade detection for a single photo and reports the outcome on stdout
pub(crate) struct PhotoAnalyzer {
    file: PathBuf,
    saver: ImageSaver,
    outline_color: Rgba<u8>,
    outline_thickness: u32,
    json: bool,
    verbose: bool,
}

impl PhotoAnalyzer {
    pub(crate) fn new(file: PathBuf, args: &Args, detect: &DetectArgs) -> Self {
        let saver = ImageSaver::new(&file, detect.save_intermediary_images);
        Self {
            file,
            saver,
            outline_color: Rgba([255, 0, 255, 255]), // magenta
            outline_thickness: 2,
            json: args.json,
            verbose: args.verbose,
        }
    }

    pub(crate) fn process(self, session: &mut ShadeSession) -> Result<()> {
        let outcome = session.detect(PhotoSource::Path(self.file.clone()));
        if self.json {
            println!("{}", serde_json::to_string_pretty(&outcome)?);
        }
        match &outcome {
            DetectionOutcome::Detected(detection) => {
                if !self.json {
                    self.report_detection(detection);
                }
                self.save_intermediary_images(detection)?;
            }
            DetectionOutcome::Failed { advisory, .. } => {
                if !self.json {
                    println!("{}: {advisory}", self.file.display());
                }
                // Nothing more to do without a base shade
                return Ok(());
            }
        }
        if let Some(result) = session.calculate() {
            let selection = session.selection();
            let label = format!(
                "{}: {} -> {}",
                self.file.display(),
                selection.base.as_deref().unwrap_or_default(),
                selection.target.as_deref().unwrap_or_default()
            );
            crate::print_formulation(&label, &result, self.json)?;
        }
        Ok(())
    }

    fn report_detection(&self, detection: &Detection) {
        let sample = &detection.sample;
        let report = &detection.report;
        if self.verbose {
            println!(
                "{}: sampled {} from {} pixels around {}x{}",
                self.file.display(),
                sample.color,
                sample.sample_count,
                sample.window.center_x,
                sample.window.center_y
            );
            for ranked in &report.shortlist {
                println!(
                    "{}: candidate {} at {:.2}",
                    self.file.display(),
                    ranked.code,
                    ranked.distance
                );
            }
        }
        println!(
            "{}: detected shade {} ({}), distance {:.2}",
            self.file.display(),
            report.shade.code,
            report.shade.description,
            report.distance
        );
    }

    /// Outline of the sampling window on the photo, and a sampled/matched swatch
    fn save_intermediary_images(&self, detection: &Detection) -> Result<()> {
        if !self.saver.is_debugging() {
            return Ok(());
        }
        let photo = sampler::load_photo(&PhotoSource::Path(self.file.clone()))?;
        let mut photo = photo.to_rgba8();
        drawing::draw_sampling_window(
            &mut photo,
            &detection.sample.window,
            self.outline_color,
            self.outline_thickness,
        );
        let path = self.saver.save_rgba_image_as(&photo, "a-sample-window")?;
        println!("{}: saved", path.display());
        let swatch = drawing::draw_swatch(detection.sample.color, detection.report.shade.rgb);
        let path = self.saver.save_rgba_image_as(&swatch, "b-swatch")?;
        println!("{}: saved", path.display());
        Ok(())
    }
}
