//! Shade selection state for one coloring form
//!
//! A [`ShadeSession`] holds the base and target shades the user picked, runs photo
//! analysis in the background and turns sampling failures into an inline advisory.
//! Manual selection is always possible, whatever the state of photo analysis.

use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender, TryRecvError};
use std::thread;
use std::time::{Duration, Instant};

use serde::Serialize;

use crate::catalog::ShadeCatalog;
use crate::formulation::{FormulationResult, Formulator, ShadeLevel};
use crate::matcher::{DistanceMetric, MatchReport, PaletteMatcher};
use crate::sampler::{self, ColorSample, PhotoSource, SamplingConfig};
use crate::{Error, Result};

pub const DEFAULT_DETECTION_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionConfig {
    pub metric: DistanceMetric,
    pub sampling: SamplingConfig,
    pub formulator: Formulator,
    pub detection_timeout: Duration,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            metric: DistanceMetric::default(),
            sampling: SamplingConfig::default(),
            formulator: Formulator::default(),
            detection_timeout: DEFAULT_DETECTION_TIMEOUT,
        }
    }
}

/// Currently selected shade codes, reported to the host on every change
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ShadeSelection {
    pub base: Option<String>,
    pub target: Option<String>,
}

/// Identifies one photo analysis request, later requests have larger tokens
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RequestToken(u64);

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Detection {
    pub sample: ColorSample,
    #[serde(rename = "match")]
    pub report: MatchReport,
    pub selection: ShadeSelection,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "kebab-case")]
pub enum DetectionOutcome {
    /// The base shade was set from the photo
    Detected(Detection),
    /// Detection failed, the selection was left alone
    Failed { advisory: String, recoverable: bool },
}

struct Completion {
    token: RequestToken,
    result: Result<ColorSample>,
}

pub struct ShadeSession {
    catalog: ShadeCatalog,
    config: SessionConfig,
    selection: ShadeSelection,
    advisory: Option<String>,
    last_token: u64,
    in_flight: Option<RequestToken>,
    sender: Sender<Completion>,
    receiver: Receiver<Completion>,
}

impl ShadeSession {
    pub fn new(catalog: ShadeCatalog, config: SessionConfig) -> Self {
        let (sender, receiver) = mpsc::channel();
        Self {
            catalog,
            config,
            selection: ShadeSelection::default(),
            advisory: None,
            last_token: 0,
            in_flight: None,
            sender,
            receiver,
        }
    }

    /// Start from shades already stored on the form
    pub fn with_selection(mut self, base: Option<&str>, target: Option<&str>) -> Result<Self> {
        if let Some(code) = base {
            self.select_base(code)?;
        }
        if let Some(code) = target {
            self.select_target(code)?;
        }
        Ok(self)
    }

    pub fn catalog(&self) -> &ShadeCatalog {
        &self.catalog
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    pub fn selection(&self) -> &ShadeSelection {
        &self.selection
    }

    pub fn advisory(&self) -> Option<&str> {
        self.advisory.as_deref()
    }

    pub fn is_analyzing(&self) -> bool {
        self.in_flight.is_some()
    }

    /// Manually pick the base shade, superseding any running photo analysis
    pub fn select_base(&mut self, code: &str) -> Result<ShadeSelection> {
        let shade = self.catalog.get(code)?;
        self.selection.base = Some(shade.code.clone());
        self.in_flight = None;
        self.advisory = None;
        Ok(self.selection.clone())
    }

    pub fn select_target(&mut self, code: &str) -> Result<ShadeSelection> {
        let shade = self.catalog.get(code)?;
        self.selection.target = Some(shade.code.clone());
        Ok(self.selection.clone())
    }

    /// Start sampling a photo in the background
    ///
    /// A previous request that has not completed yet is superseded: its result is
    /// dropped when it arrives.
    pub fn analyze_photo(&mut self, source: PhotoSource) -> RequestToken {
        self.last_token += 1;
        let token = RequestToken(self.last_token);
        self.in_flight = Some(token);
        self.advisory = None;
        let sender = self.sender.clone();
        let sampling = self.config.sampling;
        thread::spawn(move || {
            let result = sampler::sample_photo(&source, &sampling);
            // The session may be gone already, nobody is left to tell
            let _ = sender.send(Completion { token, result });
        });
        token
    }

    /// Apply a finished analysis without blocking, `None` while still running
    pub fn poll_detection(&mut self) -> Option<DetectionOutcome> {
        loop {
            match self.receiver.try_recv() {
                Ok(completion) => {
                    if let Some(outcome) = self.complete(completion) {
                        return Some(outcome);
                    }
                }
                Err(TryRecvError::Empty | TryRecvError::Disconnected) => return None,
            }
        }
    }

    /// Block until the current analysis finishes or the configured timeout passes
    ///
    /// Returns `None` when no analysis is running. A timeout becomes a failed outcome
    /// and the late result is ignored.
    pub fn wait_for_detection(&mut self) -> Option<DetectionOutcome> {
        let timeout = self.config.detection_timeout;
        let deadline = Instant::now() + timeout;
        while self.in_flight.is_some() {
            let remaining = deadline.saturating_duration_since(Instant::now());
            match self.receiver.recv_timeout(remaining) {
                Ok(completion) => {
                    if let Some(outcome) = self.complete(completion) {
                        return Some(outcome);
                    }
                }
                Err(RecvTimeoutError::Timeout | RecvTimeoutError::Disconnected) => {
                    self.in_flight = None;
                    return Some(self.fail(Error::DetectionTimeout {
                        seconds: timeout.as_secs(),
                    }));
                }
            }
        }
        None
    }

    /// Analyze a photo and wait for the outcome
    pub fn detect(&mut self, source: PhotoSource) -> DetectionOutcome {
        self.analyze_photo(source);
        self.wait_for_detection().unwrap_or_else(|| {
            self.fail(Error::ImageProcessing {
                reason: "photo analysis was superseded".to_string(),
            })
        })
    }

    /// Compute the lightening plan once both shades are selected
    pub fn calculate(&self) -> Option<FormulationResult> {
        let base = ShadeLevel::from_code(self.selection.base.as_deref()?).ok()?;
        let target = ShadeLevel::from_code(self.selection.target.as_deref()?).ok()?;
        Some(self.config.formulator.plan(base, target))
    }

    pub fn matcher(&self) -> PaletteMatcher<'_> {
        PaletteMatcher::new(&self.catalog, self.config.metric)
    }

    /// Apply a completion, `None` for stale ones
    fn complete(&mut self, completion: Completion) -> Option<DetectionOutcome> {
        if self.in_flight != Some(completion.token) {
            return None;
        }
        self.in_flight = None;
        match completion.result {
            Ok(sample) => {
                let report = self.matcher().match_color(sample.color.into());
                self.selection.base = Some(report.shade.code.clone());
                self.advisory = None;
                Some(DetectionOutcome::Detected(Detection {
                    sample,
                    report,
                    selection: self.selection.clone(),
                }))
            }
            Err(error) => Some(self.fail(error)),
        }
    }

    fn fail(&mut self, error: Error) -> DetectionOutcome {
        let advisory = error.user_message();
        self.advisory = Some(advisory.clone());
        DetectionOutcome::Failed {
            advisory,
            recoverable: error.is_recoverable(),
        }
    }
}
