use derive_more::{Display, From};

pub type Result<T> = core::result::Result<T, Error>;

#[derive(Debug, Display, From)]
pub enum Error {
    // -- Sampling
    #[display("failed to load image {source_name}: {reason}")]
    ImageLoad { source_name: String, reason: String },
    #[display("failed to process image: {reason}")]
    ImageProcessing { reason: String },
    #[display("color detection timed out after {seconds} seconds")]
    DetectionTimeout { seconds: u64 },

    // -- Matching
    #[display("invalid color channels: {r}, {g}, {b}")]
    InvalidColorInput { r: f64, g: f64, b: f64 },
    #[display("unknown shade: {code}")]
    UnknownShade { code: String },
    #[display("invalid shade code: {code:?}")]
    InvalidShadeCode { code: String },
    #[display("invalid shade catalog: {reason}")]
    InvalidCatalog { reason: String },

    // -- Externals
    #[from]
    Io(std::io::Error),
    #[from]
    Image(image::error::ImageError),
    #[from]
    Png(png::EncodingError),
    #[from]
    Json(serde_json::Error),
    #[from]
    Pattern(glob::PatternError),
    #[from]
    Glob(glob::GlobError),
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Io(e) => Some(e),
            Error::Image(e) => Some(e),
            Error::Png(e) => Some(e),
            Error::Json(e) => Some(e),
            Error::Pattern(e) => Some(e),
            Error::Glob(e) => Some(e),
            _ => None,
        }
    }
}

impl Error {
    /// Create an image load error for the named photo source
    pub(crate) fn image_load(source_name: impl Into<String>, reason: impl ToString) -> Self {
        Error::ImageLoad {
            source_name: source_name.into(),
            reason: reason.to_string(),
        }
    }

    /// Whether manual shade selection can continue after this error
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            Error::ImageLoad { .. }
                | Error::ImageProcessing { .. }
                | Error::DetectionTimeout { .. }
                | Error::InvalidColorInput { .. }
        )
    }

    /// Short advisory suitable for showing inline next to the shade selectors
    pub fn user_message(&self) -> String {
        match self {
            Error::ImageLoad { .. } => {
                "Could not load the photo. Please select the base shade manually.".to_string()
            }
            Error::ImageProcessing { .. } => {
                "Could not read a color from the photo. Please select the base shade manually."
                    .to_string()
            }
            Error::DetectionTimeout { seconds } => format!(
                "Photo analysis took longer than {seconds} seconds. Please select the base shade manually."
            ),
            Error::InvalidColorInput { .. } => {
                "The detected color was invalid. Please select the base shade manually.".to_string()
            }
            Error::UnknownShade { code } => format!("Shade {code} is not in the catalog."),
            _ => "Shade detection failed. Please select the base shade manually.".to_string(),
        }
    }
}
