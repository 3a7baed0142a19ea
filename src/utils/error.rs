//! Error taxonomy for the conversion pipeline and format writers.
//!
//! One variant per failure kind recognized by the pipeline; each carries a
//! message and, where it occurred inside the orchestrator, the stage name
//! that was running. The orchestrator wraps any error surfacing from a
//! non-taxonomy source as [`Error::EncodingFailure`] with the stage name
//! attached and the original error as its cause.

use thiserror::Error;

/// Main error type for the conversion pipeline and format writers.
#[derive(Error, Debug)]
pub enum Error {
    /// Missing or malformed image data or settings.
    #[error("invalid input: {message}")]
    InvalidInput {
        /// Description of what was invalid.
        message: String,
        /// Stage in which this was detected, if known.
        stage: Option<String>,
    },

    /// Edge detection produced no edges, or too few to proceed.
    #[error("insufficient edges: {message}")]
    InsufficientEdges {
        /// Description of the shortfall.
        message: String,
        /// Stage in which this was detected, if known.
        stage: Option<String>,
    },

    /// More than half of the interior pixels were classified as edges.
    #[error("too many edges: {message}")]
    TooManyEdges {
        /// Description of the excess.
        message: String,
        /// Stage in which this was detected, if known.
        stage: Option<String>,
    },

    /// Contour tracing returned no contours.
    #[error("no contours: {message}")]
    NoContours {
        /// Description of the failure.
        message: String,
        /// Stage in which this was detected, if known.
        stage: Option<String>,
    },

    /// Optimized pattern has fewer than the minimum required stitches.
    #[error("insufficient stitches: {message}")]
    InsufficientStitches {
        /// Description of the shortfall.
        message: String,
        /// Stage in which this was detected, if known.
        stage: Option<String>,
    },

    /// A NaN or infinite coordinate was detected.
    #[error("invalid coordinates: {message}")]
    InvalidCoordinates {
        /// Description of the offending coordinate.
        message: String,
        /// Stage in which this was detected, if known.
        stage: Option<String>,
    },

    /// Pattern exceeds a target format's stitch/color/dimension ceiling.
    #[error("format limit exceeded: {message}")]
    FormatLimit {
        /// Description of which limit was exceeded.
        message: String,
        /// Stage in which this was detected, if known.
        stage: Option<String>,
    },

    /// Internal failure inside a writer, or any non-taxonomy error wrapped
    /// by the orchestrator.
    #[error("encoding failure: {message}")]
    EncodingFailure {
        /// Description of the failure.
        message: String,
        /// Stage in which this was detected, if known.
        stage: Option<String>,
        /// Underlying cause, if any.
        #[source]
        cause: Option<Box<dyn std::error::Error + Send + Sync + 'static>>,
    },

    /// Cooperative cancellation was requested and honored at a stage
    /// boundary.
    #[error("cancelled{}", stage.as_deref().map(|s| format!(" during {s}")).unwrap_or_default())]
    Cancelled {
        /// Stage in which cancellation was observed, if known.
        stage: Option<String>,
    },
}

impl Error {
    /// Build an [`Error::InvalidInput`] with no stage attached.
    pub fn invalid_input(message: impl Into<String>) -> Self {
        Error::InvalidInput { message: message.into(), stage: None }
    }

    /// Build an [`Error::InsufficientEdges`] with no stage attached.
    pub fn insufficient_edges(message: impl Into<String>) -> Self {
        Error::InsufficientEdges { message: message.into(), stage: None }
    }

    /// Build an [`Error::TooManyEdges`] with no stage attached.
    pub fn too_many_edges(message: impl Into<String>) -> Self {
        Error::TooManyEdges { message: message.into(), stage: None }
    }

    /// Build an [`Error::NoContours`] with no stage attached.
    pub fn no_contours(message: impl Into<String>) -> Self {
        Error::NoContours { message: message.into(), stage: None }
    }

    /// Build an [`Error::InsufficientStitches`] with no stage attached.
    pub fn insufficient_stitches(message: impl Into<String>) -> Self {
        Error::InsufficientStitches { message: message.into(), stage: None }
    }

    /// Build an [`Error::InvalidCoordinates`] with no stage attached.
    pub fn invalid_coordinates(message: impl Into<String>) -> Self {
        Error::InvalidCoordinates { message: message.into(), stage: None }
    }

    /// Build an [`Error::FormatLimit`] with no stage attached.
    pub fn format_limit(message: impl Into<String>) -> Self {
        Error::FormatLimit { message: message.into(), stage: None }
    }

    /// Build an [`Error::EncodingFailure`] with no cause or stage attached.
    pub fn encoding_failure(message: impl Into<String>) -> Self {
        Error::EncodingFailure { message: message.into(), stage: None, cause: None }
    }

    /// Annotate this error with the orchestrator stage it occurred in,
    /// wrapping it as [`Error::EncodingFailure`] if it isn't already one of
    /// the taxonomy's stage-bearing variants.
    pub fn with_stage(self, stage: impl Into<String>) -> Self {
        let stage = Some(stage.into());
        match self {
            Error::InvalidInput { message, .. } => Error::InvalidInput { message, stage },
            Error::InsufficientEdges { message, .. } => Error::InsufficientEdges { message, stage },
            Error::TooManyEdges { message, .. } => Error::TooManyEdges { message, stage },
            Error::NoContours { message, .. } => Error::NoContours { message, stage },
            Error::InsufficientStitches { message, .. } => Error::InsufficientStitches { message, stage },
            Error::InvalidCoordinates { message, .. } => Error::InvalidCoordinates { message, stage },
            Error::FormatLimit { message, .. } => Error::FormatLimit { message, stage },
            Error::EncodingFailure { message, cause, .. } => Error::EncodingFailure { message, stage, cause },
            Error::Cancelled { .. } => Error::Cancelled { stage },
        }
    }
}

impl From<std::io::Error> for Error {
    fn from(e: std::io::Error) -> Self {
        Error::EncodingFailure {
            message: e.to_string(),
            stage: None,
            cause: Some(Box::new(e)),
        }
    }
}

/// Result type alias for pipeline and writer operations.
pub type Result<T> = std::result::Result<T, Error>;
