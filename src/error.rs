//! Error types for trueno-treeviz operations.

use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Result type alias using [`Error`].
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while rendering a decision tree.
///
/// Every variant is fatal for the render call that produced it; no partial
/// document is ever returned.
#[derive(Error, Debug)]
pub enum Error {
    /// The model has no usable tree structure (not fitted, or malformed).
    #[error("Invalid model: {0}")]
    InvalidModel(String),

    /// Two inputs that must agree in size do not.
    #[error("Shape mismatch for {what}: expected {expected}, got {actual}")]
    ShapeMismatch {
        /// Which quantity disagreed (e.g. "target rows").
        what: &'static str,
        /// Size implied by the reference input.
        expected: usize,
        /// Size actually supplied.
        actual: usize,
    },

    /// The classifier has more classes than the calibration tables cover.
    #[error("Unsupported class count: {0} (supported: 2..=10)")]
    UnsupportedClassCount(usize),

    /// The traced instance vector does not have one value per feature.
    #[error("Instance vector has {actual} values, model expects {expected} features")]
    TraceVectorLengthMismatch {
        /// Number of model features.
        expected: usize,
        /// Length of the supplied vector.
        actual: usize,
    },

    /// Empty training data provided.
    #[error("Empty training data provided")]
    EmptyData,

    /// A classifier target is not an integral class label.
    #[error("Invalid class label {value} at target row {index}")]
    InvalidTarget {
        /// Row index of the offending target.
        index: usize,
        /// The target value.
        value: f32,
    },

    /// No display name is available for a class label.
    #[error("Missing class name for class {0}")]
    MissingClassName(i64),

    /// I/O error while writing or reading node artifacts.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// An artifact's SVG header could not be parsed for its dimensions.
    #[error("Unreadable artifact metadata in {}: {reason}", path.display())]
    ArtifactMetadata {
        /// Artifact file.
        path: PathBuf,
        /// What was missing or malformed.
        reason: String,
    },

    /// Render configuration could not be parsed.
    #[error("Configuration error at line {line}: {message}")]
    ConfigParse {
        /// Line number where the error occurred (1-indexed, 0 if unknown).
        line: usize,
        /// Parser message.
        message: String,
    },
}
