use harris_image::ImageError;

use crate::filter::FilterError;
use crate::parallel::ParallelError;

/// Errors that can occur when detecting Harris corners.
#[derive(Debug, thiserror::Error, PartialEq)]
pub enum HarrisError {
    /// The input is not a non-empty single-channel 2D image.
    #[error("Invalid input shape {0:?}, expected a non-empty single-channel (H, W) image")]
    InvalidShape(Vec<usize>),

    /// A configuration value is out of its valid range.
    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),

    /// Error related to filtering.
    #[error(transparent)]
    FilterError(#[from] FilterError),

    /// Error related to image.
    #[error(transparent)]
    ImageError(#[from] ImageError),

    /// Error related to parallel execution.
    #[error(transparent)]
    ParallelError(#[from] ParallelError),
}
