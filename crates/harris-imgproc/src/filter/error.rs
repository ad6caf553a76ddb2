use harris_image::ImageError;

use crate::parallel::ParallelError;

/// Errors raised while building kernels or applying filters.
#[derive(Debug, thiserror::Error, PartialEq)]
pub enum FilterError {
    /// The kernel side length is even or zero.
    #[error("Kernel size must be odd and positive, got {0}")]
    InvalidKernelSize(usize),

    /// The kernel data length does not match the side length.
    #[error("Kernel data length ({0}) does not match the kernel size ({1})")]
    InvalidKernelLength(usize, usize),

    /// The Gaussian standard deviation is not a positive finite number.
    #[error("Gaussian sigma must be finite and positive, got {0}")]
    InvalidSigma(f32),

    /// The kernel weights cannot be scaled to sum to one.
    #[error("Kernel weights sum to {0} and cannot be normalized")]
    DegenerateKernel(f32),

    /// Error related to image.
    #[error(transparent)]
    ImageError(#[from] ImageError),

    /// Error related to parallel execution.
    #[error(transparent)]
    ParallelError(#[from] ParallelError),
}
