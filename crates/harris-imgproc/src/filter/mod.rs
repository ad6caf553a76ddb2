//! Filter operations
//!
//! Same-size 2D filters on [`Image`](harris_image::Image) buffers: kernel
//! construction, correlation with a [`Kernel2d`] and sliding-window maximum.

mod error;
pub use error::FilterError;

/// Filter kernels
pub mod kernels;
pub use kernels::{DefaultKernelProvider, Kernel2d, KernelProvider};

/// Filter operations
mod ops;
pub(crate) use ops::{correlate_at, ensure_same_size};
pub use ops::filter2d;

/// Max pooling operations
mod pool;
pub use pool::*;
