//! Feature detection and keypoint extraction.
//!
//! This module implements the Harris corner detector as a chain of stages,
//! each a plain function from the previous stage's output:
//!
//! 1. [`image_gradients`]: Sobel derivatives `[Ix, Iy]`.
//! 2. [`channel_products`]: per-pixel outer product `[Ixx, Iyy, Ixy]`.
//! 3. [`second_moment_matrix`]: Gaussian-weighted local sums `[Sxx, Syy, Sxy]`.
//! 4. [`harris_response`]: `R = det(M) - alpha * trace(M)^2`.
//! 5. [`non_max_suppression`]: median threshold and local-maximum selection.
//! 6. [`extract_interest_points`]: ranked, border-pruned point list.
//!
//! [`HarrisDetector`] owns the configuration and the kernels and runs the
//! whole chain.
//!
//! # Examples
//!
//! Detecting the corner points of a bright square.
//!
//! ```
//! use harris_image::Image;
//! use harris_imgproc::features::{HarrisConfig, HarrisDetector};
//!
//! let mut image = Image::<f32, 1>::from_size_val([64, 64].into(), 0.0).unwrap();
//! for y in 30..35 {
//!     for x in 30..35 {
//!         image.as_slice_mut()[y * 64 + x] = 1.0;
//!     }
//! }
//!
//! let detector = HarrisDetector::new(HarrisConfig::default()).unwrap();
//! let points = detector.detect(&image).unwrap();
//!
//! assert_eq!(points.len(), 1);
//! assert_eq!((points[0].x, points[0].y), (32, 32));
//! ```

mod config;
pub use config::*;

mod error;
pub use error::HarrisError;

mod harris;
pub use harris::*;

mod interest_points;
pub use interest_points::*;

mod nms;
pub use nms::*;

mod response;
pub use response::*;

mod structure_tensor;
pub use structure_tensor::*;
