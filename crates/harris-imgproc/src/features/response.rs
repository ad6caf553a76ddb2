use harris_image::Image;

use super::{HarrisError, StructureTensor};
use crate::filter;

/// Compute the Harris corner response from the second moment matrix.
///
/// Every pixel gets `R = Sxx * Syy - Sxy^2 - alpha * (Sxx + Syy)^2`. Responses
/// that are not finite are replaced by zero, which removes them from every
/// later stage.
///
/// # Arguments
///
/// * `src` - The second moment matrix with shape (H, W, 3), laid out as `[Sxx, Syy, Sxy]`.
/// * `dst` - The destination response map with shape (H, W).
/// * `alpha` - The weight of the squared trace.
///
/// # Returns
///
/// The number of non-finite responses that were replaced by zero.
pub fn harris_response(
    src: &Image<f32, 3>,
    dst: &mut Image<f32, 1>,
    alpha: f32,
) -> Result<usize, HarrisError> {
    filter::ensure_same_size(src.size(), dst.size())?;

    let mut sanitized = 0;
    dst.as_slice_mut()
        .iter_mut()
        .zip(src.as_slice().chunks_exact(3))
        .for_each(|(out, m)| {
            let r = StructureTensor::from_channels([m[0], m[1], m[2]]).response(alpha);
            if r.is_finite() {
                *out = r;
            } else {
                *out = 0.0;
                sanitized += 1;
            }
        });

    if sanitized > 0 {
        log::warn!("replaced {sanitized} non-finite Harris responses with zero");
    }

    Ok(sanitized)
}
