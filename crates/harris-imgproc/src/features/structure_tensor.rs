use harris_image::Image;

use super::HarrisError;
use crate::filter::{self, Kernel2d};
use crate::padding::PaddingMode;
use crate::parallel::{self, ExecutionStrategy};

/// The symmetric 2x2 structure tensor `[[xx, xy], [xy, yy]]` of one pixel.
///
/// The channel layout used across the pipeline is `[xx, yy, xy]`.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct StructureTensor {
    /// Squared horizontal derivative.
    pub xx: f32,
    /// Squared vertical derivative.
    pub yy: f32,
    /// Product of the two derivatives.
    pub xy: f32,
}

impl StructureTensor {
    /// The outer product of the gradient `(ix, iy)` with itself.
    #[inline]
    pub fn from_gradient(ix: f32, iy: f32) -> Self {
        Self {
            xx: ix * ix,
            yy: iy * iy,
            xy: ix * iy,
        }
    }

    /// Read a tensor from a pixel laid out as `[xx, yy, xy]`.
    #[inline]
    pub fn from_channels(pixel: [f32; 3]) -> Self {
        let [xx, yy, xy] = pixel;
        Self { xx, yy, xy }
    }

    /// The `[xx, yy, xy]` channel layout of the tensor.
    #[inline]
    pub fn to_channels(self) -> [f32; 3] {
        [self.xx, self.yy, self.xy]
    }

    /// The determinant `xx * yy - xy^2`.
    #[inline]
    pub fn det(&self) -> f32 {
        self.xx * self.yy - self.xy * self.xy
    }

    /// The trace `xx + yy`.
    #[inline]
    pub fn trace(&self) -> f32 {
        self.xx + self.yy
    }

    /// The Harris corner measure `det - alpha * trace^2`.
    ///
    /// # Examples
    ///
    /// ```
    /// use harris_imgproc::features::StructureTensor;
    ///
    /// let m = StructureTensor { xx: 2.0, yy: 3.0, xy: 1.0 };
    /// assert_eq!(m.response(0.25), 5.0 - 0.25 * 25.0);
    /// ```
    #[inline]
    pub fn response(&self, alpha: f32) -> f32 {
        let trace = self.trace();
        self.det() - alpha * trace * trace
    }
}

/// Compute the Sobel derivatives of a grayscale image.
///
/// # Arguments
///
/// * `src` - The source image with shape (H, W).
/// * `dst` - The destination image with shape (H, W, 2), written as `[Ix, Iy]`.
/// * `sobel_x` - The horizontal derivative kernel.
/// * `sobel_y` - The vertical derivative kernel.
/// * `padding` - The border mode.
/// * `strategy` - The execution strategy.
pub fn image_gradients(
    src: &Image<f32, 1>,
    dst: &mut Image<f32, 2>,
    sobel_x: &Kernel2d,
    sobel_y: &Kernel2d,
    padding: PaddingMode,
    strategy: ExecutionStrategy,
) -> Result<(), HarrisError> {
    filter::ensure_same_size(src.size(), dst.size())?;

    let size = src.size();
    let src_data = src.as_slice();

    parallel::for_each_row(strategy, dst.as_slice_mut(), size.width * 2, |r, dst_row| {
        for (c, dst_pixel) in dst_row.chunks_exact_mut(2).enumerate() {
            let [ix] = filter::correlate_at::<1>(src_data, size, sobel_x, padding, r, c);
            let [iy] = filter::correlate_at::<1>(src_data, size, sobel_y, padding, r, c);
            dst_pixel[0] = ix;
            dst_pixel[1] = iy;
        }
    })?;

    Ok(())
}

/// Compute the per-pixel products of the image derivatives.
///
/// # Arguments
///
/// * `src` - The gradient image with shape (H, W, 2), laid out as `[Ix, Iy]`.
/// * `dst` - The destination image with shape (H, W, 3), written as `[Ixx, Iyy, Ixy]`.
pub fn channel_products(src: &Image<f32, 2>, dst: &mut Image<f32, 3>) -> Result<(), HarrisError> {
    filter::ensure_same_size(src.size(), dst.size())?;

    dst.as_slice_mut()
        .chunks_exact_mut(3)
        .zip(src.as_slice().chunks_exact(2))
        .for_each(|(out, grad)| {
            out.copy_from_slice(&StructureTensor::from_gradient(grad[0], grad[1]).to_channels());
        });

    Ok(())
}

/// Smooth the derivative products into the second moment matrix.
///
/// # Arguments
///
/// * `src` - The product image with shape (H, W, 3), laid out as `[Ixx, Iyy, Ixy]`.
/// * `dst` - The destination image with shape (H, W, 3), written as `[Sxx, Syy, Sxy]`.
/// * `gaussian` - The smoothing window.
/// * `padding` - The border mode.
/// * `strategy` - The execution strategy.
pub fn second_moment_matrix(
    src: &Image<f32, 3>,
    dst: &mut Image<f32, 3>,
    gaussian: &Kernel2d,
    padding: PaddingMode,
    strategy: ExecutionStrategy,
) -> Result<(), HarrisError> {
    filter::filter2d(src, dst, gaussian, padding, strategy)?;
    Ok(())
}
