use harris_image::{Image, ImageError, ImageSize};

use super::{FilterError, Kernel2d};
use crate::padding::PaddingMode;
use crate::parallel::{self, ExecutionStrategy};

/// Check that a destination buffer matches the size of its source.
pub(crate) fn ensure_same_size(src: ImageSize, dst: ImageSize) -> Result<(), ImageError> {
    if src != dst {
        return Err(ImageError::InvalidImageSize(
            src.width, src.height, dst.width, dst.height,
        ));
    }
    Ok(())
}

/// Correlate the kernel with every channel of the pixel at `(row, col)`.
///
/// The accumulation order is fixed (kernel rows, then kernel columns), which
/// keeps the result independent of how rows are scheduled.
#[inline]
pub(crate) fn correlate_at<const C: usize>(
    src: &[f32],
    size: ImageSize,
    kernel: &Kernel2d,
    padding: PaddingMode,
    row: usize,
    col: usize,
) -> [f32; C] {
    let (rows, cols) = (size.height, size.width);
    let ksize = kernel.size();
    let radius = kernel.radius() as isize;
    let mut acc = [0.0f32; C];

    for (ky, kernel_row) in kernel.weights().chunks_exact(ksize).enumerate() {
        let Some(y) = padding.map_index(row as isize + ky as isize - radius, rows) else {
            continue;
        };
        let src_row = &src[y * cols * C..(y + 1) * cols * C];
        for (kx, &w) in kernel_row.iter().enumerate() {
            let Some(x) = padding.map_index(col as isize + kx as isize - radius, cols) else {
                continue;
            };
            let pixel = &src_row[x * C..(x + 1) * C];
            for (a, &v) in acc.iter_mut().zip(pixel.iter()) {
                *a += v * w;
            }
        }
    }

    acc
}

/// Correlate an image with a 2D kernel, keeping the image size.
///
/// Each channel is filtered independently with the same kernel. Samples
/// outside the image are resolved with `padding`, with a padding radius equal
/// to the kernel radius.
///
/// # Arguments
///
/// * `src` - The source image with shape (H, W, C).
/// * `dst` - The destination image with shape (H, W, C).
/// * `kernel` - The square kernel.
/// * `padding` - The border mode.
/// * `strategy` - The execution strategy.
///
/// PRECONDITION: `src` and `dst` must have the same shape.
///
/// # Examples
///
/// ```
/// use harris_image::Image;
/// use harris_imgproc::filter::{filter2d, Kernel2d};
/// use harris_imgproc::padding::PaddingMode;
/// use harris_imgproc::parallel::ExecutionStrategy;
///
/// let src = Image::<f32, 1>::new([3, 1].into(), vec![1.0, 2.0, 3.0]).unwrap();
/// let mut dst = Image::<f32, 1>::from_size_val(src.size(), 0.0).unwrap();
/// let kernel = Kernel2d::new(3, vec![0.0, 0.0, 0.0, 1.0, 0.0, 1.0, 0.0, 0.0, 0.0]).unwrap();
///
/// filter2d(&src, &mut dst, &kernel, PaddingMode::Constant, ExecutionStrategy::Serial).unwrap();
/// assert_eq!(dst.as_slice(), &[2.0, 4.0, 2.0]);
/// ```
pub fn filter2d<const C: usize>(
    src: &Image<f32, C>,
    dst: &mut Image<f32, C>,
    kernel: &Kernel2d,
    padding: PaddingMode,
    strategy: ExecutionStrategy,
) -> Result<(), FilterError> {
    ensure_same_size(src.size(), dst.size())?;

    let size = src.size();
    let src_data = src.as_slice();

    parallel::for_each_row(strategy, dst.as_slice_mut(), size.width * C, |r, dst_row| {
        for (c, dst_pixel) in dst_row.chunks_exact_mut(C).enumerate() {
            let acc = correlate_at::<C>(src_data, size, kernel, padding, r, c);
            dst_pixel.copy_from_slice(&acc);
        }
    })?;

    Ok(())
}
