use harris_image::Image;

use super::{ops::ensure_same_size, FilterError};
use crate::parallel::{self, ExecutionStrategy};

/// Sliding-window maximum with stride one, keeping the image size.
///
/// Every output pixel holds the maximum of the `window_size x window_size`
/// neighbourhood centered on it. Samples outside the image are treated as
/// negative infinity, so the border never wins the comparison. The window is
/// evaluated as a horizontal pass followed by a vertical pass, which yields
/// exactly the same values as the square window.
///
/// # Arguments
///
/// * `src` - The source image with shape (H, W).
/// * `dst` - The destination image with shape (H, W).
/// * `window_size` - The side of the window. Must be odd.
/// * `strategy` - The execution strategy.
///
/// # Examples
///
/// ```
/// use harris_image::Image;
/// use harris_imgproc::filter::max_pool2d;
/// use harris_imgproc::parallel::ExecutionStrategy;
///
/// let src = Image::<f32, 1>::new([4, 1].into(), vec![1.0, -3.0, 0.5, 2.0]).unwrap();
/// let mut dst = Image::<f32, 1>::from_size_val(src.size(), 0.0).unwrap();
///
/// max_pool2d(&src, &mut dst, 3, ExecutionStrategy::Serial).unwrap();
/// assert_eq!(dst.as_slice(), &[1.0, 1.0, 2.0, 2.0]);
/// ```
pub fn max_pool2d(
    src: &Image<f32, 1>,
    dst: &mut Image<f32, 1>,
    window_size: usize,
    strategy: ExecutionStrategy,
) -> Result<(), FilterError> {
    if window_size % 2 == 0 {
        return Err(FilterError::InvalidKernelSize(window_size));
    }
    ensure_same_size(src.size(), dst.size())?;

    let (rows, cols) = (src.rows(), src.cols());
    let half = window_size / 2;
    let src_data = src.as_slice();

    // horizontal pass
    let mut temp = vec![f32::NEG_INFINITY; src_data.len()];
    parallel::for_each_row(strategy, &mut temp, cols, |r, temp_row| {
        let src_row = &src_data[r * cols..(r + 1) * cols];
        for (c, out) in temp_row.iter_mut().enumerate() {
            let lo = c.saturating_sub(half);
            let hi = (c + half).min(cols - 1);
            *out = src_row[lo..=hi]
                .iter()
                .fold(f32::NEG_INFINITY, |acc, &v| acc.max(v));
        }
    })?;

    // vertical pass
    parallel::for_each_row(strategy, dst.as_slice_mut(), cols, |r, dst_row| {
        let lo = r.saturating_sub(half);
        let hi = (r + half).min(rows - 1);
        for (c, out) in dst_row.iter_mut().enumerate() {
            *out = (lo..=hi)
                .map(|y| temp[y * cols + c])
                .fold(f32::NEG_INFINITY, f32::max);
        }
    })?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use harris_image::ImageSize;

    /// Direct square-window evaluation used as a reference.
    fn max_pool_naive(src: &Image<f32, 1>, window_size: usize) -> Vec<f32> {
        let (rows, cols) = (src.rows() as isize, src.cols() as isize);
        let half = (window_size / 2) as isize;
        let mut out = Vec::with_capacity(src.as_slice().len());
        for r in 0..rows {
            for c in 0..cols {
                let mut m = f32::NEG_INFINITY;
                for y in (r - half).max(0)..=(r + half).min(rows - 1) {
                    for x in (c - half).max(0)..=(c + half).min(cols - 1) {
                        m = m.max(src.as_slice()[(y * cols + x) as usize]);
                    }
                }
                out.push(m);
            }
        }
        out
    }

    #[test]
    fn test_max_pool_matches_square_window() -> Result<(), FilterError> {
        let size = ImageSize {
            width: 13,
            height: 9,
        };
        let src = Image::<f32, 1>::new(
            size,
            (0..size.area())
                .map(|i| ((i * 7919) % 97) as f32 - 48.0)
                .collect(),
        )?;

        for window_size in [1, 3, 7] {
            for strategy in [ExecutionStrategy::Serial, ExecutionStrategy::ParallelRows] {
                let mut dst = Image::<f32, 1>::from_size_val(size, 0.0)?;
                max_pool2d(&src, &mut dst, window_size, strategy)?;
                assert_eq!(dst.as_slice(), max_pool_naive(&src, window_size).as_slice());
            }
        }

        Ok(())
    }

    #[test]
    fn test_max_pool_negative_border() -> Result<(), FilterError> {
        // an all-negative map keeps its values at the border: padding never wins
        let src = Image::<f32, 1>::from_size_val([5, 5].into(), -2.0)?;
        let mut dst = Image::<f32, 1>::from_size_val(src.size(), 0.0)?;
        max_pool2d(&src, &mut dst, 7, ExecutionStrategy::Serial)?;
        assert_eq!(dst.as_slice(), &[-2.0; 25]);
        Ok(())
    }

    #[test]
    fn test_max_pool_even_window() -> Result<(), FilterError> {
        let src = Image::<f32, 1>::from_size_val([3, 3].into(), 0.0)?;
        let mut dst = src.clone();
        assert_eq!(
            max_pool2d(&src, &mut dst, 4, ExecutionStrategy::Serial),
            Err(FilterError::InvalidKernelSize(4))
        );
        Ok(())
    }
}
