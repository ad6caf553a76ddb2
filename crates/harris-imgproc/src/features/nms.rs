use harris_image::Image;

use super::HarrisError;
use crate::filter::{self, max_pool2d};
use crate::parallel::ExecutionStrategy;

/// The lower median of a set of values.
///
/// For an even number of values this is the smaller of the two middle values.
/// Returns `None` for an empty slice.
///
/// # Examples
///
/// ```
/// use harris_imgproc::features::median;
///
/// assert_eq!(median(&[3.0, 1.0, 2.0]), Some(2.0));
/// assert_eq!(median(&[4.0, 1.0, 3.0, 2.0]), Some(2.0));
/// assert_eq!(median(&[]), None);
/// ```
pub fn median(values: &[f32]) -> Option<f32> {
    if values.is_empty() {
        return None;
    }
    let mut values = values.to_vec();
    let mid = (values.len() - 1) / 2;
    let (_, m, _) = values.select_nth_unstable_by(mid, f32::total_cmp);
    Some(*m)
}

/// Zero every value that is not strictly above `threshold`.
///
/// # Arguments
///
/// * `src` - The source map with shape (H, W).
/// * `dst` - The destination map with shape (H, W).
/// * `threshold` - Values must be strictly greater to survive.
pub fn threshold_above(
    src: &Image<f32, 1>,
    dst: &mut Image<f32, 1>,
    threshold: f32,
) -> Result<(), HarrisError> {
    filter::ensure_same_size(src.size(), dst.size())?;

    dst.as_slice_mut()
        .iter_mut()
        .zip(src.as_slice())
        .for_each(|(out, &v)| *out = if v > threshold { v } else { 0.0 });

    Ok(())
}

/// Keep only the local maxima of a corner response map.
///
/// The map is first thresholded at its median, then compared with its
/// `window_size x window_size` sliding maximum. A pixel keeps its original
/// response if its thresholded value is non-zero and equal to the local
/// maximum; every other pixel becomes zero. Equal neighbours on a plateau all
/// survive.
///
/// # Arguments
///
/// * `response` - The corner response map with shape (H, W).
/// * `dst` - The suppressed map with shape (H, W).
/// * `window_size` - The side of the comparison window. Must be odd.
/// * `strategy` - The execution strategy of the sliding maximum.
///
/// # Returns
///
/// The number of surviving non-zero pixels.
pub fn non_max_suppression(
    response: &Image<f32, 1>,
    dst: &mut Image<f32, 1>,
    window_size: usize,
    strategy: ExecutionStrategy,
) -> Result<usize, HarrisError> {
    filter::ensure_same_size(response.size(), dst.size())?;

    let Some(median) = median(response.as_slice()) else {
        return Ok(0);
    };
    if !median.is_finite() {
        log::warn!("response median is {median}, suppressing every pixel");
        dst.as_slice_mut().fill(0.0);
        return Ok(0);
    }
    log::debug!("response median: {median}");

    let mut thresholded = Image::from_size_val(response.size(), 0.0)?;
    threshold_above(response, &mut thresholded, median)?;

    let mut local_max = Image::from_size_val(response.size(), 0.0)?;
    max_pool2d(&thresholded, &mut local_max, window_size, strategy)?;

    let mut kept = 0;
    dst.as_slice_mut()
        .iter_mut()
        .zip(response.as_slice())
        .zip(thresholded.as_slice().iter().zip(local_max.as_slice()))
        .for_each(|((out, &r), (&t, &m))| {
            if t != 0.0 && t == m {
                *out = r;
                kept += 1;
            } else {
                *out = 0.0;
            }
        });

    log::debug!("non-maximum suppression kept {kept} pixels");

    Ok(kept)
}

#[cfg(test)]
mod tests {
    use super::*;
    use harris_image::ImageSize;

    #[test]
    fn test_median() {
        assert_eq!(median(&[5.0]), Some(5.0));
        assert_eq!(median(&[0.0, 0.0, 0.0, 1.0]), Some(0.0));
        assert_eq!(median(&[-1.0, 7.0, 2.0, -4.0, 3.0]), Some(2.0));
        assert_eq!(median(&[f32::NAN, 1.0, 2.0]), Some(2.0));
    }

    #[test]
    fn test_threshold_above() -> Result<(), HarrisError> {
        let src = Image::<f32, 1>::new([4, 1].into(), vec![1.0, 2.0, 3.0, -5.0])?;
        let mut dst = Image::<f32, 1>::from_size_val(src.size(), 9.0)?;
        threshold_above(&src, &mut dst, 2.0)?;
        assert_eq!(dst.as_slice(), &[0.0, 0.0, 3.0, 0.0]);
        Ok(())
    }

    #[test]
    fn test_non_max_suppression_single_peak() -> Result<(), HarrisError> {
        let size = ImageSize {
            width: 9,
            height: 9,
        };
        let mut response = Image::<f32, 1>::from_size_val(size, 0.0)?;
        response.as_slice_mut()[4 * 9 + 4] = 3.0;
        response.as_slice_mut()[4 * 9 + 5] = 2.0;
        response.as_slice_mut()[0] = -1.0;

        let mut dst = Image::<f32, 1>::from_size_val(size, 0.0)?;
        let kept = non_max_suppression(&response, &mut dst, 7, ExecutionStrategy::Serial)?;

        assert_eq!(kept, 1);
        let mut expected = vec![0.0; 81];
        expected[4 * 9 + 4] = 3.0;
        assert_eq!(dst.as_slice(), expected.as_slice());
        Ok(())
    }

    #[test]
    fn test_non_max_suppression_separated_peaks() -> Result<(), HarrisError> {
        let size = ImageSize {
            width: 20,
            height: 5,
        };
        let mut response = Image::<f32, 1>::from_size_val(size, 0.0)?;
        response.as_slice_mut()[2 * 20 + 2] = 1.0;
        response.as_slice_mut()[2 * 20 + 12] = 0.5;

        let mut dst = Image::<f32, 1>::from_size_val(size, 0.0)?;
        let kept = non_max_suppression(&response, &mut dst, 7, ExecutionStrategy::ParallelRows)?;

        assert_eq!(kept, 2);
        assert_eq!(dst.get([2, 2, 0]), Some(&1.0));
        assert_eq!(dst.get([2, 12, 0]), Some(&0.5));
        Ok(())
    }

    #[test]
    fn test_non_max_suppression_plateau() -> Result<(), HarrisError> {
        let size = ImageSize {
            width: 8,
            height: 8,
        };
        let mut response = Image::<f32, 1>::from_size_val(size, 0.0)?;
        response.as_slice_mut()[3 * 8 + 3] = 2.0;
        response.as_slice_mut()[3 * 8 + 4] = 2.0;

        let mut dst = Image::<f32, 1>::from_size_val(size, 0.0)?;
        let kept = non_max_suppression(&response, &mut dst, 7, ExecutionStrategy::Serial)?;

        assert_eq!(kept, 2);
        Ok(())
    }

    #[test]
    fn test_non_max_suppression_below_median() -> Result<(), HarrisError> {
        // every value sits at or below the median: nothing survives
        let response = Image::<f32, 1>::new([4, 1].into(), vec![1.0, 1.0, 1.0, 0.5])?;
        let mut dst = Image::<f32, 1>::from_size_val(response.size(), 7.0)?;
        let kept = non_max_suppression(&response, &mut dst, 3, ExecutionStrategy::Serial)?;

        assert_eq!(kept, 0);
        assert_eq!(dst.as_slice(), &[0.0; 4]);
        Ok(())
    }

    #[test]
    fn test_non_max_suppression_negative_peak() -> Result<(), HarrisError> {
        // negative values above a negative median survive thresholding
        #[rustfmt::skip]
        let response = Image::<f32, 1>::new([5, 1].into(), vec![
            -5.0, -4.0, -3.0, -2.0, -1.0,
        ])?;
        let mut dst = Image::<f32, 1>::from_size_val(response.size(), 0.0)?;
        let kept = non_max_suppression(&response, &mut dst, 3, ExecutionStrategy::Serial)?;

        assert_eq!(kept, 1);
        assert_eq!(dst.as_slice(), &[0.0, 0.0, 0.0, 0.0, -1.0]);
        Ok(())
    }

    #[test]
    fn test_non_max_suppression_even_window() -> Result<(), HarrisError> {
        let response = Image::<f32, 1>::from_size_val([3, 3].into(), 1.0)?;
        let mut dst = response.clone();
        assert!(matches!(
            non_max_suppression(&response, &mut dst, 4, ExecutionStrategy::Serial),
            Err(HarrisError::FilterError(_))
        ));
        Ok(())
    }
}
