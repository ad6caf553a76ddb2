use harris_image::Image;

/// A detected corner.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct InterestPoint {
    /// The column of the corner.
    pub x: u32,
    /// The row of the corner.
    pub y: u32,
    /// The strength of the corner, relative to the strongest one when normalized.
    pub confidence: f32,
}

/// The largest value of a map, if it is finite and strictly positive.
fn normalization_factor(values: &[f32]) -> Option<f32> {
    let max = values.iter().copied().max_by(f32::total_cmp)?;
    (max.is_finite() && max > 0.0).then_some(max)
}

/// Collect every non-zero pixel of a map in row-major order.
///
/// The confidence of each point is the pixel value, divided by `scale` if given.
pub fn nonzero_points(map: &Image<f32, 1>, scale: Option<f32>) -> Vec<InterestPoint> {
    let cols = map.cols();
    map.as_slice()
        .iter()
        .enumerate()
        .filter(|&(_, &v)| v != 0.0)
        .map(|(i, &v)| InterestPoint {
            x: (i % cols) as u32,
            y: (i / cols) as u32,
            confidence: scale.map_or(v, |s| v / s),
        })
        .collect()
}

/// Discard points that are not strictly inside the `margin` band of every border.
///
/// A point survives if `margin < x < width - margin` and
/// `margin < y < height - margin`. The relative order of the survivors is kept.
pub fn remove_border_points(
    points: &mut Vec<InterestPoint>,
    width: usize,
    height: usize,
    margin: usize,
) {
    let right = width.saturating_sub(margin);
    let bottom = height.saturating_sub(margin);
    points.retain(|p| (p.x as usize) > margin);
    points.retain(|p| (p.x as usize) < right);
    points.retain(|p| (p.y as usize) > margin);
    points.retain(|p| (p.y as usize) < bottom);
}

/// Sort points by descending confidence and keep at most `num_points`.
///
/// The sort is stable, so equal confidences keep their incoming order.
pub fn rank_points(points: &mut Vec<InterestPoint>, num_points: usize) {
    points.sort_by(|a, b| b.confidence.total_cmp(&a.confidence));
    points.truncate(num_points);
}

/// Turn a suppressed response map into a ranked list of interest points.
///
/// # Arguments
///
/// * `suppressed` - The map after non-maximum suppression with shape (H, W).
/// * `num_points` - The maximum number of returned points.
/// * `border_margin` - Points within this distance of a border are discarded.
/// * `normalize` - Divide confidences by the largest value of the map when it
///   is finite and positive.
///
/// # Returns
///
/// The points ordered by descending confidence.
///
/// # Examples
///
/// ```
/// use harris_image::Image;
/// use harris_imgproc::features::extract_interest_points;
///
/// let mut map = Image::<f32, 1>::from_size_val([8, 8].into(), 0.0).unwrap();
/// map.as_slice_mut()[3 * 8 + 4] = 2.0;
/// map.as_slice_mut()[5 * 8 + 2] = 4.0;
///
/// let points = extract_interest_points(&map, 10, 1, true);
/// assert_eq!(points.len(), 2);
/// assert_eq!((points[0].x, points[0].y, points[0].confidence), (2, 5, 1.0));
/// assert_eq!((points[1].x, points[1].y, points[1].confidence), (4, 3, 0.5));
/// ```
pub fn extract_interest_points(
    suppressed: &Image<f32, 1>,
    num_points: usize,
    border_margin: usize,
    normalize: bool,
) -> Vec<InterestPoint> {
    let scale = if normalize {
        normalization_factor(suppressed.as_slice())
    } else {
        None
    };

    let mut points = nonzero_points(suppressed, scale);
    let candidates = points.len();

    remove_border_points(
        &mut points,
        suppressed.width(),
        suppressed.height(),
        border_margin,
    );
    rank_points(&mut points, num_points);

    log::debug!(
        "extracted {} of {candidates} candidate points (border margin {border_margin})",
        points.len()
    );

    points
}
