/// A border type for same-size spatial filters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum PaddingMode {
    /// Samples outside the image are zero.
    ///
    /// Example: ...d c b a | 0 0 0 0...
    #[default]
    Constant,

    /// Takes the outermost row or column of pixels and repeats it into the padded region.
    ///
    /// Example: ...d c b a | a a a a...
    Replicate,

    /// Reflects the pixel values at the boundary, starting with the pixel 'next' to the edge.
    ///
    /// Example: ...d c b a | b c d e...
    Reflect101,
}

impl PaddingMode {
    #[inline]
    fn reflect101(i: isize, len: usize) -> usize {
        if len == 1 {
            return 0;
        }
        let len = len as isize;
        let mut i = i;
        while i < 0 || i >= len {
            if i < 0 {
                i = -i;
            } else {
                i = 2 * len - i - 2;
            }
        }
        i as usize
    }

    /// Maps index `i` to a valid index within `[0, len)` according to the padding mode.
    ///
    /// Returns `None` when the sample falls in a [`PaddingMode::Constant`] border
    /// (or `len` is zero), meaning the sample contributes nothing to a weighted sum.
    ///
    /// # Examples
    ///
    /// ```
    /// use harris_imgproc::padding::PaddingMode;
    ///
    /// assert_eq!(PaddingMode::Constant.map_index(-1, 5), None);
    /// assert_eq!(PaddingMode::Replicate.map_index(-1, 5), Some(0));
    /// assert_eq!(PaddingMode::Reflect101.map_index(-1, 5), Some(1));
    /// assert_eq!(PaddingMode::Reflect101.map_index(5, 5), Some(3));
    /// ```
    #[inline]
    pub fn map_index(&self, i: isize, len: usize) -> Option<usize> {
        if len == 0 {
            return None;
        }
        if i >= 0 && (i as usize) < len {
            return Some(i as usize);
        }
        match self {
            PaddingMode::Constant => None,
            PaddingMode::Replicate => Some(i.clamp(0, len as isize - 1) as usize),
            PaddingMode::Reflect101 => Some(Self::reflect101(i, len)),
        }
    }
}
