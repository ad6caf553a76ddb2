use crate::error::ImageError;

/// Image size in pixels
///
/// A struct to represent the size of an image in pixels.
///
/// # Examples
///
/// ```
/// use harris_image::ImageSize;
///
/// let image_size = ImageSize {
///   width: 10,
///   height: 20,
/// };
///
/// assert_eq!(image_size.width, 10);
/// assert_eq!(image_size.height, 20);
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ImageSize {
    /// Width of the image in pixels
    pub width: usize,
    /// Height of the image in pixels
    pub height: usize,
}

impl ImageSize {
    /// Number of pixels covered by the size.
    pub fn area(&self) -> usize {
        self.width * self.height
    }
}

impl std::fmt::Display for ImageSize {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(
            f,
            "ImageSize {{ width: {}, height: {} }}",
            self.width, self.height
        )
    }
}

impl From<[usize; 2]> for ImageSize {
    fn from(size: [usize; 2]) -> Self {
        ImageSize {
            width: size[0],
            height: size[1],
        }
    }
}

/// Represents an image with pixel data.
///
/// The pixels are stored row-major with the channels interleaved, i.e. the
/// buffer has shape (H, W, C) and the sample `(row, col, ch)` lives at
/// `(row * W + col) * C + ch`.
#[derive(Clone, Debug, PartialEq)]
pub struct Image<T, const CHANNELS: usize> {
    size: ImageSize,
    data: Vec<T>,
}

impl<T, const CHANNELS: usize> Image<T, CHANNELS> {
    /// Create a new image from pixel data.
    ///
    /// # Arguments
    ///
    /// * `size` - The size of the image in pixels.
    /// * `data` - The pixel data of the image.
    ///
    /// # Errors
    ///
    /// If the length of the pixel data does not match the image size, an error is returned.
    ///
    /// # Examples
    ///
    /// ```
    /// use harris_image::{Image, ImageSize};
    ///
    /// let image = Image::<u8, 3>::new(
    ///     ImageSize {
    ///         width: 10,
    ///         height: 20,
    ///     },
    ///     vec![0u8; 10 * 20 * 3],
    /// ).unwrap();
    ///
    /// assert_eq!(image.size().width, 10);
    /// assert_eq!(image.size().height, 20);
    /// ```
    pub fn new(size: ImageSize, data: Vec<T>) -> Result<Self, ImageError> {
        let expected = size.area() * CHANNELS;
        if data.len() != expected {
            return Err(ImageError::InvalidChannelShape(data.len(), expected));
        }
        Ok(Self { size, data })
    }

    /// Create a new image with the given size, filled with `val`.
    pub fn from_size_val(size: ImageSize, val: T) -> Result<Self, ImageError>
    where
        T: Clone,
    {
        Self::new(size, vec![val; size.area() * CHANNELS])
    }

    /// Create a new image by copying the pixel data from a slice.
    pub fn from_size_slice(size: ImageSize, data: &[T]) -> Result<Self, ImageError>
    where
        T: Clone,
    {
        Self::new(size, data.to_vec())
    }

    /// Get the size of the image in pixels.
    pub fn size(&self) -> ImageSize {
        self.size
    }

    /// Get the number of columns of the image.
    pub fn cols(&self) -> usize {
        self.size.width
    }

    /// Get the number of rows of the image.
    pub fn rows(&self) -> usize {
        self.size.height
    }

    /// Get the width of the image in pixels.
    pub fn width(&self) -> usize {
        self.size.width
    }

    /// Get the height of the image in pixels.
    pub fn height(&self) -> usize {
        self.size.height
    }

    /// Get the pixel data as a flat slice.
    pub fn as_slice(&self) -> &[T] {
        &self.data
    }

    /// Get the pixel data as a flat mutable slice.
    pub fn as_slice_mut(&mut self) -> &mut [T] {
        &mut self.data
    }

    /// Get a reference to the sample at `[row, col, ch]`, if in bounds.
    ///
    /// # Examples
    ///
    /// ```
    /// use harris_image::{Image, ImageSize};
    ///
    /// let image = Image::<f32, 2>::new(
    ///     ImageSize { width: 2, height: 1 },
    ///     vec![0.0, 1.0, 2.0, 3.0],
    /// ).unwrap();
    ///
    /// assert_eq!(image.get([0, 1, 0]), Some(&2.0));
    /// assert_eq!(image.get([1, 0, 0]), None);
    /// ```
    pub fn get(&self, index: [usize; 3]) -> Option<&T> {
        let [row, col, ch] = index;
        if row >= self.rows() || col >= self.cols() || ch >= CHANNELS {
            return None;
        }
        self.data.get((row * self.cols() + col) * CHANNELS + ch)
    }

    /// Cast the pixel data to a different type and scale it.
    ///
    /// # Examples
    ///
    /// ```
    /// use harris_image::{Image, ImageSize};
    ///
    /// let image_u8 = Image::<u8, 1>::new(
    ///     ImageSize { width: 2, height: 1 },
    ///     vec![0, 255],
    /// ).unwrap();
    ///
    /// let image_f32 = image_u8.cast_and_scale::<f32>(1.0 / 255.0).unwrap();
    ///
    /// assert_eq!(image_f32.get([0, 1, 0]), Some(&1.0f32));
    /// ```
    pub fn cast_and_scale<U>(&self, scale: U) -> Result<Image<U, CHANNELS>, ImageError>
    where
        U: Copy + 'static + std::ops::Mul<Output = U>,
        T: num_traits::AsPrimitive<U>,
    {
        let casted_data = self.data.iter().map(|&x| x.as_() * scale).collect();
        Image::new(self.size, casted_data)
    }
}

#[cfg(test)]
mod tests {
    use crate::image::{Image, ImageError, ImageSize};

    #[test]
    fn image_smoke() -> Result<(), ImageError> {
        let image = Image::<u8, 3>::new(
            ImageSize {
                width: 10,
                height: 20,
            },
            vec![0u8; 10 * 20 * 3],
        )?;
        assert_eq!(image.size().width, 10);
        assert_eq!(image.size().height, 20);
        assert_eq!(image.as_slice().len(), 10 * 20 * 3);

        Ok(())
    }

    #[test]
    fn image_wrong_length() {
        let res = Image::<f32, 2>::new([3, 2].into(), vec![0.0; 6]);
        assert_eq!(res, Err(ImageError::InvalidChannelShape(6, 12)));
    }

    #[test]
    fn image_get_row_col() -> Result<(), ImageError> {
        let image = Image::<f32, 1>::new([3, 2].into(), (0..6).map(|v| v as f32).collect())?;
        assert_eq!(image.get([1, 2, 0]), Some(&5.0));
        assert_eq!(image.get([0, 3, 0]), None);
        assert_eq!(image.get([0, 0, 1]), None);

        Ok(())
    }

    #[test]
    fn image_cast_and_scale() -> Result<(), ImageError> {
        let image_u8 = Image::<u8, 3>::new(
            ImageSize {
                height: 2,
                width: 1,
            },
            vec![0, 51, 102, 153, 204, 255],
        )?;

        let image_f32 = image_u8.cast_and_scale(1.0f32 / 255.0)?;
        assert_eq!(image_f32.size(), image_u8.size());
        assert_eq!(image_f32.get([0, 0, 0]), Some(&0.0));
        assert_eq!(image_f32.get([1, 0, 2]), Some(&1.0));

        let image_f64 = image_u8.cast_and_scale(2.0f64)?;
        assert_eq!(image_f64.get([0, 0, 1]), Some(&102.0));

        Ok(())
    }
}
