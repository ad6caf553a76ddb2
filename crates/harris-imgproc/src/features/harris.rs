use harris_image::{Image, ImageSize};
use rayon::prelude::*;

use super::{
    channel_products, extract_interest_points, harris_response, image_gradients,
    non_max_suppression, second_moment_matrix, HarrisConfig, HarrisError, InterestPoint,
};
use crate::filter::{DefaultKernelProvider, Kernel2d, KernelProvider};
use crate::parallel::{self, ExecutionStrategy};

/// A single-channel floating point image.
pub type GrayImage = Image<f32, 1>;

/// The filter weights used by the detector, built once per configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct HarrisKernels {
    /// The horizontal Sobel kernel.
    pub sobel_x: Kernel2d,
    /// The vertical Sobel kernel.
    pub sobel_y: Kernel2d,
    /// The normalized Gaussian window of the second moment matrix.
    pub gaussian: Kernel2d,
}

impl HarrisKernels {
    /// Build the kernels from a provider.
    ///
    /// The Gaussian is renormalized to sum one. A Gaussian that cannot be
    /// normalized, or whose size does not match `kernel_size`, is rejected.
    pub fn new<P: KernelProvider>(
        provider: &P,
        kernel_size: usize,
        sigma: f32,
    ) -> Result<Self, HarrisError> {
        let (sobel_x, sobel_y) = provider.sobel_kernels();
        if sobel_x.size() != 3 || sobel_y.size() != 3 {
            return Err(HarrisError::InvalidConfiguration(format!(
                "sobel kernels must be 3x3, got {}x{} and {}x{}",
                sobel_x.size(),
                sobel_x.size(),
                sobel_y.size(),
                sobel_y.size()
            )));
        }

        let gaussian = provider
            .gaussian_kernel(kernel_size, sigma)
            .and_then(Kernel2d::normalized)
            .map_err(|e| HarrisError::InvalidConfiguration(format!("gaussian kernel: {e}")))?;
        if gaussian.size() != kernel_size {
            return Err(HarrisError::InvalidConfiguration(format!(
                "gaussian kernel has size {}, expected {kernel_size}",
                gaussian.size()
            )));
        }

        Ok(Self {
            sobel_x,
            sobel_y,
            gaussian,
        })
    }
}

/// Harris corner detector.
///
/// The detector validates its configuration and builds its kernels once; every
/// call then runs the whole pipeline on one image without keeping any state,
/// so a detector can be shared across threads.
#[derive(Debug, Clone)]
pub struct HarrisDetector {
    config: HarrisConfig,
    kernels: HarrisKernels,
}

impl HarrisDetector {
    /// Create a detector with the [`DefaultKernelProvider`].
    pub fn new(config: HarrisConfig) -> Result<Self, HarrisError> {
        Self::with_kernel_provider(config, &DefaultKernelProvider)
    }

    /// Create a detector whose kernels come from `provider`.
    pub fn with_kernel_provider<P: KernelProvider>(
        config: HarrisConfig,
        provider: &P,
    ) -> Result<Self, HarrisError> {
        config.validate()?;
        let kernels = HarrisKernels::new(provider, config.kernel_size, config.sigma)?;
        log::debug!("created Harris detector with {config:?}");
        Ok(Self { config, kernels })
    }

    /// The configuration of the detector.
    pub fn config(&self) -> &HarrisConfig {
        &self.config
    }

    /// The kernels of the detector.
    pub fn kernels(&self) -> &HarrisKernels {
        &self.kernels
    }

    fn check_input(image: &GrayImage) -> Result<(), HarrisError> {
        if image.size().area() == 0 {
            return Err(HarrisError::InvalidShape(vec![image.height(), image.width()]));
        }
        Ok(())
    }

    /// Compute the dense corner response map of an image.
    ///
    /// # Arguments
    ///
    /// * `image` - The grayscale image with shape (H, W).
    ///
    /// # Returns
    ///
    /// The response `R` with shape (H, W).
    pub fn corner_response(&self, image: &GrayImage) -> Result<GrayImage, HarrisError> {
        Self::check_input(image)?;

        let size = image.size();
        let (padding, strategy) = (self.config.padding, self.config.strategy);

        let mut gradients = Image::<f32, 2>::from_size_val(size, 0.0)?;
        image_gradients(
            image,
            &mut gradients,
            &self.kernels.sobel_x,
            &self.kernels.sobel_y,
            padding,
            strategy,
        )?;

        let mut products = Image::<f32, 3>::from_size_val(size, 0.0)?;
        channel_products(&gradients, &mut products)?;

        let mut moments = Image::<f32, 3>::from_size_val(size, 0.0)?;
        second_moment_matrix(
            &products,
            &mut moments,
            &self.kernels.gaussian,
            padding,
            strategy,
        )?;

        let mut response = GrayImage::from_size_val(size, 0.0)?;
        harris_response(&moments, &mut response, self.config.alpha)?;

        Ok(response)
    }

    /// Compute the suppressed corner response map of an image.
    ///
    /// Only the local maxima above the median response stay non-zero.
    pub fn forward(&self, image: &GrayImage) -> Result<GrayImage, HarrisError> {
        let response = self.corner_response(image)?;
        let mut suppressed = GrayImage::from_size_val(response.size(), 0.0)?;
        non_max_suppression(
            &response,
            &mut suppressed,
            self.config.nms_window_size,
            self.config.strategy,
        )?;
        Ok(suppressed)
    }

    /// Detect the corners of an image.
    ///
    /// # Arguments
    ///
    /// * `image` - The grayscale image with shape (H, W).
    ///
    /// # Returns
    ///
    /// At most `num_points` corners, ordered by descending confidence.
    pub fn detect(&self, image: &GrayImage) -> Result<Vec<InterestPoint>, HarrisError> {
        let suppressed = self.forward(image)?;
        Ok(extract_interest_points(
            &suppressed,
            self.config.num_points,
            self.config.border_margin,
            self.config.normalize,
        ))
    }

    /// Detect the corners of a raw row-major buffer.
    ///
    /// # Arguments
    ///
    /// * `shape` - The buffer shape: `[H, W]`, `[1, H, W]` or `[1, 1, H, W]`.
    /// * `data` - The `H * W` samples.
    pub fn detect_raw(
        &self,
        shape: &[usize],
        data: &[f32],
    ) -> Result<Vec<InterestPoint>, HarrisError> {
        let (height, width) = match *shape {
            [h, w] | [1, h, w] | [1, 1, h, w] => (h, w),
            _ => return Err(HarrisError::InvalidShape(shape.to_vec())),
        };
        if height == 0 || width == 0 {
            return Err(HarrisError::InvalidShape(shape.to_vec()));
        }

        let image = GrayImage::from_size_slice(ImageSize { width, height }, data)?;
        self.detect(&image)
    }

    /// Detect the corners of several images.
    ///
    /// With [`ExecutionStrategy::Serial`] the images are processed one after
    /// the other on the calling thread. Any other strategy processes them in
    /// parallel on the pool it selects, one image per task, with each image
    /// filtered serially. The result for each image is identical to a
    /// separate [`HarrisDetector::detect`] call.
    pub fn detect_batch(
        &self,
        images: &[GrayImage],
    ) -> Result<Vec<Vec<InterestPoint>>, HarrisError> {
        if self.config.strategy == ExecutionStrategy::Serial {
            return images.iter().map(|image| self.detect(image)).collect();
        }

        let per_image = Self {
            config: HarrisConfig {
                strategy: ExecutionStrategy::Serial,
                ..self.config.clone()
            },
            kernels: self.kernels.clone(),
        };

        parallel::install(self.config.strategy, || {
            images
                .par_iter()
                .map(|image| per_image.detect(image))
                .collect::<Result<Vec<_>, _>>()
        })?
    }
}

/// Detect up to `num_points` Harris corners with the default configuration.
///
/// # Examples
///
/// ```
/// use harris_image::Image;
/// use harris_imgproc::features::harris_corners;
///
/// let image = Image::<f32, 1>::from_size_val([64, 64].into(), 0.5).unwrap();
/// assert!(harris_corners(&image, 100).unwrap().is_empty());
/// ```
pub fn harris_corners(
    image: &GrayImage,
    num_points: usize,
) -> Result<Vec<InterestPoint>, HarrisError> {
    HarrisDetector::new(HarrisConfig {
        num_points,
        ..Default::default()
    })?
    .detect(image)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filter::FilterError;

    struct BoxKernelProvider;

    impl KernelProvider for BoxKernelProvider {
        fn sobel_kernels(&self) -> (Kernel2d, Kernel2d) {
            DefaultKernelProvider.sobel_kernels()
        }

        fn gaussian_kernel(&self, kernel_size: usize, _sigma: f32) -> Result<Kernel2d, FilterError> {
            Kernel2d::new(kernel_size, vec![2.0; kernel_size * kernel_size])
        }
    }

    struct ZeroKernelProvider;

    impl KernelProvider for ZeroKernelProvider {
        fn sobel_kernels(&self) -> (Kernel2d, Kernel2d) {
            DefaultKernelProvider.sobel_kernels()
        }

        fn gaussian_kernel(&self, kernel_size: usize, _sigma: f32) -> Result<Kernel2d, FilterError> {
            Kernel2d::new(kernel_size, vec![0.0; kernel_size * kernel_size])
        }
    }

    #[test]
    fn test_kernels_are_normalized() -> Result<(), HarrisError> {
        let detector =
            HarrisDetector::with_kernel_provider(HarrisConfig::default(), &BoxKernelProvider)?;
        let gaussian = &detector.kernels().gaussian;
        assert_eq!(gaussian.size(), 7);
        approx::assert_relative_eq!(gaussian.sum(), 1.0, epsilon = 1e-5);
        Ok(())
    }

    #[test]
    fn test_degenerate_gaussian_rejected() {
        let res = HarrisDetector::with_kernel_provider(HarrisConfig::default(), &ZeroKernelProvider);
        assert!(matches!(res, Err(HarrisError::InvalidConfiguration(_))));
    }

    #[test]
    fn test_detect_empty_image() -> Result<(), HarrisError> {
        let detector = HarrisDetector::new(HarrisConfig::default())?;
        let image = GrayImage::new([0, 4].into(), vec![])?;
        assert_eq!(
            detector.detect(&image),
            Err(HarrisError::InvalidShape(vec![4, 0]))
        );
        Ok(())
    }

    #[test]
    fn test_corner_response_flat_image() -> Result<(), HarrisError> {
        // constant images only respond at the zero-padded border
        let detector = HarrisDetector::new(HarrisConfig::default())?;
        let image = GrayImage::from_size_val([40, 40].into(), 1.0)?;
        let response = detector.corner_response(&image)?;
        assert_eq!(response.size(), image.size());
        assert_eq!(response.get([20, 20, 0]), Some(&0.0));
        Ok(())
    }
}
