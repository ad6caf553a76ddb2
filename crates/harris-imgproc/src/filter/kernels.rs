use super::FilterError;

/// A square 2D filter kernel with an odd side length.
///
/// The weights are stored row-major; the kernel is applied as a correlation,
/// so `weights[ky * size + kx]` multiplies the sample at offset
/// `(ky - radius, kx - radius)` from the output pixel.
#[derive(Debug, Clone, PartialEq)]
pub struct Kernel2d {
    size: usize,
    weights: Vec<f32>,
}

impl Kernel2d {
    /// Create a kernel from row-major weights.
    ///
    /// # Arguments
    ///
    /// * `size` - The side length of the kernel. Must be odd.
    /// * `weights` - The `size * size` kernel weights.
    pub fn new(size: usize, weights: Vec<f32>) -> Result<Self, FilterError> {
        if size % 2 == 0 {
            return Err(FilterError::InvalidKernelSize(size));
        }
        if weights.len() != size * size {
            return Err(FilterError::InvalidKernelLength(weights.len(), size * size));
        }
        Ok(Self { size, weights })
    }

    /// Create a kernel as the outer product `col * rowᵀ` of two 1D kernels.
    ///
    /// # Examples
    ///
    /// ```
    /// use harris_imgproc::filter::Kernel2d;
    ///
    /// let kernel = Kernel2d::from_outer(&[1.0, 2.0, 1.0], &[-1.0, 0.0, 1.0]).unwrap();
    /// assert_eq!(
    ///     kernel.weights(),
    ///     &[-1.0, 0.0, 1.0, -2.0, 0.0, 2.0, -1.0, 0.0, 1.0]
    /// );
    /// ```
    pub fn from_outer(col: &[f32], row: &[f32]) -> Result<Self, FilterError> {
        if col.len() != row.len() {
            return Err(FilterError::InvalidKernelLength(
                col.len() * row.len(),
                col.len() * col.len(),
            ));
        }
        Self::new(col.len(), outer(col, row))
    }

    /// The side length of the kernel.
    pub fn size(&self) -> usize {
        self.size
    }

    /// The number of samples on each side of the kernel center.
    pub fn radius(&self) -> usize {
        self.size / 2
    }

    /// The row-major kernel weights.
    pub fn weights(&self) -> &[f32] {
        &self.weights
    }

    /// The sum of all the weights.
    pub fn sum(&self) -> f32 {
        self.weights.iter().sum()
    }

    /// Scale the weights so that they sum to one.
    ///
    /// Kernels that already sum to one within `1e-6` are returned untouched.
    pub fn normalized(mut self) -> Result<Self, FilterError> {
        let norm = self.sum();
        if !norm.is_finite() || norm == 0.0 {
            return Err(FilterError::DegenerateKernel(norm));
        }
        if (norm - 1.0).abs() > 1e-6 {
            self.weights.iter_mut().for_each(|w| *w /= norm);
        }
        Ok(self)
    }
}

/// Source of the fixed filter weights used by the corner detector.
///
/// Implementations must be pure: the same arguments always produce the same weights.
pub trait KernelProvider {
    /// The horizontal and vertical 3x3 Sobel kernels, in that order.
    fn sobel_kernels(&self) -> (Kernel2d, Kernel2d);

    /// An isotropic Gaussian kernel of side `kernel_size` and standard deviation `sigma`.
    fn gaussian_kernel(&self, kernel_size: usize, sigma: f32) -> Result<Kernel2d, FilterError>;
}

/// The kernel provider backed by [`sobel_kernel_1d`] and [`gaussian_kernel_1d`].
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultKernelProvider;

impl KernelProvider for DefaultKernelProvider {
    fn sobel_kernels(&self) -> (Kernel2d, Kernel2d) {
        let (derivative, smoothing) = sobel_kernel_1d();
        // both factors have length 3, the outer products cannot fail
        let kernel_x = Kernel2d {
            size: 3,
            weights: outer(&smoothing, &derivative),
        };
        let kernel_y = Kernel2d {
            size: 3,
            weights: outer(&derivative, &smoothing),
        };
        (kernel_x, kernel_y)
    }

    fn gaussian_kernel(&self, kernel_size: usize, sigma: f32) -> Result<Kernel2d, FilterError> {
        if kernel_size % 2 == 0 {
            return Err(FilterError::InvalidKernelSize(kernel_size));
        }
        if !sigma.is_finite() || sigma <= 0.0 {
            return Err(FilterError::InvalidSigma(sigma));
        }
        let kernel_1d = gaussian_kernel_1d(kernel_size, sigma);
        Kernel2d::from_outer(&kernel_1d, &kernel_1d)?.normalized()
    }
}

fn outer(col: &[f32], row: &[f32]) -> Vec<f32> {
    col.iter()
        .flat_map(|&c| row.iter().map(move |&r| c * r))
        .collect()
}

/// Create a gaussian blur kernel.
///
/// # Arguments
///
/// * `kernel_size` - The size of the kernel. Must be positive.
/// * `sigma` - The sigma of the gaussian kernel.
///
/// # Returns
///
/// A vector of the kernel, normalized to sum one.
pub fn gaussian_kernel_1d(kernel_size: usize, sigma: f32) -> Vec<f32> {
    let mut kernel = Vec::with_capacity(kernel_size);

    let mean = kernel_size.saturating_sub(1) as f32 / 2.0;
    let sigma_sq = sigma * sigma;

    for i in 0..kernel_size {
        let x = i as f32 - mean;
        kernel.push((-(x * x) / (2.0 * sigma_sq)).exp());
    }

    let norm = kernel.iter().sum::<f32>();
    kernel.iter_mut().for_each(|k| *k /= norm);
    kernel
}

/// The separable factors of the 3x3 Sobel operator.
///
/// # Returns
///
/// The derivative factor `[-1, 0, 1]` and the smoothing factor `[1, 2, 1]`.
pub fn sobel_kernel_1d() -> ([f32; 3], [f32; 3]) {
    ([-1.0, 0.0, 1.0], [1.0, 2.0, 1.0])
}
