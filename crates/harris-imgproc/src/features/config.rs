use super::HarrisError;
use crate::padding::PaddingMode;
use crate::parallel::ExecutionStrategy;

/// Default side of the Gaussian window of the second moment matrix.
pub const DEFAULT_KERNEL_SIZE: usize = 7;

/// Default standard deviation of the Gaussian window.
pub const DEFAULT_SIGMA: f32 = 5.0;

/// Default weight of the squared trace in the corner response.
pub const DEFAULT_ALPHA: f32 = 0.05;

/// Default maximum number of returned interest points.
pub const DEFAULT_NUM_POINTS: usize = 3000;

/// Default side of the non-maximum suppression window.
pub const NMS_WINDOW_SIZE: usize = 7;

/// Default margin, in pixels, that a point must keep from every image border.
pub const BORDER_MARGIN: usize = 16;

/// Configuration of the Harris corner detector.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(default)
)]
pub struct HarrisConfig {
    /// Side of the Gaussian window. Must be odd.
    pub kernel_size: usize,
    /// Standard deviation of the Gaussian window. Must be positive.
    pub sigma: f32,
    /// Weight of the squared trace in `R = det(M) - alpha * trace(M)^2`.
    pub alpha: f32,
    /// Maximum number of returned points.
    pub num_points: usize,
    /// Side of the non-maximum suppression window. Must be odd.
    pub nms_window_size: usize,
    /// Points closer than this to a border are discarded.
    pub border_margin: usize,
    /// Divide the confidences by the strongest surviving response.
    pub normalize: bool,
    /// Border handling of the Sobel and Gaussian filters.
    pub padding: PaddingMode,
    /// Row scheduling of the filters.
    pub strategy: ExecutionStrategy,
}

impl Default for HarrisConfig {
    fn default() -> Self {
        Self {
            kernel_size: DEFAULT_KERNEL_SIZE,
            sigma: DEFAULT_SIGMA,
            alpha: DEFAULT_ALPHA,
            num_points: DEFAULT_NUM_POINTS,
            nms_window_size: NMS_WINDOW_SIZE,
            border_margin: BORDER_MARGIN,
            normalize: true,
            padding: PaddingMode::Constant,
            strategy: ExecutionStrategy::Serial,
        }
    }
}

impl HarrisConfig {
    /// Check every field against its valid range.
    ///
    /// # Errors
    ///
    /// Returns [`HarrisError::InvalidConfiguration`] naming the first offending field.
    pub fn validate(&self) -> Result<(), HarrisError> {
        if self.kernel_size % 2 == 0 {
            return Err(HarrisError::InvalidConfiguration(format!(
                "kernel_size must be odd and positive, got {}",
                self.kernel_size
            )));
        }
        if !self.sigma.is_finite() || self.sigma <= 0.0 {
            return Err(HarrisError::InvalidConfiguration(format!(
                "sigma must be finite and positive, got {}",
                self.sigma
            )));
        }
        if !self.alpha.is_finite() {
            return Err(HarrisError::InvalidConfiguration(format!(
                "alpha must be finite, got {}",
                self.alpha
            )));
        }
        if self.num_points == 0 {
            return Err(HarrisError::InvalidConfiguration(
                "num_points must be positive".to_string(),
            ));
        }
        if self.nms_window_size % 2 == 0 {
            return Err(HarrisError::InvalidConfiguration(format!(
                "nms_window_size must be odd and positive, got {}",
                self.nms_window_size
            )));
        }
        if self.strategy == ExecutionStrategy::Fixed(0) {
            return Err(HarrisError::InvalidConfiguration(
                "strategy thread count must be positive".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_valid() {
        let config = HarrisConfig::default();
        assert_eq!(config.kernel_size, 7);
        assert_eq!(config.sigma, 5.0);
        assert_eq!(config.alpha, 0.05);
        assert_eq!(config.num_points, 3000);
        assert_eq!(config.nms_window_size, 7);
        assert_eq!(config.border_margin, 16);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_invalid_fields() {
        let cases = [
            HarrisConfig {
                kernel_size: 6,
                ..Default::default()
            },
            HarrisConfig {
                kernel_size: 0,
                ..Default::default()
            },
            HarrisConfig {
                sigma: 0.0,
                ..Default::default()
            },
            HarrisConfig {
                sigma: -1.0,
                ..Default::default()
            },
            HarrisConfig {
                sigma: f32::INFINITY,
                ..Default::default()
            },
            HarrisConfig {
                alpha: f32::NAN,
                ..Default::default()
            },
            HarrisConfig {
                num_points: 0,
                ..Default::default()
            },
            HarrisConfig {
                nms_window_size: 4,
                ..Default::default()
            },
            HarrisConfig {
                strategy: ExecutionStrategy::Fixed(0),
                ..Default::default()
            },
        ];

        for config in cases {
            assert!(
                matches!(config.validate(), Err(HarrisError::InvalidConfiguration(_))),
                "{config:?} should be rejected"
            );
        }
    }

    #[cfg(feature = "serde")]
    #[test]
    fn test_config_from_partial_json() -> Result<(), serde_json::Error> {
        let config: HarrisConfig = serde_json::from_str(r#"{ "num_points": 5, "alpha": 0.04 }"#)?;
        assert_eq!(config.num_points, 5);
        assert_eq!(config.alpha, 0.04);
        assert_eq!(config.kernel_size, DEFAULT_KERNEL_SIZE);
        Ok(())
    }
}
