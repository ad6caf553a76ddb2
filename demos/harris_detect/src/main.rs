use argh::FromArgs;
use std::path::{Path, PathBuf};

use harris_image::{Image, ImageSize};
use harris_imgproc::features::{HarrisConfig, HarrisDetector};

/// Detect Harris corners on an image and print them as JSON lines.
#[derive(FromArgs)]
struct Args {
    /// path to the image to detect corners on; a synthetic pattern is used if omitted
    #[argh(option)]
    image_path: Option<PathBuf>,

    /// path to a JSON file with the detector configuration
    #[argh(option)]
    config: Option<PathBuf>,

    /// maximum number of corners, overrides the configuration
    #[argh(option)]
    num_points: Option<usize>,
}

/// A grid of bright squares on a dark background.
fn synthetic_grid() -> Result<Image<f32, 1>, Box<dyn std::error::Error>> {
    let size = ImageSize {
        width: 128,
        height: 128,
    };
    let mut image = Image::from_size_val(size, 0.0f32)?;
    let cols = image.cols();
    for cy in (24..=104).step_by(16) {
        for cx in (24..=104).step_by(16) {
            for y in cy - 3..=cy + 3 {
                for x in cx - 3..=cx + 3 {
                    image.as_slice_mut()[y * cols + x] = 1.0;
                }
            }
        }
    }
    Ok(image)
}

fn read_image_gray(path: &Path) -> Result<Image<f32, 1>, Box<dyn std::error::Error>> {
    let img = image::open(path)?.into_luma8();
    let size = ImageSize {
        width: img.width() as usize,
        height: img.height() as usize,
    };
    let img_gray8 = Image::<u8, 1>::new(size, img.into_raw())?;
    Ok(img_gray8.cast_and_scale(1.0 / 255.0)?)
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();
    let args: Args = argh::from_env();

    let mut config = match &args.config {
        Some(path) => serde_json::from_str::<HarrisConfig>(&std::fs::read_to_string(path)?)?,
        None => HarrisConfig::default(),
    };
    if let Some(num_points) = args.num_points {
        config.num_points = num_points;
    }

    let image = match &args.image_path {
        Some(path) => read_image_gray(path)?,
        None => synthetic_grid()?,
    };
    log::info!("detecting corners on a {} image", image.size());

    let detector = HarrisDetector::new(config)?;
    let points = detector.detect(&image)?;
    log::info!("found {} corners", points.len());

    for point in &points {
        println!("{}", serde_json::to_string(point)?);
    }

    Ok(())
}
