use image::DynamicImage;
use ndarray::Array4;

use super::config::{PreprocessingConfig, PreprocessingConfigError};

/// Converts an image into a `[1, 3, height, width]` batch: RGB, exact resize,
/// channel values scaled by `normalization.scale`.
pub fn preprocess(
    image: &DynamicImage,
    config: &PreprocessingConfig,
) -> Result<Array4<f32>, PreprocessingConfigError> {
    let (width, height) = config.dimensions()?;
    let filter = config.filter()?;
    let scale = config.normalization.scale;

    let rgb = image.resize_exact(width, height, filter).to_rgb8();

    let mut batch = Array4::<f32>::zeros((1, 3, height as usize, width as usize));
    for (x, y, pixel) in rgb.enumerate_pixels() {
        for c in 0..3 {
            batch[[0, c, y as usize, x as usize]] = pixel[c] as f32 * scale;
        }
    }
    Ok(batch)
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{GrayImage, Luma, Rgb, RgbImage, RgbaImage};

    fn small_config() -> PreprocessingConfig {
        let mut config = PreprocessingConfig::default();
        config.image.size = vec![4, 2];
        config.image.preprocessing.resize_method = "nearest".into();
        config
    }

    #[test]
    fn produces_batched_chw_tensor_in_unit_range() {
        let img = RgbImage::from_fn(10, 7, |x, y| Rgb([(x * 25) as u8, (y * 30) as u8, 255]));
        let batch = preprocess(&DynamicImage::ImageRgb8(img), &small_config()).unwrap();

        assert_eq!(batch.shape(), &[1, 3, 2, 4]);
        assert!(batch.iter().all(|v| (0.0..=1.0).contains(v)));
        assert!(batch.slice(ndarray::s![0, 2, .., ..]).iter().all(|v| (*v - 1.0).abs() < 1e-6));
    }

    #[test]
    fn grayscale_and_alpha_inputs_become_three_channels() {
        let gray = GrayImage::from_pixel(3, 3, Luma([51]));
        let batch = preprocess(&DynamicImage::ImageLuma8(gray), &small_config()).unwrap();
        assert_eq!(batch.shape(), &[1, 3, 2, 4]);
        assert!(batch.iter().all(|v| (*v - 0.2).abs() < 1e-6));

        let rgba = RgbaImage::from_pixel(5, 5, image::Rgba([255, 0, 0, 0]));
        let batch = preprocess(&DynamicImage::ImageRgba8(rgba), &small_config()).unwrap();
        assert!((batch[[0, 0, 0, 0]] - 1.0).abs() < 1e-6);
        assert_eq!(batch[[0, 1, 0, 0]], 0.0);
    }
}
