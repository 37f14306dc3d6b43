use image::imageops::FilterType;
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, thiserror::Error)]
pub enum PreprocessingConfigError {
    #[error("Failed to read preprocessing config: {0}")]
    Io(#[from] std::io::Error),
    #[error("Invalid preprocessing config: {0}")]
    Yaml(#[from] serde_yaml::Error),
    #[error("Unknown resize method: {0}")]
    UnknownResizeMethod(String),
    #[error("Image size must be [width, height] with non-zero values, got {0:?}")]
    InvalidSize(Vec<u32>),
    #[error("Only 3-channel RGB input is supported, got {0} channels")]
    UnsupportedChannels(u32),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PreprocessingConfig {
    #[serde(default)]
    pub image: ImageConfig,
    #[serde(default)]
    pub normalization: NormalizationConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImageConfig {
    pub size: Vec<u32>,
    pub channels: u32,
    #[serde(default)]
    pub preprocessing: ResizeConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResizeConfig {
    pub resize_method: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NormalizationConfig {
    /// Multiplier applied to 8-bit channel values.
    pub scale: f32,
}

impl Default for ImageConfig {
    fn default() -> Self {
        Self {
            size: vec![224, 224],
            channels: 3,
            preprocessing: ResizeConfig::default(),
        }
    }
}

impl Default for ResizeConfig {
    fn default() -> Self {
        Self {
            resize_method: "triangle".to_string(),
        }
    }
}

impl Default for NormalizationConfig {
    fn default() -> Self {
        Self { scale: 1.0 / 255.0 }
    }
}

impl Default for PreprocessingConfig {
    fn default() -> Self {
        Self {
            image: ImageConfig::default(),
            normalization: NormalizationConfig::default(),
        }
    }
}

impl PreprocessingConfig {
    /// Loads the YAML config at `path`, falling back to defaults when the file
    /// does not exist.
    pub fn load(path: &Path) -> Result<Self, PreprocessingConfigError> {
        if !path.exists() {
            log::info!(
                "No preprocessing config at {}, using defaults",
                path.display()
            );
            return Ok(Self::default());
        }
        let config_str = std::fs::read_to_string(path)?;
        Self::from_yaml(&config_str)
    }

    pub fn from_yaml(config_str: &str) -> Result<Self, PreprocessingConfigError> {
        let config: PreprocessingConfig = serde_yaml::from_str(config_str)?;
        config.dimensions()?;
        config.filter()?;
        if config.image.channels != 3 {
            return Err(PreprocessingConfigError::UnsupportedChannels(
                config.image.channels,
            ));
        }
        Ok(config)
    }

    /// Target `(width, height)`.
    pub fn dimensions(&self) -> Result<(u32, u32), PreprocessingConfigError> {
        match self.image.size.as_slice() {
            [w, h] if *w > 0 && *h > 0 => Ok((*w, *h)),
            _ => Err(PreprocessingConfigError::InvalidSize(self.image.size.clone())),
        }
    }

    pub fn filter(&self) -> Result<FilterType, PreprocessingConfigError> {
        let method = &self.image.preprocessing.resize_method;
        match method.to_ascii_lowercase().as_str() {
            "nearest" => Ok(FilterType::Nearest),
            "triangle" | "bilinear" => Ok(FilterType::Triangle),
            "catmullrom" | "bicubic" => Ok(FilterType::CatmullRom),
            "gaussian" => Ok(FilterType::Gaussian),
            "lanczos3" => Ok(FilterType::Lanczos3),
            _ => Err(PreprocessingConfigError::UnknownResizeMethod(method.clone())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_yields_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = PreprocessingConfig::load(&dir.path().join("nope.yaml")).unwrap();
        assert_eq!(config.dimensions().unwrap(), (224, 224));
        assert_eq!(config.filter().unwrap(), FilterType::Triangle);
    }

    #[test]
    fn parses_yaml_overrides() {
        let yaml = r#"
image:
  size: [128, 96]
  channels: 3
  preprocessing:
    resize_method: nearest
normalization:
  scale: 0.5
"#;
        let config = PreprocessingConfig::from_yaml(yaml).unwrap();
        assert_eq!(config.dimensions().unwrap(), (128, 96));
        assert_eq!(config.filter().unwrap(), FilterType::Nearest);
        assert_eq!(config.normalization.scale, 0.5);
    }

    #[test]
    fn rejects_bad_size_and_method() {
        let bad_size = "image:\n  size: [224]\n  channels: 3\n";
        assert!(matches!(
            PreprocessingConfig::from_yaml(bad_size),
            Err(PreprocessingConfigError::InvalidSize(_))
        ));

        let bad_method =
            "image:\n  size: [8, 8]\n  channels: 3\n  preprocessing:\n    resize_method: magic\n";
        assert!(matches!(
            PreprocessingConfig::from_yaml(bad_method),
            Err(PreprocessingConfigError::UnknownResizeMethod(_))
        ));
    }

    #[test]
    fn rejects_non_rgb_channels() {
        let grayscale = "image:\n  size: [8, 8]\n  channels: 1\n";
        assert!(matches!(
            PreprocessingConfig::from_yaml(grayscale),
            Err(PreprocessingConfigError::UnsupportedChannels(1))
        ));
    }
}
