pub mod config;
pub mod labels;
pub mod model;
pub mod prediction;
pub mod preprocess;

use std::path::Path;

use config::{PreprocessingConfig, PreprocessingConfigError};
use labels::ClassLabels;
use model::{InferenceBackend, InferenceError};
use prediction::Prediction;

#[derive(Debug, thiserror::Error)]
pub enum ClassifyError {
    #[error("The prediction model is not available")]
    ModelNotLoaded,
    #[error("Could not open the uploaded image: {0}")]
    Io(#[from] std::io::Error),
    #[error("Could not read the uploaded image: {0}")]
    Image(#[from] image::ImageError),
    #[error("Preprocessing failed: {0}")]
    Preprocessing(#[from] PreprocessingConfigError),
    #[error("Inference failed: {0}")]
    Inference(#[from] InferenceError),
    #[error("The model returned no usable scores")]
    EmptyOutput,
}

/// Snapshot of what the classifier was started with.
#[derive(Debug, Clone, PartialEq)]
pub struct ClassifierStatus {
    pub model_loaded: bool,
    pub num_classes: usize,
    pub output_width: Option<usize>,
    pub labels_consistent: Option<bool>,
}

/// Model handle plus everything needed to turn an image file into a label.
pub struct Classifier {
    backend: Option<Box<dyn InferenceBackend>>,
    labels: ClassLabels,
    config: PreprocessingConfig,
    output_width: Option<usize>,
}

impl Classifier {
    /// Wraps a (possibly absent) backend. When present, the model's output
    /// width is probed once and compared with the label count.
    pub fn new(
        backend: Option<Box<dyn InferenceBackend>>,
        labels: ClassLabels,
        config: PreprocessingConfig,
    ) -> Self {
        let output_width = backend.as_ref().and_then(|b| {
            let (w, h) = config.dimensions().ok()?;
            match b.probe_output_width(w, h) {
                Ok(width) => Some(width),
                Err(e) => {
                    log::warn!("Could not probe model output width: {}", e);
                    None
                }
            }
        });

        if let Some(width) = output_width {
            if labels.matches_output_width(width) {
                log::info!("Model output width {} matches label count", width);
            } else {
                log::warn!(
                    "Model output width {} does not match {} class labels",
                    width,
                    labels.len()
                );
            }
        }

        Self {
            backend,
            labels,
            config,
            output_width,
        }
    }

    /// Loads the label file and model artifact. A model that fails to load is
    /// logged and leaves the classifier in the not-loaded state.
    pub fn load(model_path: &Path, labels_path: &Path, config: PreprocessingConfig) -> Self {
        let labels = ClassLabels::load(labels_path);
        let backend = match model::load_backend(model_path) {
            Ok(backend) => Some(backend),
            Err(e) => {
                log::error!("Failed to load model from {}: {}", model_path.display(), e);
                None
            }
        };
        Self::new(backend, labels, config)
    }

    pub fn is_loaded(&self) -> bool {
        self.backend.is_some()
    }

    pub fn labels(&self) -> &ClassLabels {
        &self.labels
    }

    pub fn status(&self) -> ClassifierStatus {
        ClassifierStatus {
            model_loaded: self.is_loaded(),
            num_classes: self.labels.len(),
            output_width: self.output_width,
            labels_consistent: self
                .output_width
                .map(|w| self.labels.matches_output_width(w)),
        }
    }

    pub fn classify_image(&self, image: &image::DynamicImage) -> Result<Prediction, ClassifyError> {
        let backend = self.backend.as_ref().ok_or(ClassifyError::ModelNotLoaded)?;
        let batch = preprocess::preprocess(image, &self.config)?;
        let output = backend.forward(&batch)?;
        Prediction::from_output(&output, &self.labels).ok_or(ClassifyError::EmptyOutput)
    }

    /// Reopens a saved upload and classifies it.
    pub fn classify_file(&self, path: &Path) -> Result<Prediction, ClassifyError> {
        if !self.is_loaded() {
            return Err(ClassifyError::ModelNotLoaded);
        }
        let image = image::ImageReader::open(path)?
            .with_guessed_format()?
            .decode()?;
        self.classify_image(&image)
    }
}


#[cfg(test)]
mod tests {
    use super::testing::{StaticBackend, one_hot};
    use super::*;
    use image::{Rgb, RgbImage};

    fn classifier_with(scores: Vec<f32>) -> Classifier {
        Classifier::new(
            Some(Box::new(StaticBackend(scores))),
            ClassLabels::default(),
            PreprocessingConfig::default(),
        )
    }

    #[test]
    fn status_without_model() {
        let classifier = Classifier::new(None, ClassLabels::default(), PreprocessingConfig::default());
        assert_eq!(
            classifier.status(),
            ClassifierStatus {
                model_loaded: false,
                num_classes: 10,
                output_width: None,
                labels_consistent: None,
            }
        );
    }

    #[test]
    fn status_flags_label_width_mismatch() {
        assert_eq!(classifier_with(one_hot(10, 0)).status().labels_consistent, Some(true));

        let status = classifier_with(one_hot(38, 0)).status();
        assert_eq!(status.output_width, Some(38));
        assert_eq!(status.labels_consistent, Some(false));
    }

    #[test]
    fn classifies_saved_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("leaf.png");
        RgbImage::from_pixel(32, 32, Rgb([20, 160, 40])).save(&path).unwrap();

        let prediction = classifier_with(one_hot(10, 9)).classify_file(&path).unwrap();
        assert_eq!(prediction.label, "Tomato___healthy");
        assert_eq!(prediction.confidence, 1.0);
    }

    #[test]
    fn missing_model_and_bad_image_are_errors() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("leaf.jpg");
        std::fs::write(&path, b"definitely not a jpeg").unwrap();

        let without_model = Classifier::new(None, ClassLabels::default(), PreprocessingConfig::default());
        assert!(matches!(
            without_model.classify_file(&path),
            Err(ClassifyError::ModelNotLoaded)
        ));

        assert!(matches!(
            classifier_with(one_hot(10, 0)).classify_file(&path),
            Err(ClassifyError::Image(_))
        ));
    }

    #[test]
    fn empty_output_is_an_error() {
        let img = image::DynamicImage::ImageRgb8(RgbImage::new(4, 4));
        assert!(matches!(
            classifier_with(Vec::new()).classify_image(&img),
            Err(ClassifyError::EmptyOutput)
        ));
    }
}
