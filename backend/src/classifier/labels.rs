use std::fs;
use std::path::Path;

/// Labels used when no `class_names.json` is deployed next to the model.
pub const DEFAULT_LABELS: [&str; 10] = [
    "Tomato___Bacterial_spot",
    "Tomato___Early_blight",
    "Tomato___Late_blight",
    "Tomato___Leaf_Mold",
    "Tomato___Septoria_leaf_spot",
    "Tomato___Spider_mites Two-spotted_spider_mite",
    "Tomato___Target_Spot",
    "Tomato___Tomato_Yellow_Leaf_Curl_Virus",
    "Tomato___Tomato_mosaic_virus",
    "Tomato___healthy",
];

#[derive(Debug, thiserror::Error)]
pub enum LabelsError {
    #[error("Failed to read label file: {0}")]
    Io(#[from] std::io::Error),
    #[error("Label file is not a JSON array of strings: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Label file contains no labels")]
    Empty,
}

/// Class names indexed by model output position.
#[derive(Debug, Clone, PartialEq)]
pub struct ClassLabels {
    labels: Vec<String>,
}

impl Default for ClassLabels {
    fn default() -> Self {
        Self {
            labels: DEFAULT_LABELS.iter().map(|l| l.to_string()).collect(),
        }
    }
}

impl ClassLabels {
    pub fn new(labels: Vec<String>) -> Result<Self, LabelsError> {
        if labels.is_empty() {
            return Err(LabelsError::Empty);
        }
        Ok(Self { labels })
    }

    pub fn from_file(path: &Path) -> Result<Self, LabelsError> {
        let raw = fs::read_to_string(path)?;
        let labels: Vec<String> = serde_json::from_str(&raw)?;
        Self::new(labels)
    }

    /// Reads `path` when it exists. A missing or unusable file falls back to
    /// [`DEFAULT_LABELS`].
    pub fn load(path: &Path) -> Self {
        if !path.exists() {
            log::info!(
                "No label file at {}, using {} built-in labels",
                path.display(),
                DEFAULT_LABELS.len()
            );
            return Self::default();
        }

        match Self::from_file(path) {
            Ok(labels) => {
                log::info!("Loaded {} labels from {}", labels.len(), path.display());
                labels
            }
            Err(e) => {
                log::error!(
                    "Failed to load labels from {}: {}. Falling back to built-in labels",
                    path.display(),
                    e
                );
                Self::default()
            }
        }
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&str> {
        self.labels.get(index).map(String::as_str)
    }

    /// Label for `index`, or a synthetic `class_<index>` when the list is
    /// shorter than the model output.
    pub fn name_for(&self, index: usize) -> String {
        self.get(index)
            .map(str::to_string)
            .unwrap_or_else(|| format!("class_{}", index))
    }

    pub fn as_slice(&self) -> &[String] {
        &self.labels
    }

    /// Whether the label count matches the width of the model's output vector.
    pub fn matches_output_width(&self, width: usize) -> bool {
        self.labels.len() == width
    }
}
