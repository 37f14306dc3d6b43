use serde::{Deserialize, Serialize};

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct PredictionResponse {
    pub label: String,
    pub class_index: usize,
    /// Maximum class probability, in [0, 1].
    pub confidence: f32,
    pub probabilities: Vec<f32>,
    pub class_labels: Vec<String>,
    /// Public URL of the saved upload.
    pub image_url: String,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct HealthResponse {
    pub status: String,
    pub model_loaded: bool,
    pub num_classes: usize,
    pub output_width: Option<usize>,
    pub labels_consistent: Option<bool>,
    pub version: String,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct ErrorResponse {
    pub error: String,
}
