use serde::Serialize;

use super::labels::ClassLabels;

const DISTRIBUTION_TOLERANCE: f32 = 1e-3;

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct Prediction {
    pub label: String,
    pub class_index: usize,
    pub confidence: f32,
    pub probabilities: Vec<f32>,
}

impl Prediction {
    /// Maps a raw output vector onto a labelled prediction. Returns `None` for
    /// an empty or non-finite vector.
    pub fn from_output(output: &[f32], labels: &ClassLabels) -> Option<Self> {
        if output.is_empty() || output.iter().any(|v| !v.is_finite()) {
            return None;
        }

        let probabilities = if is_distribution(output) {
            output.to_vec()
        } else {
            softmax(output)
        };

        let (class_index, confidence) = probabilities
            .iter()
            .copied()
            .enumerate()
            .fold((0, f32::NEG_INFINITY), |best, (i, p)| {
                if p > best.1 { (i, p) } else { best }
            });

        Some(Self {
            label: labels.name_for(class_index),
            class_index,
            confidence,
            probabilities,
        })
    }

    pub fn confidence_percent(&self) -> f32 {
        self.confidence * 100.0
    }
}

fn is_distribution(values: &[f32]) -> bool {
    let sum: f32 = values.iter().sum();
    values.iter().all(|v| (0.0..=1.0).contains(v)) && (sum - 1.0).abs() <= DISTRIBUTION_TOLERANCE
}

pub fn softmax(logits: &[f32]) -> Vec<f32> {
    let max = logits.iter().copied().fold(f32::NEG_INFINITY, f32::max);
    let exps: Vec<f32> = logits.iter().map(|v| (v - max).exp()).collect();
    let sum: f32 = exps.iter().sum();
    exps.into_iter().map(|e| e / sum).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keeps_probabilities_and_picks_argmax() {
        let labels = ClassLabels::default();
        let mut output = vec![0.0f32; 10];
        output[2] = 0.7;
        output[9] = 0.3;

        let prediction = Prediction::from_output(&output, &labels).unwrap();
        assert_eq!(prediction.class_index, 2);
        assert_eq!(prediction.label, "Tomato___Late_blight");
        assert!((prediction.confidence - 0.7).abs() < 1e-6);
        assert_eq!(prediction.probabilities, output);
        assert!((prediction.confidence_percent() - 70.0).abs() < 1e-3);
    }

    #[test]
    fn applies_softmax_to_logits() {
        let labels = ClassLabels::new(vec!["a".into(), "b".into(), "c".into()]).unwrap();
        let prediction = Prediction::from_output(&[1.0, 3.0, -2.0], &labels).unwrap();

        assert_eq!(prediction.label, "b");
        let total: f32 = prediction.probabilities.iter().sum();
        assert!((total - 1.0).abs() < 1e-5);
        assert!(prediction.confidence > 0.8 && prediction.confidence < 1.0);
    }

    #[test]
    fn rejects_empty_and_nan_output() {
        let labels = ClassLabels::default();
        assert!(Prediction::from_output(&[], &labels).is_none());
        assert!(Prediction::from_output(&[0.5, f32::NAN], &labels).is_none());
    }

    #[test]
    fn softmax_is_stable_for_large_logits() {
        let probs = softmax(&[1000.0, 1000.0]);
        assert!((probs[0] - 0.5).abs() < 1e-6);
        assert!((probs[1] - 0.5).abs() < 1e-6);
    }
}
