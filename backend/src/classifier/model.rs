use ndarray::Array4;
use std::path::Path;

#[allow(dead_code)]
#[derive(Debug, thiserror::Error)]
pub enum InferenceError {
    #[error("Model file not found: {0}")]
    ModelNotFound(String),
    #[error("This build has no inference runtime (enable the `torch` feature)")]
    RuntimeUnavailable,
    #[error("Model lock poisoned")]
    LockPoisoned,
    #[error("Input tensor is not contiguous")]
    NonContiguousInput,
    #[cfg(feature = "torch")]
    #[error("Model error: {0}")]
    ModelError(#[from] tch::TchError),
}

/// A loaded model exposing one batched forward pass. Input is `[N, 3, H, W]`,
/// output is the flattened `[N, C]` score matrix.
pub trait InferenceBackend: Send + Sync {
    fn forward(&self, batch: &Array4<f32>) -> Result<Vec<f32>, InferenceError>;

    /// Runs a zero batch of the given spatial size and reports the output width.
    fn probe_output_width(&self, width: u32, height: u32) -> Result<usize, InferenceError> {
        let zeros = Array4::<f32>::zeros((1, 3, height as usize, width as usize));
        Ok(self.forward(&zeros)?.len())
    }
}

#[cfg(feature = "torch")]
mod torch {
    use super::{InferenceBackend, InferenceError};
    use ndarray::Array4;
    use std::sync::Mutex;
    use tch::{CModule, Device, Kind, Tensor};

    /// TorchScript module, loaded once and shared read-only across workers.
    pub struct TorchModel {
        model: Mutex<CModule>,
        device: Device,
    }

    impl TorchModel {
        pub fn load(model_path: &str) -> Result<Self, InferenceError> {
            let device = Device::cuda_if_available();
            let mut model = CModule::load_on_device(model_path, device)?;
            model.set_eval();
            log::info!("Loaded TorchScript model {} on {:?}", model_path, device);
            Ok(Self {
                model: Mutex::new(model),
                device,
            })
        }
    }

    impl InferenceBackend for TorchModel {
        fn forward(&self, batch: &Array4<f32>) -> Result<Vec<f32>, InferenceError> {
            let shape: Vec<i64> = batch.shape().iter().map(|d| *d as i64).collect();
            let data = batch.as_slice().ok_or(InferenceError::NonContiguousInput)?;
            let input = Tensor::from_slice(data)
                .reshape(shape.as_slice())
                .to_device(self.device);

            let output = {
                let model = self.model.lock().map_err(|_| InferenceError::LockPoisoned)?;
                tch::no_grad(|| model.forward_ts(&[input]))?
            };

            let output_flat = output
                .to_device(Device::Cpu)
                .to_kind(Kind::Float)
                .view([-1]);
            let output_vec = Vec::<f32>::try_from(&output_flat)?;
            Ok(output_vec)
        }
    }
}

#[cfg(feature = "torch")]
pub use torch::TorchModel;

/// Loads the model artifact at `model_path` with the compiled-in runtime.
pub fn load_backend(model_path: &Path) -> Result<Box<dyn InferenceBackend>, InferenceError> {
    if !model_path.exists() {
        return Err(InferenceError::ModelNotFound(model_path.display().to_string()));
    }

    #[cfg(feature = "torch")]
    {
        let model = TorchModel::load(&model_path.to_string_lossy())?;
        Ok(Box::new(model))
    }

    #[cfg(not(feature = "torch"))]
    {
        Err(InferenceError::RuntimeUnavailable)
    }
}
