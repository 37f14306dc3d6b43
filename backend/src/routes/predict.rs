use actix_multipart::Multipart;
use actix_web::http::{StatusCode, header};
use actix_web::{HttpRequest, HttpResponse, web};
use log::{error, info};
use shared::{ErrorResponse, PredictionResponse};

use super::render_page;
use crate::classifier::prediction::Prediction;
use crate::classifier::{Classifier, ClassifyError};
use crate::flash::{Flash, FlashKey, redirect_with_flash};
use crate::pages::{Pages, escape_html};
use crate::storage::upload_service::{UploadError, UploadService};

const PREDICT_PATH: &str = "/predict";

#[derive(Debug, thiserror::Error)]
pub enum PredictError {
    #[error(transparent)]
    Upload(#[from] UploadError),
    #[error(transparent)]
    Classify(#[from] ClassifyError),
    #[error("Prediction was interrupted: {0}")]
    Blocking(String),
}

impl PredictError {
    fn status_code(&self) -> StatusCode {
        match self {
            PredictError::Upload(UploadError::Io(_)) => StatusCode::INTERNAL_SERVER_ERROR,
            PredictError::Upload(UploadError::FileTooLarge { .. }) => StatusCode::PAYLOAD_TOO_LARGE,
            PredictError::Upload(_) => StatusCode::BAD_REQUEST,
            PredictError::Classify(ClassifyError::ModelNotLoaded) => StatusCode::SERVICE_UNAVAILABLE,
            PredictError::Classify(ClassifyError::Image(_)) => StatusCode::BAD_REQUEST,
            PredictError::Classify(_) | PredictError::Blocking(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

fn wants_json(req: &HttpRequest) -> bool {
    req.headers()
        .get(header::ACCEPT)
        .and_then(|v| v.to_str().ok())
        .map(|v| v.contains("application/json"))
        .unwrap_or(false)
}

/// `Tomato___Late_blight` -> `Tomato - Late blight`.
pub fn display_label(label: &str) -> String {
    label.replace("___", " - ").replace('_', " ")
}

fn render_result(prediction: &Prediction, image_url: &str) -> String {
    format!(
        r#"<section class="result">
  <img src="{url}" alt="Uploaded leaf">
  <h2>{label}</h2>
  <p class="confidence">Confidence: {confidence:.2}%</p>
</section>"#,
        url = escape_html(image_url),
        label = escape_html(&display_label(&prediction.label)),
        confidence = prediction.confidence_percent(),
    )
}

pub async fn predict_page(
    req: HttpRequest,
    pages: web::Data<Pages>,
    flash_key: web::Data<FlashKey>,
) -> HttpResponse {
    render_page(&pages, "predict", flash_key.take(&req), None).await
}

async fn run_prediction(
    payload: Multipart,
    uploads: &UploadService,
    classifier: web::Data<Classifier>,
) -> Result<(Prediction, String), PredictError> {
    if !classifier.is_loaded() {
        return Err(ClassifyError::ModelNotLoaded.into());
    }

    let upload = uploads.read_image_field(payload).await?;
    let filename = uploads.save(&upload).await?;
    drop(upload);

    let path = uploads.path_for(&filename);
    let prediction = web::block(move || classifier.classify_file(&path))
        .await
        .map_err(|e| PredictError::Blocking(e.to_string()))??;

    Ok((prediction, filename))
}

pub async fn submit_prediction(
    req: HttpRequest,
    payload: Multipart,
    pages: web::Data<Pages>,
    flash_key: web::Data<FlashKey>,
    uploads: web::Data<UploadService>,
    classifier: web::Data<Classifier>,
) -> HttpResponse {
    let json = wants_json(&req);
    let labels = classifier.labels().as_slice().to_vec();

    match run_prediction(payload, &uploads, classifier).await {
        Ok((prediction, filename)) => {
            info!(
                "Predicted {} ({:.2}%) for {}",
                prediction.label,
                prediction.confidence_percent(),
                filename
            );
            let image_url = UploadService::public_url(&filename);
            if json {
                return HttpResponse::Ok().json(PredictionResponse {
                    label: prediction.label,
                    class_index: prediction.class_index,
                    confidence: prediction.confidence,
                    probabilities: prediction.probabilities,
                    class_labels: labels,
                    image_url,
                });
            }
            let result = render_result(&prediction, &image_url);
            render_page(&pages, "predict", flash_key.take(&req), Some(result)).await
        }
        Err(e) => {
            error!("Prediction failed: {}", e);
            if json {
                return HttpResponse::build(e.status_code()).json(ErrorResponse {
                    error: e.to_string(),
                });
            }
            redirect_with_flash(PREDICT_PATH, Flash::error(e.to_string()), &flash_key)
        }
    }
}
