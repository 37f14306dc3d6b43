use actix_web::{HttpResponse, web};
use shared::HealthResponse;

use crate::classifier::Classifier;

/// Liveness plus model status. Always 200; `model_loaded` tells whether
/// predictions can be served.
pub async fn healthz(classifier: web::Data<Classifier>) -> HttpResponse {
    let status = classifier.status();
    HttpResponse::Ok().json(HealthResponse {
        status: "ok".to_string(),
        model_loaded: status.model_loaded,
        num_classes: status.num_classes,
        output_width: status.output_width,
        labels_consistent: status.labels_consistent,
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::super::test_support;
    use crate::classifier::testing::{StaticBackend, one_hot};
    use crate::mail::DisabledMailer;
    use actix_web::test;
    use shared::HealthResponse;
    use std::sync::Arc;

    async fn health_with(
        backend: Option<Box<dyn crate::classifier::model::InferenceBackend>>,
    ) -> HealthResponse {
        let dir = tempfile::tempdir().unwrap();
        let app = test::init_service(test_support::app(
            Arc::new(DisabledMailer),
            backend,
            dir.path(),
            1024,
        ))
        .await;
        let req = test::TestRequest::get().uri("/healthz").to_request();
        test::call_and_read_body_json(&app, req).await
    }

    #[actix_web::test]
    async fn reports_missing_model() {
        let health = health_with(None).await;
        assert_eq!(health.status, "ok");
        assert!(!health.model_loaded);
        assert_eq!(health.num_classes, 10);
        assert_eq!(health.output_width, None);
        assert_eq!(health.labels_consistent, None);
    }

    #[actix_web::test]
    async fn reports_loaded_model_and_label_consistency() {
        let health = health_with(Some(Box::new(StaticBackend(one_hot(10, 0))))).await;
        assert!(health.model_loaded);
        assert_eq!(health.num_classes, 10);
        assert_eq!(health.output_width, Some(10));
        assert_eq!(health.labels_consistent, Some(true));

        let health = health_with(Some(Box::new(StaticBackend(one_hot(15, 0))))).await;
        assert_eq!(health.output_width, Some(15));
        assert_eq!(health.labels_consistent, Some(false));
    }
}
