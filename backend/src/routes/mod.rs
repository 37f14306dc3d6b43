pub mod contact;
pub mod health;
pub mod predict;

use actix_files::Files;
use actix_web::{HttpResponse, web};
use log::error;
use std::path::PathBuf;

use crate::flash::{Flash, PendingFlash, removal_cookie};
use crate::pages::{FLASH_SLOT, Pages, RESULT_SLOT};

pub fn configure_routes(cfg: &mut web::ServiceConfig, static_dir: PathBuf, upload_dir: PathBuf) {
    cfg.service(web::resource("/").route(web::get().to(index)))
        .service(web::resource("/about").route(web::get().to(about)))
        .service(web::resource("/team").route(web::get().to(team)))
        .service(
            web::resource("/contact")
                .app_data(contact::form_config())
                .route(web::get().to(contact::contact_page))
                .route(web::post().to(contact::submit_contact)),
        )
        .service(
            web::resource("/predict")
                .route(web::get().to(predict::predict_page))
                .route(web::post().to(predict::submit_prediction)),
        )
        .service(web::resource("/healthz").route(web::get().to(health::healthz)))
        .service(Files::new("/static/uploads", upload_dir))
        .service(Files::new("/static", static_dir));
}

/// Renders `name` with the pending flash (if any) and an optional result
/// fragment. Any flash cookie the request carried is cleared from the client.
pub(crate) async fn render_page(
    pages: &Pages,
    name: &str,
    pending: PendingFlash,
    result: Option<String>,
) -> HttpResponse {
    let flash_html = pending.flash.as_ref().map(Flash::render).unwrap_or_default();
    let result_html = result.unwrap_or_default();

    match pages
        .render(name, &[(FLASH_SLOT, &flash_html), (RESULT_SLOT, &result_html)])
        .await
    {
        Ok(html) => {
            let mut response = HttpResponse::Ok();
            response.content_type("text/html; charset=utf-8");
            if pending.present {
                response.cookie(removal_cookie());
            }
            response.body(html)
        }
        Err(e) => {
            error!("Failed to render page {}: {}", name, e);
            HttpResponse::InternalServerError().body("Page unavailable")
        }
    }
}

async fn index(pages: web::Data<Pages>) -> HttpResponse {
    render_page(&pages, "index", PendingFlash::default(), None).await
}

async fn about(pages: web::Data<Pages>) -> HttpResponse {
    render_page(&pages, "about", PendingFlash::default(), None).await
}

async fn team(pages: web::Data<Pages>) -> HttpResponse {
    render_page(&pages, "team", PendingFlash::default(), None).await
}


#[cfg(test)]
mod tests {
    use super::test_support;
    use crate::flash::FLASH_COOKIE;
    use crate::mail::DisabledMailer;
    use actix_web::http::{StatusCode, header};
    use actix_web::test;
    use std::sync::Arc;

    #[actix_web::test]
    async fn serves_static_pages() {
        let dir = tempfile::tempdir().unwrap();
        let app = test::init_service(test_support::app(
            Arc::new(DisabledMailer),
            None,
            dir.path(),
            1024,
        ))
        .await;

        for (path, marker) in [
            ("/", "LeafCare"),
            ("/about", "About"),
            ("/team", "Team"),
            ("/contact", "<form"),
            ("/predict", "multipart/form-data"),
        ] {
            let req = test::TestRequest::get().uri(path).to_request();
            let resp = test::call_service(&app, req).await;
            assert_eq!(resp.status(), StatusCode::OK, "GET {}", path);
            let body = test::read_body(resp).await;
            let html = std::str::from_utf8(&body).unwrap();
            assert!(html.contains(marker), "GET {} missing {:?}", path, marker);
            assert!(!html.contains("<!-- flash -->"));
        }
    }

    #[actix_web::test]
    async fn serves_stylesheet() {
        let dir = tempfile::tempdir().unwrap();
        let app = test::init_service(test_support::app(
            Arc::new(DisabledMailer),
            None,
            dir.path(),
            1024,
        ))
        .await;

        let req = test::TestRequest::get().uri("/static/css/style.css").to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);
    }

    #[actix_web::test]
    async fn invalid_flash_cookie_is_cleared() {
        let dir = tempfile::tempdir().unwrap();
        let app = test::init_service(test_support::app(
            Arc::new(DisabledMailer),
            None,
            dir.path(),
            1024,
        ))
        .await;

        let req = test::TestRequest::get()
            .uri("/contact")
            .insert_header((header::COOKIE, "flash=not-signed-by-us"))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);
        assert!(
            resp.response()
                .cookies()
                .any(|c| c.name() == FLASH_COOKIE && c.value().is_empty())
        );
        let body = test::read_body(resp).await;
        assert!(!std::str::from_utf8(&body).unwrap().contains("flash-"));
    }
}
