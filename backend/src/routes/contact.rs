use actix_web::error::{InternalError, UrlencodedError};
use actix_web::{HttpRequest, HttpResponse, web};
use log::{error, info};

use super::render_page;
use crate::flash::{Flash, FlashKey, redirect_with_flash};
use crate::mail::Mailer;
use crate::mail::models::{ContactSubmission, ValidationError};
use crate::pages::Pages;

const CONTACT_PATH: &str = "/contact";
pub const CONTACT_FORM_LIMIT: usize = 64 * 1024;

/// Form extractor settings for `POST /contact`. A body that cannot be read
/// as a form is flashed and redirected like any other failure.
pub fn form_config() -> web::FormConfig {
    web::FormConfig::default()
        .limit(CONTACT_FORM_LIMIT)
        .error_handler(reject_form)
}

fn reject_form(err: UrlencodedError, req: &HttpRequest) -> actix_web::Error {
    error!("Unreadable contact form: {}", err);
    let message = match &err {
        UrlencodedError::Overflow { .. } => "Your message is too long.",
        _ => "Your message could not be read. Please try again.",
    };
    match req.app_data::<web::Data<FlashKey>>() {
        Some(flash_key) => {
            let response = redirect_with_flash(CONTACT_PATH, Flash::error(message), flash_key);
            InternalError::from_response(err, response).into()
        }
        None => err.into(),
    }
}

pub async fn contact_page(
    req: HttpRequest,
    pages: web::Data<Pages>,
    flash_key: web::Data<FlashKey>,
) -> HttpResponse {
    render_page(&pages, "contact", flash_key.take(&req), None).await
}

pub async fn submit_contact(
    form: web::Form<ContactSubmission>,
    mailer: web::Data<dyn Mailer>,
    flash_key: web::Data<FlashKey>,
) -> HttpResponse {
    let email = match form.validate() {
        Ok(email) => email,
        Err(ValidationError::MissingFields(fields)) => {
            info!("Rejected contact form, missing: {}", fields.join(", "));
            return redirect_with_flash(
                CONTACT_PATH,
                Flash::error("Please fill in all fields."),
                &flash_key,
            );
        }
    };

    match mailer.send(email).await {
        Ok(()) => {
            info!("Contact form from {} relayed", form.email.trim());
            redirect_with_flash(
                CONTACT_PATH,
                Flash::success("Your message has been sent successfully!"),
                &flash_key,
            )
        }
        Err(e) => {
            error!("Error sending email: {}", e);
            redirect_with_flash(
                CONTACT_PATH,
                Flash::error(format!(
                    "An error occurred while sending your message: {}",
                    e
                )),
                &flash_key,
            )
        }
    }
}
