use actix_web::middleware::Logger;
use actix_web::{App, HttpServer, web};
use leafcare_backend::classifier::Classifier;
use leafcare_backend::classifier::config::PreprocessingConfig;
use leafcare_backend::config::AppConfig;
use leafcare_backend::flash::FlashKey;
use leafcare_backend::mail::smtp::SmtpMailer;
use leafcare_backend::mail::{DisabledMailer, Mailer};
use leafcare_backend::pages::Pages;
use leafcare_backend::routes::configure_routes;
use leafcare_backend::storage::upload_service::UploadService;
use std::env;
use std::sync::Arc;

fn startup_error(context: &str, e: impl std::fmt::Display) -> std::io::Error {
    std::io::Error::other(format!("{}: {}", context, e))
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    dotenv::dotenv().ok();
    env_logger::init_from_env(env_logger::Env::new().default_filter_or("info"));

    if let Ok(current_dir) = env::current_dir() {
        log::info!("Current working directory: {}", current_dir.display());
    } else {
        log::error!("Failed to get the current working directory.");
    }

    let config = AppConfig::from_env().map_err(|e| {
        log::error!("Invalid configuration: {}", e);
        startup_error("Invalid configuration", e)
    })?;
    config.log_mail_settings();

    let mailer: Arc<dyn Mailer> = if config.mail.is_configured() {
        match SmtpMailer::new(&config.mail) {
            Ok(mailer) => Arc::new(mailer),
            Err(e) => {
                log::error!("Failed to set up SMTP relay: {}", e);
                Arc::new(DisabledMailer)
            }
        }
    } else {
        Arc::new(DisabledMailer)
    };

    let preprocessing = PreprocessingConfig::load(&config.preprocessing_config_path)
        .map_err(|e| startup_error("Invalid preprocessing config", e))?;
    let classifier = Classifier::load(&config.model_path, &config.class_names_path, preprocessing);
    let status = classifier.status();
    if status.model_loaded {
        log::info!("Model ready with {} class labels", status.num_classes);
    } else {
        log::warn!("Serving without a model; /predict will report it as unavailable");
    }

    std::fs::create_dir_all(&config.upload_dir)?;

    let pages = web::Data::new(Pages::new(&config.static_dir));
    let flash_key = web::Data::new(FlashKey::from_secret(&config.secret_key));
    let mailer = web::Data::from(mailer);
    let classifier = web::Data::new(classifier);
    let uploads = web::Data::new(UploadService::new(
        config.upload_dir.clone(),
        config.max_upload_bytes,
    ));

    let static_dir = config.static_dir.clone();
    let upload_dir = config.upload_dir.clone();
    let bind_address = config.bind_addr();

    log::info!("Serving static files from {}", static_dir.display());
    log::info!("Starting server on {}", bind_address);

    HttpServer::new(move || {
        App::new()
            .wrap(Logger::default())
            .app_data(pages.clone())
            .app_data(flash_key.clone())
            .app_data(mailer.clone())
            .app_data(classifier.clone())
            .app_data(uploads.clone())
            .configure(|cfg| configure_routes(cfg, static_dir.clone(), upload_dir.clone()))
    })
    .bind(&bind_address)?
    .run()
    .await
}
