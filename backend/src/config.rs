use std::env;
use std::path::PathBuf;

const DEFAULT_SECRET_KEY: &str = "your-secret-key";
pub const DEFAULT_MAX_UPLOAD_BYTES: usize = 16 * 1024 * 1024;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{key} has an invalid value {value:?}: {reason}")]
    Invalid {
        key: &'static str,
        value: String,
        reason: String,
    },
}

#[derive(Debug, Clone)]
pub struct MailConfig {
    pub server: String,
    pub port: u16,
    pub use_tls: bool,
    pub username: Option<String>,
    pub password: Option<String>,
    pub default_sender: Option<String>,
    pub recipient: Option<String>,
}

impl MailConfig {
    pub fn is_configured(&self) -> bool {
        self.username.is_some() && self.password.is_some()
    }
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub secret_key: String,
    pub bind_address: String,
    pub port: u16,
    pub static_dir: PathBuf,
    pub upload_dir: PathBuf,
    pub model_path: PathBuf,
    pub class_names_path: PathBuf,
    pub preprocessing_config_path: PathBuf,
    pub max_upload_bytes: usize,
    pub mail: MailConfig,
}

fn parse_or<T>(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &'static str,
    default: T,
) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    match lookup(key) {
        Some(value) => {
            let parsed = value.trim().parse::<T>();
            parsed.map_err(|e| ConfigError::Invalid {
                key,
                value,
                reason: e.to_string(),
            })
        }
        None => Ok(default),
    }
}

fn default_static_dir() -> PathBuf {
    if let Ok(manifest_dir) = env::var("CARGO_MANIFEST_DIR") {
        PathBuf::from(format!("{}/static", manifest_dir))
    } else {
        PathBuf::from("/usr/src/app/static")
    }
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok().filter(|v| !v.is_empty()))
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let secret_key = lookup("SECRET_KEY").unwrap_or_else(|| {
            log::warn!("SECRET_KEY is not set, using the built-in development key");
            DEFAULT_SECRET_KEY.to_string()
        });

        let static_dir = lookup("STATIC_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(default_static_dir);
        let upload_dir = lookup("UPLOAD_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|| static_dir.join("uploads"));

        let username = lookup("MAIL_USERNAME");
        let mail = MailConfig {
            server: lookup("MAIL_SERVER").unwrap_or_else(|| "smtp.gmail.com".to_string()),
            port: parse_or(&lookup, "MAIL_PORT", 587)?,
            use_tls: parse_or(&lookup, "MAIL_USE_TLS", true)?,
            default_sender: lookup("MAIL_DEFAULT_SENDER").or_else(|| username.clone()),
            recipient: lookup("MAIL_RECIPIENT").or_else(|| username.clone()),
            password: lookup("MAIL_PASSWORD"),
            username,
        };

        Ok(Self {
            secret_key,
            bind_address: lookup("BIND_ADDRESS").unwrap_or_else(|| "0.0.0.0".to_string()),
            port: parse_or(&lookup, "PORT", 8081)?,
            static_dir,
            upload_dir,
            model_path: lookup("MODEL_PATH")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from("model/plant_disease_model.pt")),
            class_names_path: lookup("CLASS_NAMES_PATH")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from("class_names.json")),
            preprocessing_config_path: lookup("PREPROCESSING_CONFIG")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from("config/preprocessing.yaml")),
            max_upload_bytes: parse_or(&lookup, "MAX_UPLOAD_BYTES", DEFAULT_MAX_UPLOAD_BYTES)?,
            mail,
        })
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.bind_address, self.port)
    }

    /// Logs the mail setup without revealing the password.
    pub fn log_mail_settings(&self) {
        log::debug!("Mail server: {}", self.mail.server);
        log::debug!("Mail port: {}", self.mail.port);
        log::debug!(
            "Mail username: {}",
            self.mail.username.as_deref().unwrap_or("<unset>")
        );
        log::debug!(
            "Mail password set: {}",
            if self.mail.password.is_some() { "Yes" } else { "No" }
        );
        if !self.mail.is_configured() {
            log::warn!("MAIL_USERNAME / MAIL_PASSWORD not set; contact form submissions will fail");
        }
    }
}
