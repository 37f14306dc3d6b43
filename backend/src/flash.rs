use actix_web::cookie::{Cookie, CookieJar, Key, SameSite};
use actix_web::{HttpRequest, HttpResponse};
use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use sha2::{Digest, Sha256};

use crate::pages::escape_html;

pub const FLASH_COOKIE: &str = "flash";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlashLevel {
    Success,
    Error,
}

impl FlashLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            FlashLevel::Success => "success",
            FlashLevel::Error => "error",
        }
    }
}

/// A one-shot message shown on the page a redirect lands on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Flash {
    pub level: FlashLevel,
    pub message: String,
}

impl Flash {
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            level: FlashLevel::Success,
            message: message.into(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            level: FlashLevel::Error,
            message: message.into(),
        }
    }

    /// Cookie-safe payload. Browsers send cookie values back as-is, so the
    /// encoding must not produce `%`, `;`, `,` or spaces.
    fn encode(&self) -> String {
        URL_SAFE_NO_PAD.encode(format!("{}:{}", self.level.as_str(), self.message))
    }

    fn decode(value: &str) -> Option<Self> {
        let bytes = URL_SAFE_NO_PAD.decode(value).ok()?;
        let decoded = String::from_utf8(bytes).ok()?;
        let (level, message) = decoded.split_once(':')?;
        let level = match level {
            "success" => FlashLevel::Success,
            "error" => FlashLevel::Error,
            _ => return None,
        };
        Some(Self {
            level,
            message: message.to_string(),
        })
    }

    pub fn render(&self) -> String {
        format!(
            r#"<div class="flash flash-{}" role="alert">{}</div>"#,
            self.level.as_str(),
            escape_html(&self.message)
        )
    }
}

/// What a request carried in its flash cookie.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct PendingFlash {
    pub flash: Option<Flash>,
    /// A flash cookie was sent, whether or not it verified.
    pub present: bool,
}

/// Signing key for flash cookies, derived from `SECRET_KEY`.
#[derive(Clone)]
pub struct FlashKey(Key);

impl FlashKey {
    pub fn from_secret(secret: &str) -> Self {
        let digest = Sha256::digest(secret.as_bytes());
        Self(Key::derive_from(&digest))
    }

    pub fn cookie_for(&self, flash: &Flash) -> Option<Cookie<'static>> {
        let cookie = Cookie::build(FLASH_COOKIE, flash.encode())
            .path("/")
            .http_only(true)
            .same_site(SameSite::Lax)
            .finish();
        let mut jar = CookieJar::new();
        jar.signed_mut(&self.0).add(cookie);
        jar.get(FLASH_COOKIE).cloned()
    }

    /// Reads the pending flash from the request. Unsigned or tampered cookies
    /// yield no flash but are still reported as present so the page clears
    /// them.
    pub fn take(&self, req: &HttpRequest) -> PendingFlash {
        let Some(cookie) = req.cookie(FLASH_COOKIE) else {
            return PendingFlash::default();
        };
        let mut jar = CookieJar::new();
        jar.add_original(cookie);
        let flash = match jar.signed(&self.0).get(FLASH_COOKIE) {
            Some(verified) => Flash::decode(verified.value()),
            None => {
                log::warn!("Discarding flash cookie with an invalid signature");
                None
            }
        };
        PendingFlash {
            flash,
            present: true,
        }
    }
}

pub fn removal_cookie() -> Cookie<'static> {
    let mut cookie = Cookie::build(FLASH_COOKIE, "").path("/").finish();
    cookie.make_removal();
    cookie
}

/// Redirects to `location`, carrying `flash` to the next page.
pub fn redirect_with_flash(location: &str, flash: Flash, key: &FlashKey) -> HttpResponse {
    let mut response = HttpResponse::Found();
    response.append_header(("Location", location));
    if let Some(cookie) = key.cookie_for(&flash) {
        response.cookie(cookie);
    }
    response.finish()
}
