//! Settings data models
//!
//! `SiteSettings` is the photographer profile stored on the backend.
//! `ClientConfig` is the local configuration of this client.

use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::utils::error::{AppError, AppResult};

pub const DEFAULT_PHOTOGRAPHY_NAME: &str = "Wedding Clickz Photography";
pub const DEFAULT_EMAIL: &str = "info@weddingclickz.com";
pub const DEFAULT_INSTAGRAM: &str = "https://instagram.com/weddingclickz";
pub const DEFAULT_YOUTUBE: &str = "https://youtube.com/@weddingclickz";
pub const DEFAULT_WHATSAPP: &str = "1234567890";
pub const DEFAULT_LOCATION: &str = "https://maps.google.com/?q=Bangalore";

/// Photographer settings as exchanged with the backend.
///
/// Every field may be missing; unknown fields are ignored.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SiteSettings {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub photography_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub instagram_link: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub youtube_link: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub whatsapp_number: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location_link: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bride_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub groom_name: Option<String>,
}

/// Settings with display defaults applied; every field is present.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolvedSettings {
    pub photography_name: String,
    pub email: String,
    pub instagram_link: String,
    pub youtube_link: String,
    pub whatsapp_number: String,
    pub location_link: String,
    pub bride_name: String,
    pub groom_name: String,
}

fn clean(value: &Option<String>) -> Option<String> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

fn is_http_link(value: &str) -> bool {
    value.starts_with("https://") || value.starts_with("http://")
}

impl SiteSettings {
    /// Field names accepted by [`SiteSettings::set_field`].
    pub const FIELDS: [&'static str; 8] = [
        "photography_name",
        "email",
        "instagram_link",
        "youtube_link",
        "whatsapp_number",
        "location_link",
        "bride_name",
        "groom_name",
    ];

    /// Trim every field and drop blank ones.
    pub fn normalized(&self) -> Self {
        Self {
            photography_name: clean(&self.photography_name),
            email: clean(&self.email),
            instagram_link: clean(&self.instagram_link),
            youtube_link: clean(&self.youtube_link),
            whatsapp_number: clean(&self.whatsapp_number),
            location_link: clean(&self.location_link),
            bride_name: clean(&self.bride_name),
            groom_name: clean(&self.groom_name),
        }
    }

    /// Check the fields that have a recognizable shape.
    pub fn validate(&self) -> AppResult<()> {
        let s = self.normalized();

        if let Some(email) = &s.email {
            let valid = email
                .split_once('@')
                .map(|(user, domain)| !user.is_empty() && domain.contains('.'))
                .unwrap_or(false);
            if !valid {
                return Err(AppError::Config(format!("invalid email: {}", email)));
            }
        }

        for (name, link) in [
            ("instagram_link", &s.instagram_link),
            ("youtube_link", &s.youtube_link),
            ("location_link", &s.location_link),
        ] {
            if let Some(link) = link {
                if !is_http_link(link) {
                    return Err(AppError::Config(format!("{} must be an http(s) URL", name)));
                }
            }
        }

        if let Some(number) = &s.whatsapp_number {
            let digits = number.strip_prefix('+').unwrap_or(number);
            if digits.is_empty() || !digits.chars().all(|c| c.is_ascii_digit()) {
                return Err(AppError::Config(format!(
                    "whatsapp_number must contain digits only: {}",
                    number
                )));
            }
        }

        Ok(())
    }

    /// Apply display defaults for missing fields.
    pub fn resolved(&self) -> ResolvedSettings {
        let s = self.normalized();
        ResolvedSettings {
            photography_name: s
                .photography_name
                .unwrap_or_else(|| DEFAULT_PHOTOGRAPHY_NAME.to_string()),
            email: s.email.unwrap_or_else(|| DEFAULT_EMAIL.to_string()),
            instagram_link: s
                .instagram_link
                .unwrap_or_else(|| DEFAULT_INSTAGRAM.to_string()),
            youtube_link: s.youtube_link.unwrap_or_else(|| DEFAULT_YOUTUBE.to_string()),
            whatsapp_number: s
                .whatsapp_number
                .unwrap_or_else(|| DEFAULT_WHATSAPP.to_string()),
            location_link: s
                .location_link
                .unwrap_or_else(|| DEFAULT_LOCATION.to_string()),
            bride_name: s.bride_name.unwrap_or_default(),
            groom_name: s.groom_name.unwrap_or_default(),
        }
    }

    /// Set one field by its wire name. An empty value clears the field.
    pub fn set_field(&mut self, field: &str, value: &str) -> AppResult<()> {
        let value = Some(value.to_string());
        let slot = match field {
            "photography_name" => &mut self.photography_name,
            "email" => &mut self.email,
            "instagram_link" => &mut self.instagram_link,
            "youtube_link" => &mut self.youtube_link,
            "whatsapp_number" => &mut self.whatsapp_number,
            "location_link" => &mut self.location_link,
            "bride_name" => &mut self.bride_name,
            "groom_name" => &mut self.groom_name,
            other => {
                return Err(AppError::Config(format!("unknown settings field: {}", other)))
            }
        };
        *slot = clean(&value);
        Ok(())
    }
}

/// Local client configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ClientConfig {
    /// Backend base URL
    pub backend_url: String,
    /// Gallery refresh interval (seconds)
    pub poll_interval_secs: u64,
    /// Bound on a single gallery fetch (seconds)
    pub fetch_timeout_secs: u64,
    /// Minimum horizontal swipe/drag distance for lightbox navigation
    pub swipe_threshold: f32,
    /// Header background rotation interval (seconds)
    pub slideshow_interval_secs: u64,
    /// Largest accepted upload (bytes)
    pub max_upload_bytes: u64,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            backend_url: String::from("http://localhost:8000"),
            poll_interval_secs: 10,
            fetch_timeout_secs: 30,
            swipe_threshold: 50.0,
            slideshow_interval_secs: 4,
            max_upload_bytes: 10 * 1024 * 1024, // 10MB
        }
    }
}

impl ClientConfig {
    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.poll_interval_secs.max(1))
    }

    pub fn fetch_timeout(&self) -> Duration {
        Duration::from_secs(self.fetch_timeout_secs.max(1))
    }

    pub fn slideshow_interval(&self) -> Duration {
        Duration::from_secs(self.slideshow_interval_secs.max(1))
    }

    /// Backend URL without a trailing slash.
    pub fn base_url(&self) -> &str {
        self.backend_url.trim_end_matches('/')
    }

    pub fn validate(&self) -> AppResult<()> {
        if !is_http_link(self.base_url()) {
            return Err(AppError::Config(format!(
                "backendUrl must be an http(s) URL: {}",
                self.backend_url
            )));
        }
        if !(self.swipe_threshold.is_finite() && self.swipe_threshold > 0.0) {
            return Err(AppError::Config("swipeThreshold must be positive".into()));
        }
        Ok(())
    }
}
