use log::info;

use crate::error::Error;
use crate::{mailer, turnstile};

#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub database_url: String,
    pub admin_token: Option<String>,
    pub allowed_origins: Vec<String>,
    pub preview_project: Option<String>,
    pub turnstile_secret: Option<String>,
    pub turnstile_verify_url: String,
    pub resend_api_key: Option<String>,
    pub resend_api_url: String,
    pub resend_from: String,
    pub admin_notify_email: Option<String>,
    pub resend_account_email: Option<String>,
    pub send_applicant_confirmation: bool,
    pub upload_path: String,
    pub public_base_url: Option<String>,
}

impl Config {
    pub fn from_env() -> Result<Self, Error> {
        let database_url = optional("DATABASE_URL")
            .ok_or_else(|| Error::Config("DATABASE_URL not set".into()))?;
        Ok(Config {
            port: optional("PORT").and_then(|v| v.parse().ok()).unwrap_or(8000),
            database_url,
            admin_token: optional("ADMIN_DASH_TOKEN"),
            allowed_origins: split_origins(&optional("ALLOWED_ORIGINS").unwrap_or_default()),
            preview_project: optional("PREVIEW_PROJECT"),
            turnstile_secret: optional("TURNSTILE_SECRET_KEY"),
            turnstile_verify_url: turnstile::VERIFY_URL.to_string(),
            resend_api_key: optional("RESEND_API_KEY"),
            resend_api_url: mailer::RESEND_API_URL.to_string(),
            resend_from: optional("RESEND_FROM").unwrap_or_else(|| mailer::DEFAULT_FROM.to_string()),
            admin_notify_email: optional("ADMIN_NOTIFY_EMAIL"),
            resend_account_email: optional("RESEND_ACCOUNT_EMAIL"),
            send_applicant_confirmation: flag("SEND_APPLICANT_CONFIRMATION"),
            upload_path: optional("UPLOAD_PATH").unwrap_or_else(|| "./uploads".to_string()),
            public_base_url: optional("PUBLIC_BASE_URL").map(|v| v.trim_end_matches('/').to_string()),
        })
    }

    // Booleans only, never values.
    pub fn log_presence(&self) {
        info!(
            "env presence: ADMIN_DASH_TOKEN={} ALLOWED_ORIGINS={} TURNSTILE_SECRET_KEY={} RESEND_API_KEY={} ADMIN_NOTIFY_EMAIL={} RESEND_ACCOUNT_EMAIL={}",
            self.admin_token.is_some(),
            !self.allowed_origins.is_empty(),
            self.turnstile_secret.is_some(),
            self.resend_api_key.is_some(),
            self.admin_notify_email.is_some(),
            self.resend_account_email.is_some(),
        );
    }
}

fn optional(key: &str) -> Option<String> {
    dotenv::var(key)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn flag(key: &str) -> bool {
    matches!(
        optional(key).map(|v| v.to_ascii_lowercase()).as_deref(),
        Some("1") | Some("true") | Some("yes")
    )
}

pub fn split_origins(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| s.trim_end_matches('/').to_string())
        .collect()
}
