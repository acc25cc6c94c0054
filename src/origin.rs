use actix_web::http::header::{ORIGIN, REFERER};
use actix_web::HttpRequest;
use reqwest::Url;

use crate::config::Config;

const PREVIEW_SUFFIX: &str = ".vercel.app";

// Browser origin allowlist for the public submission endpoint. Requests
// without an Origin or Referer header (curl, server-to-server) are let
// through; the Turnstile check still stands between them and the database.
#[derive(Debug, Clone)]
pub struct OriginPolicy {
    allowed: Vec<String>,
    preview_project: Option<String>,
}

impl OriginPolicy {
    pub fn new(allowed: Vec<String>, preview_project: Option<String>) -> Self {
        Self {
            allowed,
            preview_project,
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(config.allowed_origins.clone(), config.preview_project.clone())
    }

    pub fn is_allowed(&self, origin: &str) -> bool {
        if self.allowed.iter().any(|a| a == origin) {
            return true;
        }
        if let Some(project) = &self.preview_project {
            if let Ok(url) = Url::parse(origin) {
                if let Some(host) = url.host_str() {
                    return host.ends_with(PREVIEW_SUFFIX) && host.contains(project.as_str());
                }
            }
        }
        false
    }
}

// Origin header first, then the Referer reduced to its origin. An
// unparseable value comes back as None and is treated as absent.
pub fn request_origin(req: &HttpRequest) -> Option<String> {
    let raw = req
        .headers()
        .get(ORIGIN)
        .or_else(|| req.headers().get(REFERER))?
        .to_str()
        .ok()?;
    let url = Url::parse(raw).ok()?;
    Some(url.origin().ascii_serialization())
}
