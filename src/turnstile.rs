use log::warn;
use reqwest::Client;
use serde::Deserialize;

use crate::config::Config;
use crate::error::Error;

pub const VERIFY_URL: &str = "https://challenges.cloudflare.com/turnstile/v0/siteverify";

#[derive(Debug, Clone)]
pub struct Turnstile {
    client: Client,
    secret: Option<String>,
    verify_url: String,
}

#[derive(Debug, Deserialize, Default)]
struct SiteverifyResponse {
    #[serde(default)]
    success: bool,
    #[serde(default, rename = "error-codes")]
    error_codes: Vec<String>,
}

impl Turnstile {
    pub fn new(secret: Option<String>, verify_url: String) -> Self {
        Self {
            client: Client::new(),
            secret,
            verify_url,
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(config.turnstile_secret.clone(), config.turnstile_verify_url.clone())
    }

    pub async fn verify(&self, token: &str, remote_ip: Option<&str>) -> Result<bool, Error> {
        let secret = self
            .secret
            .as_deref()
            .ok_or_else(|| Error::Config("TURNSTILE_SECRET_KEY not set.".into()))?;
        let mut form = vec![("secret", secret), ("response", token)];
        if let Some(ip) = remote_ip {
            form.push(("remoteip", ip));
        }
        let resp = self.client.post(&self.verify_url).form(&form).send().await?;
        // Cloudflare replies with JSON even on failure; anything else counts
        // as not verified rather than an error.
        let outcome: SiteverifyResponse = resp.json().await.unwrap_or_default();
        if !outcome.success && !outcome.error_codes.is_empty() {
            warn!("turnstile verification failed: {}", outcome.error_codes.join(", "));
        }
        Ok(outcome.success)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[actix_web::test]
    async fn missing_secret_is_a_config_error() {
        let turnstile = Turnstile::new(None, VERIFY_URL.to_string());
        match turnstile.verify("token", None).await {
            Err(Error::Config(msg)) => assert_eq!(msg, "TURNSTILE_SECRET_KEY not set."),
            other => panic!("expected config error, got {:?}", other.map(|_| ())),
        }
    }

    #[test]
    fn siteverify_body_parses_with_error_codes() {
        let body = r#"{"success":false,"error-codes":["invalid-input-response"]}"#;
        let parsed: SiteverifyResponse = serde_json::from_str(body).unwrap();
        assert!(!parsed.success);
        assert_eq!(parsed.error_codes, vec!["invalid-input-response".to_string()]);
    }

    #[test]
    fn unknown_fields_are_ignored() {
        let body = r#"{"success":true,"challenge_ts":"2026-01-01T00:00:00Z","hostname":"example.org"}"#;
        let parsed: SiteverifyResponse = serde_json::from_str(body).unwrap();
        assert!(parsed.success);
        assert!(parsed.error_codes.is_empty());
    }
}
