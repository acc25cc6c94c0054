use reqwest::Client;
use serde_json::json;

use crate::config::Config;
use crate::error::Error;
use crate::models::application::NewApplication;

pub const RESEND_API_URL: &str = "https://api.resend.com";
pub const DEFAULT_FROM: &str = "onboarding@resend.dev";

// Resend's shared test sender only delivers to the account owner's address.
const TEST_SENDER_DOMAIN: &str = "@resend.dev";

#[derive(Debug, PartialEq, Eq)]
pub enum Dispatch {
    Sent,
    Skipped(&'static str),
}

#[derive(Debug, Clone)]
pub struct Mailer {
    client: Client,
    api_url: String,
    api_key: Option<String>,
    from: String,
    admin_to: Option<String>,
    account_email: Option<String>,
    confirmation_enabled: bool,
}

impl Mailer {
    pub fn from_config(config: &Config) -> Self {
        Self {
            client: Client::new(),
            api_url: config.resend_api_url.clone(),
            api_key: config.resend_api_key.clone(),
            from: config.resend_from.clone(),
            admin_to: config.admin_notify_email.clone(),
            account_email: config.resend_account_email.clone(),
            confirmation_enabled: config.send_applicant_confirmation,
        }
    }

    pub async fn notify_admin(&self, application: &NewApplication) -> Result<Dispatch, Error> {
        let Some(key) = self.api_key.as_deref() else {
            return Ok(Dispatch::Skipped("RESEND_API_KEY not set"));
        };
        let Some(to) = self.admin_to.as_deref().or(self.account_email.as_deref()) else {
            return Ok(Dispatch::Skipped("no admin recipient configured"));
        };
        self.sandbox_check(to)?;
        let subject = format!("New volunteer application: {}", application.full_name);
        self.send(key, to, &subject, &admin_body(application)).await?;
        Ok(Dispatch::Sent)
    }

    pub async fn confirm_applicant(&self, application: &NewApplication) -> Result<Dispatch, Error> {
        if !self.confirmation_enabled {
            return Ok(Dispatch::Skipped("applicant confirmation disabled"));
        }
        let Some(key) = self.api_key.as_deref() else {
            return Ok(Dispatch::Skipped("RESEND_API_KEY not set"));
        };
        self.sandbox_check(&application.email)?;
        self.send(
            key,
            &application.email,
            "We received your volunteer application",
            &confirmation_body(application),
        )
        .await?;
        Ok(Dispatch::Sent)
    }

    fn sandbox_check(&self, to: &str) -> Result<(), Error> {
        if !self.from.ends_with(TEST_SENDER_DOMAIN) {
            return Ok(());
        }
        match self.account_email.as_deref() {
            Some(account) if account.eq_ignore_ascii_case(to) => Ok(()),
            Some(_) => Err(Error::Config(
                "Resend test sender can only deliver to RESEND_ACCOUNT_EMAIL.".into(),
            )),
            None => Err(Error::Config(
                "RESEND_ACCOUNT_EMAIL not set for the Resend test sender.".into(),
            )),
        }
    }

    async fn send(&self, key: &str, to: &str, subject: &str, text: &str) -> Result<(), Error> {
        self.client
            .post(format!("{}/emails", self.api_url))
            .bearer_auth(key)
            .json(&json!({
                "from": self.from,
                "to": [to],
                "subject": subject,
                "text": text,
            }))
            .send()
            .await?
            .error_for_status()?;
        Ok(())
    }
}

pub fn admin_body(application: &NewApplication) -> String {
    let field = |v: &Option<String>| v.as_deref().unwrap_or("-").to_string();
    format!(
        "Name: {}\nEmail: {}\nPhone: {}\nRole interest: {}\nCountry: {}\nCity: {}\nAvailability: {}\n\nMotivation:\n{}\n\nCV: {}\n",
        application.full_name,
        application.email,
        field(&application.phone),
        field(&application.role_interest),
        field(&application.country),
        field(&application.city),
        field(&application.availability),
        field(&application.motivation),
        application.cv_url.as_deref().unwrap_or("not provided"),
    )
}

pub fn confirmation_body(application: &NewApplication) -> String {
    format!(
        "Hi {},\n\nThanks for applying to volunteer with us. Your application has been received and will be reviewed shortly.\n\nThe volunteer team\n",
        application.full_name,
    )
}
