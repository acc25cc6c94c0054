use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use crate::error::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "application_status", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum ApplicationStatus {
    Pending,
    Reviewed,
    Shortlisted,
    Rejected,
}

impl FromStr for ApplicationStatus {
    type Err = Error;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(Self::Pending),
            "reviewed" => Ok(Self::Reviewed),
            "shortlisted" => Ok(Self::Shortlisted),
            "rejected" => Ok(Self::Rejected),
            _ => Err(Error::Validation(format!("invalid status({})", s))),
        }
    }
}

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Application {
    pub id: Uuid,
    pub created_at: DateTime<Utc>,
    pub full_name: String,
    pub email: String,
    pub phone: Option<String>,
    pub role_interest: Option<String>,
    pub country: Option<String>,
    pub city: Option<String>,
    pub availability: Option<String>,
    pub motivation: Option<String>,
    pub cv_url: Option<String>,
    pub status: ApplicationStatus,
}

// Submission body as the browser sends it. Every field is optional at the
// wire level; normalize() decides what actually makes an application.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmissionPayload {
    pub full_name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    // "track" on the wire, role_interest in storage.
    pub track: Option<String>,
    pub country: Option<String>,
    pub city: Option<String>,
    pub availability: Option<String>,
    pub motivation: Option<String>,
    pub cv_url: Option<String>,
    pub turnstile_token: Option<String>,
}

#[derive(Debug, Clone)]
pub struct NewApplication {
    pub full_name: String,
    pub email: String,
    pub phone: Option<String>,
    pub role_interest: Option<String>,
    pub country: Option<String>,
    pub city: Option<String>,
    pub availability: Option<String>,
    pub motivation: Option<String>,
    pub cv_url: Option<String>,
}

impl SubmissionPayload {
    // Trims everything, drops empties, and requires name and email.
    pub fn normalize(&self) -> Option<NewApplication> {
        Some(NewApplication {
            full_name: non_empty(self.full_name.as_deref())?,
            email: non_empty(self.email.as_deref())?,
            phone: non_empty(self.phone.as_deref()),
            role_interest: non_empty(self.track.as_deref()),
            country: non_empty(self.country.as_deref()),
            city: non_empty(self.city.as_deref()),
            availability: non_empty(self.availability.as_deref()),
            motivation: non_empty(self.motivation.as_deref()),
            cv_url: non_empty(self.cv_url.as_deref()),
        })
    }

    pub fn token(&self) -> Option<String> {
        non_empty(self.turnstile_token.as_deref())
    }
}

fn non_empty(value: Option<&str>) -> Option<String> {
    value.map(str::trim).filter(|v| !v.is_empty()).map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_parses_lowercase_names() {
        assert_eq!("pending".parse::<ApplicationStatus>().unwrap(), ApplicationStatus::Pending);
        assert_eq!(
            "shortlisted".parse::<ApplicationStatus>().unwrap(),
            ApplicationStatus::Shortlisted
        );
        assert!(matches!(
            "Pending".parse::<ApplicationStatus>(),
            Err(Error::Validation(_))
        ));
        assert!(matches!("all".parse::<ApplicationStatus>(), Err(Error::Validation(_))));
    }

    #[test]
    fn payload_uses_camel_case_keys() {
        let payload: SubmissionPayload = serde_json::from_str(
            r#"{"fullName":"Ada","email":"ada@example.org","track":"Outreach","cvUrl":"/uploads/cv.pdf","turnstileToken":"tok"}"#,
        )
        .unwrap();
        assert_eq!(payload.full_name.as_deref(), Some("Ada"));
        assert_eq!(payload.track.as_deref(), Some("Outreach"));
        assert_eq!(payload.cv_url.as_deref(), Some("/uploads/cv.pdf"));
        assert_eq!(payload.token().as_deref(), Some("tok"));
    }

    #[test]
    fn normalize_trims_and_drops_empty_fields() {
        let payload: SubmissionPayload = serde_json::from_str(
            r#"{"fullName":"  Ada Lovelace ","email":" ada@example.org","phone":"   ","track":"Outreach"}"#,
        )
        .unwrap();
        let normalized = payload.normalize().unwrap();
        assert_eq!(normalized.full_name, "Ada Lovelace");
        assert_eq!(normalized.email, "ada@example.org");
        assert_eq!(normalized.phone, None);
        assert_eq!(normalized.role_interest.as_deref(), Some("Outreach"));
    }

    #[test]
    fn normalize_requires_name_and_email() {
        let payload: SubmissionPayload =
            serde_json::from_str(r#"{"fullName":"Ada","email":"  "}"#).unwrap();
        assert!(payload.normalize().is_none());
        let payload: SubmissionPayload = serde_json::from_str(r#"{"email":"ada@example.org"}"#).unwrap();
        assert!(payload.normalize().is_none());
    }
}
