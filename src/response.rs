use actix_web::http::StatusCode;
use actix_web::HttpResponse;
use serde::Serialize;
use uuid::Uuid;

/// Pipeline step a submission failed at, reported verbatim in the response
/// envelope so client-side errors stay diagnosable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    OriginCheck,
    Validation,
    Turnstile,
    DbInsert,
    EmailSend,
    Exception,
}

#[derive(Debug, Serialize)]
pub struct Submission {
    pub ok: bool,
    pub status: u16,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stage: Option<Stage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<Uuid>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub warning: Option<String>,
}

impl Submission {
    pub fn failure(status: StatusCode, stage: Stage, message: impl Into<String>) -> HttpResponse {
        HttpResponse::build(status).json(Submission {
            ok: false,
            status: status.as_u16(),
            stage: Some(stage),
            message: Some(message.into()),
            id: None,
            warning: None,
        })
    }

    pub fn success(id: Uuid, warning: Option<String>) -> HttpResponse {
        HttpResponse::Ok().json(Submission {
            ok: true,
            status: StatusCode::OK.as_u16(),
            stage: None,
            message: None,
            id: Some(id),
            warning,
        })
    }
}

#[derive(Debug, Serialize)]
pub struct Listing<T> {
    pub ok: bool,
    pub data: Vec<T>,
}

impl<T> Listing<T> {
    pub fn new(data: Vec<T>) -> Self {
        Listing { ok: true, data }
    }
}

#[derive(Debug, Serialize)]
pub struct Ack {
    pub ok: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl Ack {
    pub fn ok() -> Self {
        Ack { ok: true, message: None }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::body::to_bytes;

    #[actix_web::test]
    async fn failure_envelope_carries_stage_and_message() {
        let resp = Submission::failure(StatusCode::BAD_REQUEST, Stage::Validation, "fullName and email are required");
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        let body = to_bytes(resp.into_body()).await.unwrap();
        let v: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(v["ok"], false);
        assert_eq!(v["status"], 400);
        assert_eq!(v["stage"], "validation");
        assert_eq!(v["message"], "fullName and email are required");
        assert!(v.get("id").is_none());
        assert!(v.get("warning").is_none());
    }

    #[actix_web::test]
    async fn success_envelope_omits_stage() {
        let id = Uuid::parse_str("7c02e8a2-4848-4f76-a019-4d2b7a5d0b10").unwrap();
        let resp = Submission::success(id, Some("Saved, but email failed to send.".into()));
        assert_eq!(resp.status(), StatusCode::OK);
        let body = to_bytes(resp.into_body()).await.unwrap();
        let v: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(v["ok"], true);
        assert_eq!(v["id"], id.to_string());
        assert!(v.get("stage").is_none());
        assert_eq!(v["warning"], "Saved, but email failed to send.");
    }

    #[test]
    fn stage_labels_are_snake_case() {
        assert_eq!(serde_json::to_string(&Stage::OriginCheck).unwrap(), "\"origin_check\"");
        assert_eq!(serde_json::to_string(&Stage::DbInsert).unwrap(), "\"db_insert\"");
        assert_eq!(serde_json::to_string(&Stage::EmailSend).unwrap(), "\"email_send\"");
    }
}
