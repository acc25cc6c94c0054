use actix_web::http::StatusCode;
use actix_web::web::{Data, Json};
use actix_web::{HttpRequest, HttpResponse};
use log::{error, warn};
use sqlx::{query_scalar, PgPool};
use uuid::Uuid;

use crate::error::Error;
use crate::mailer::{Dispatch, Mailer};
use crate::models::application::{ApplicationStatus, NewApplication, SubmissionPayload};
use crate::origin::{request_origin, OriginPolicy};
use crate::response::{Stage, Submission};
use crate::turnstile::Turnstile;

const EMAIL_WARNING: &str = "Saved, but email failed to send.";

// Public intake endpoint. Every exit goes through the staged envelope so the
// site can tell exactly where a submission died: origin check, field
// validation, Turnstile, the insert, or the notification email.
pub async fn submit(
    req: HttpRequest,
    Json(payload): Json<SubmissionPayload>,
    db: Data<PgPool>,
    origins: Data<OriginPolicy>,
    turnstile: Data<Turnstile>,
    mailer: Data<Mailer>,
) -> HttpResponse {
    if let Some(origin) = request_origin(&req) {
        if !origins.is_allowed(&origin) {
            warn!("rejected submission from origin {}", origin);
            return Submission::failure(
                StatusCode::FORBIDDEN,
                Stage::OriginCheck,
                format!("Forbidden origin: {}", origin),
            );
        }
    }
    let Some(application) = payload.normalize() else {
        return Submission::failure(
            StatusCode::BAD_REQUEST,
            Stage::Validation,
            "fullName and email are required",
        );
    };
    let Some(token) = payload.token() else {
        return Submission::failure(StatusCode::BAD_REQUEST, Stage::Turnstile, "Missing Turnstile token.");
    };
    match turnstile.verify(&token, client_ip(&req).as_deref()).await {
        Ok(true) => {}
        Ok(false) => {
            return Submission::failure(StatusCode::FORBIDDEN, Stage::Turnstile, "Verification failed.")
        }
        Err(Error::Config(msg)) => {
            return Submission::failure(StatusCode::INTERNAL_SERVER_ERROR, Stage::Turnstile, msg)
        }
        Err(e) => {
            return Submission::failure(StatusCode::INTERNAL_SERVER_ERROR, Stage::Exception, e.to_string())
        }
    }
    let id = match insert(&db, &application).await {
        Ok(id) => id,
        Err(e) => {
            error!("failed to store application: {}", e);
            return Submission::failure(StatusCode::INTERNAL_SERVER_ERROR, Stage::DbInsert, e.to_string());
        }
    };
    let warning = match mailer.notify_admin(&application).await {
        Ok(Dispatch::Sent) => None,
        Ok(Dispatch::Skipped(reason)) => {
            warn!("admin notification skipped: {}", reason);
            None
        }
        Err(e) => {
            error!("admin notification failed: {}", e);
            Some(EMAIL_WARNING.to_string())
        }
    };
    if let Err(e) = mailer.confirm_applicant(&application).await {
        warn!("applicant confirmation failed: {}", e);
    }
    Submission::success(id, warning)
}

async fn insert(db: &PgPool, application: &NewApplication) -> Result<Uuid, Error> {
    let mut conn = db.acquire().await?;
    let id: Uuid = query_scalar(
        "INSERT INTO volunteer_applications
            (full_name, email, phone, role_interest, country, city, availability, motivation, cv_url, status)
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
         RETURNING id",
    )
    .bind(&application.full_name)
    .bind(&application.email)
    .bind(&application.phone)
    .bind(&application.role_interest)
    .bind(&application.country)
    .bind(&application.city)
    .bind(&application.availability)
    .bind(&application.motivation)
    .bind(&application.cv_url)
    .bind(ApplicationStatus::Pending)
    .fetch_one(&mut conn)
    .await?;
    Ok(id)
}

// Cloudflare's header first, then the proxy chain, then the socket.
fn client_ip(req: &HttpRequest) -> Option<String> {
    if let Some(ip) = header_value(req, "cf-connecting-ip") {
        return Some(ip);
    }
    if let Some(forwarded) = header_value(req, "x-forwarded-for") {
        if let Some(first) = forwarded.split(',').next() {
            let first = first.trim();
            if !first.is_empty() {
                return Some(first.to_string());
            }
        }
    }
    req.peer_addr().map(|addr| addr.ip().to_string())
}

fn header_value(req: &HttpRequest, name: &str) -> Option<String> {
    req.headers()
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}
