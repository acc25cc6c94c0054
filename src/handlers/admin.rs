use actix_web::web::{Data, Json, Query};
use serde::Deserialize;
use sqlx::{query, PgPool, Postgres, QueryBuilder};
use uuid::Uuid;

use crate::error::Error;
use crate::models::application::{Application, ApplicationStatus};
use crate::response::{Ack, Listing};

const DEFAULT_LIMIT: i64 = 200;
const MAX_LIMIT: i64 = 500;

#[derive(Debug, Deserialize)]
pub struct ListParams {
    pub status: Option<String>,
    pub q: Option<String>,
    pub limit: Option<i64>,
}

pub async fn list(
    Query(ListParams { status, q, limit }): Query<ListParams>,
    db: Data<PgPool>,
) -> Result<Json<Listing<Application>>, Error> {
    let status = match status.as_deref() {
        None | Some("") | Some("all") => None,
        Some(s) => Some(s.parse::<ApplicationStatus>()?),
    };
    let limit = limit.unwrap_or(DEFAULT_LIMIT).clamp(1, MAX_LIMIT);
    let mut builder: QueryBuilder<Postgres> = QueryBuilder::new(
        "SELECT id, created_at, full_name, email, phone, role_interest, country, city, availability, motivation, cv_url, status
         FROM volunteer_applications WHERE 1 = 1",
    );
    if let Some(status) = status {
        builder.push(" AND status = ").push_bind(status);
    }
    if let Some(needle) = q.map(|v| v.trim().to_string()).filter(|v| !v.is_empty()) {
        let pattern = format!("%{}%", needle);
        builder
            .push(" AND (full_name ILIKE ")
            .push_bind(pattern.clone())
            .push(" OR email ILIKE ")
            .push_bind(pattern)
            .push(")");
    }
    builder.push(" ORDER BY created_at DESC LIMIT ").push_bind(limit);
    let mut conn = db.acquire().await?;
    let applications: Vec<Application> = builder.build_query_as().fetch_all(&mut conn).await?;
    Ok(Json(Listing::new(applications)))
}

#[derive(Debug, Deserialize)]
pub struct StatusUpdate {
    pub id: Option<String>,
    pub status: Option<String>,
}

pub async fn update_status(
    Json(StatusUpdate { id, status }): Json<StatusUpdate>,
    db: Data<PgPool>,
) -> Result<Json<Ack>, Error> {
    let (Some(id), Some(status)) = (
        id.as_deref().and_then(|v| Uuid::parse_str(v.trim()).ok()),
        status.as_deref().and_then(|v| v.parse::<ApplicationStatus>().ok()),
    ) else {
        return Err(Error::Validation("Invalid payload (id/status)".into()));
    };
    let mut conn = db.acquire().await?;
    // Updating an id that no longer exists is not an error; triage pages
    // refresh and race each other all the time.
    query("UPDATE volunteer_applications SET status = $1 WHERE id = $2")
        .bind(status)
        .bind(id)
        .execute(&mut conn)
        .await?;
    Ok(Json(Ack::ok()))
}
