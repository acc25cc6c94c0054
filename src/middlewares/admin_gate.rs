use std::future::Future;
use std::pin::Pin;

use actix_web::body::EitherBody;
use actix_web::cookie::time::Duration;
use actix_web::cookie::{Cookie, SameSite};
use actix_web::dev::{Service, ServiceRequest, ServiceResponse, Transform};
use actix_web::http::header::LOCATION;
use actix_web::http::StatusCode;
use actix_web::{Error, HttpResponse};
use serde_json::json;

pub const ADMIN_COOKIE: &str = "admin_token";
const TOKEN_PARAM: &str = "token";
const COOKIE_TTL_HOURS: i64 = 6;

// Cookie gate for everything under /admin. A request either carries the
// admin cookie, or carries ?token=<secret> and gets redirected back to the
// same URL with the cookie set and the token stripped from the address bar.
pub struct AdminGate {
    secret: Option<String>,
}

impl AdminGate {
    pub fn new(secret: Option<String>) -> Self {
        Self {
            secret: secret.filter(|s| !s.is_empty()),
        }
    }
}

impl<S, B> Transform<S, ServiceRequest> for AdminGate
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type Transform = AdminGateMiddleware<S>;
    type InitError = ();
    type Future = Pin<Box<dyn Future<Output = Result<Self::Transform, Self::InitError>>>>;
    fn new_transform(&self, service: S) -> Self::Future {
        let secret = self.secret.clone();
        Box::pin(async move {
            Ok(AdminGateMiddleware {
                secret,
                next_service: service,
            })
        })
    }
}

pub struct AdminGateMiddleware<S> {
    secret: Option<String>,
    next_service: S,
}

impl<S, B> Service<ServiceRequest> for AdminGateMiddleware<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error>,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type Future = Pin<Box<dyn Future<Output = Result<Self::Response, Self::Error>>>>;

    fn poll_ready(&self, ctx: &mut core::task::Context<'_>) -> std::task::Poll<Result<(), Self::Error>> {
        self.next_service.poll_ready(ctx)
    }

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let Some(secret) = self.secret.clone() else {
            let resp = reject(StatusCode::INTERNAL_SERVER_ERROR, "ADMIN_DASH_TOKEN not set");
            return Box::pin(async move { Ok(req.into_response(resp).map_into_right_body()) });
        };
        if let Some(clean_query) = strip_admin_token(req.query_string(), &secret) {
            let location = if clean_query.is_empty() {
                req.path().to_string()
            } else {
                format!("{}?{}", req.path(), clean_query)
            };
            let cookie = Cookie::build(ADMIN_COOKIE, secret)
                .path("/")
                .http_only(true)
                .secure(true)
                .same_site(SameSite::Lax)
                .max_age(Duration::hours(COOKIE_TTL_HOURS))
                .finish();
            let resp = HttpResponse::Found()
                .insert_header((LOCATION, location))
                .cookie(cookie)
                .finish();
            return Box::pin(async move { Ok(req.into_response(resp).map_into_right_body()) });
        }
        if req.cookie(ADMIN_COOKIE).map(|c| c.value() == secret).unwrap_or(false) {
            let res_fut = self.next_service.call(req);
            return Box::pin(async move {
                let resp = res_fut.await?;
                Ok(resp.map_into_left_body())
            });
        }
        let resp = reject(StatusCode::FORBIDDEN, "Forbidden (admin)");
        Box::pin(async move { Ok(req.into_response(resp).map_into_right_body()) })
    }
}

fn reject(status: StatusCode, message: &str) -> HttpResponse {
    HttpResponse::build(status).json(json!({ "ok": false, "message": message }))
}

// Some(remaining query) when the query carries token=<secret>; the token
// pair itself never survives into the redirect target.
pub fn strip_admin_token(query: &str, secret: &str) -> Option<String> {
    let pairs: Vec<(String, String)> = serde_urlencoded::from_str(query).ok()?;
    let mut matched = false;
    let kept: Vec<(String, String)> = pairs
        .into_iter()
        .filter(|(key, value)| {
            if key == TOKEN_PARAM {
                if value == secret {
                    matched = true;
                }
                false
            } else {
                true
            }
        })
        .collect();
    if !matched {
        return None;
    }
    if kept.is_empty() {
        return Some(String::new());
    }
    serde_urlencoded::to_string(kept).ok()
}

#[cfg(test)]
mod tests {
    use super::strip_admin_token;

    #[test]
    fn bare_token_leaves_an_empty_query() {
        assert_eq!(strip_admin_token("token=shh", "shh"), Some(String::new()));
    }

    #[test]
    fn other_params_survive_the_strip() {
        assert_eq!(
            strip_admin_token("token=shh&view=new", "shh"),
            Some("view=new".to_string())
        );
        assert_eq!(strip_admin_token("q=a%20b&token=shh", "shh"), Some("q=a+b".to_string()));
    }

    #[test]
    fn wrong_or_absent_token_does_not_match() {
        assert_eq!(strip_admin_token("token=nope", "shh"), None);
        assert_eq!(strip_admin_token("view=new", "shh"), None);
        assert_eq!(strip_admin_token("", "shh"), None);
    }
}
