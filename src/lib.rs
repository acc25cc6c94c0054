pub mod config;
pub mod error;
pub mod handlers;
pub mod mailer;
pub mod middlewares;
pub mod models;
pub mod origin;
pub mod response;
pub mod storer;
pub mod turnstile;

use actix_files::Files;
use actix_web::error::InternalError;
use actix_web::http::StatusCode;
use actix_web::web::{self, Data};
use sqlx::PgPool;

use crate::config::Config;
use crate::error::Error;
use crate::handlers::{admin, upload, volunteer};
use crate::mailer::Mailer;
use crate::middlewares::admin_gate::AdminGate;
use crate::origin::OriginPolicy;
use crate::response::{Stage, Submission};
use crate::storer::LocalStorer;
use crate::turnstile::Turnstile;

pub const ADMIN_UI_DIR: &str = "./static/admin";

// Route table shared by the binary and the integration tests.
pub fn app(pool: PgPool, config: Config) -> impl FnOnce(&mut web::ServiceConfig) {
    move |cfg: &mut web::ServiceConfig| {
        let admin_token = config.admin_token.clone();
        cfg.app_data(Data::new(pool))
            .app_data(Data::new(OriginPolicy::from_config(&config)))
            .app_data(Data::new(Turnstile::from_config(&config)))
            .app_data(Data::new(Mailer::from_config(&config)))
            .app_data(Data::new(LocalStorer::new(&config.upload_path)))
            .service(
                web::scope("/api")
                    .service(
                        web::resource("/volunteer")
                            // A body that never parses still answers in the
                            // staged envelope the form reads.
                            .app_data(web::JsonConfig::default().error_handler(|err, _| {
                                let resp = Submission::failure(
                                    StatusCode::BAD_REQUEST,
                                    Stage::Validation,
                                    err.to_string(),
                                );
                                InternalError::from_response(err, resp).into()
                            }))
                            .route(web::post().to(volunteer::submit)),
                    )
                    .service(
                        web::resource("/uploads").route(web::post().to(upload::create::<LocalStorer>)),
                    )
                    .service(
                        web::scope("/admin")
                            .wrap(AdminGate::new(admin_token.clone()))
                            .service(
                                web::resource("/applications")
                                    .app_data(web::JsonConfig::default().error_handler(
                                        |err, _| Error::Validation(err.to_string()).into(),
                                    ))
                                    .app_data(web::QueryConfig::default().error_handler(
                                        |err, _| Error::Validation(err.to_string()).into(),
                                    ))
                                    .route(web::get().to(admin::list))
                                    .route(web::patch().to(admin::update_status)),
                            ),
                    ),
            )
            .service(Files::new("/uploads", &config.upload_path))
            .service(
                web::scope("/admin").wrap(AdminGate::new(admin_token)).service(
                    Files::new("", ADMIN_UI_DIR)
                        .index_file("index.html")
                        .redirect_to_slash_directory(),
                ),
            )
            .app_data(Data::new(config));
    }
}
