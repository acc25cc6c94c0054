use actix_web::middleware::Logger;
use actix_web::{App, HttpServer};
use sqlx::postgres::PgPoolOptions;

use volunteer_intake::app;
use volunteer_intake::config::Config;

#[actix_web::main]
async fn main() -> Result<(), std::io::Error> {
    dotenv::dotenv().ok();
    if std::env::var("RUST_LOG").is_err() {
        std::env::set_var("RUST_LOG", "info,actix_web=info");
    }
    env_logger::init();
    let config = Config::from_env().expect("incomplete environment configuration");
    config.log_presence();
    std::fs::create_dir_all(&config.upload_path)?;
    let pool = PgPoolOptions::new()
        .max_connections(5)
        .connect(&config.database_url)
        .await
        .expect("failed to connect to database");
    let port = config.port;
    HttpServer::new(move || {
        App::new()
            .wrap(Logger::default())
            .configure(app(pool.clone(), config.clone()))
    })
    .bind(("0.0.0.0", port))?
    .run()
    .await
}
