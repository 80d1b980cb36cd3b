use actix_web::{
    middleware,
    web::{self, Data},
    App, HttpServer,
};
use log::info;
use shareit::{config::ServerConfig, db, routes, AppState};

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    dotenvy::dotenv().ok();
    env_logger::init_from_env(env_logger::Env::new().default_filter_or("info"));

    let config = ServerConfig::from_env()?;

    let pool = db::connect(&config.database_url).await.map_err(|e| {
        log::error!("FATAL: could not open {}: {}", config.database_url, e);
        e
    })?;

    let state = AppState::sqlite(pool);

    info!(
        "Starting HTTP server on http://{}:{}/",
        config.host, config.port
    );

    HttpServer::new(move || {
        App::new()
            // enable automatic response compression - usually register this first
            .wrap(middleware::Compress::default())
            // enable logger - always register Actix Web Logger middleware last
            .wrap(middleware::Logger::default())
            .app_data(Data::new(state.clone()))
            .configure(routes::configure)
            .default_service(web::to(routes::default_handler))
    })
    .bind((config.host.as_str(), config.port))?
    .run()
    .await
}
