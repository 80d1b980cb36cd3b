use actix_web::{
    middleware,
    web::{self, Data},
    App, HttpServer,
};
use log::info;
use shareit::{
    config::GatewayConfig,
    gateway::{self, Forwarder},
    routes,
};

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    dotenvy::dotenv().ok();
    env_logger::init_from_env(env_logger::Env::new().default_filter_or("info"));

    let config = GatewayConfig::from_env()?;
    let forwarder = Forwarder::new(config.server_url.clone());

    info!(
        "Starting gateway on http://{}:{}/ forwarding to {}",
        config.host, config.port, config.server_url
    );

    HttpServer::new(move || {
        App::new()
            .wrap(middleware::Compress::default())
            .wrap(middleware::Logger::default())
            .app_data(Data::new(forwarder.clone()))
            .configure(gateway::configure)
            .default_service(web::to(routes::default_handler))
    })
    .bind((config.host.as_str(), config.port))?
    .run()
    .await
}
