use dotenvy::dotenv;
use storefront_orders::config::ShopConfig;
use storefront_orders::{build_server, AppState};

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    dotenv().ok();
    env_logger::init_from_env(env_logger::Env::default().default_filter_or("info"));

    let config = ShopConfig::from_env().map_err(std::io::Error::other)?;
    let state = AppState::from_config(&config).map_err(std::io::Error::other)?;

    log::info!(
        "Starting server at http://{}:{} ({} store)",
        config.host,
        config.port,
        config.store.kind()
    );

    build_server(state, &config.host, config.port)?.await
}
