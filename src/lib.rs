pub mod application;
pub mod config;
pub mod db;
pub mod domain;
pub mod errors;
pub mod handlers;
pub mod infrastructure;
pub mod schema;

use std::sync::Arc;

use actix_web::{middleware::Logger, web, App, HttpServer};
use diesel_migrations::{embed_migrations, EmbeddedMigrations, MigrationHarness};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use application::auth::{DenyAllVerifier, StaticCredentialVerifier};
use application::catalog_service::CatalogService;
use application::order_service::OrderService;
use config::{ShopConfig, StoreBackend};
use domain::delivery::DeliveryCalculator;
use domain::errors::DomainError;
use domain::ports::{CatalogRepository, CredentialVerifier, OrderRepository};
use infrastructure::catalog_repo::DieselCatalogRepository;
use infrastructure::local_store::{LocalCatalogRepository, LocalOrderRepository};
use infrastructure::order_repo::DieselOrderRepository;

pub use db::{create_pool, DbPool};

pub const MIGRATIONS: EmbeddedMigrations = embed_migrations!("migrations");

/// Run any pending Diesel migrations against the pool's database.
pub fn run_migrations(pool: &DbPool) {
    let mut conn = pool.get().expect("Failed to get DB connection for migrations");
    conn.run_pending_migrations(MIGRATIONS)
        .expect("Failed to run database migrations");
}

/// Everything the handlers need, shared across workers.
pub struct AppState {
    pub orders: OrderService<Arc<dyn OrderRepository>>,
    pub catalog: CatalogService<Arc<dyn CatalogRepository>>,
    pub delivery: DeliveryCalculator,
    pub credentials: Arc<dyn CredentialVerifier>,
}

impl AppState {
    pub fn new(
        orders: Arc<dyn OrderRepository>,
        catalog: Arc<dyn CatalogRepository>,
        credentials: Arc<dyn CredentialVerifier>,
        config: &ShopConfig,
    ) -> Self {
        Self {
            orders: OrderService::new(
                orders,
                config.order_id_prefix.clone(),
                config.delivery.calculator(),
            ),
            catalog: CatalogService::new(catalog),
            delivery: config.delivery.calculator(),
            credentials,
        }
    }

    /// Wires the stores selected by `config`. For Postgres this also runs
    /// pending migrations.
    pub fn from_config(config: &ShopConfig) -> Result<Self, DomainError> {
        let orders: Arc<dyn OrderRepository>;
        let catalog: Arc<dyn CatalogRepository>;
        match &config.store {
            StoreBackend::Postgres { database_url } => {
                let pool = create_pool(database_url);
                run_migrations(&pool);
                orders = Arc::new(DieselOrderRepository::new(pool.clone()));
                catalog = Arc::new(DieselCatalogRepository::new(pool));
            }
            StoreBackend::Local { dir: Some(dir) } => {
                std::fs::create_dir_all(dir)
                    .map_err(|e| DomainError::Store(format!("{}: {e}", dir.display())))?;
                orders = Arc::new(LocalOrderRepository::open(dir)?);
                catalog = Arc::new(LocalCatalogRepository::open(dir)?);
            }
            StoreBackend::Local { dir: None } => {
                log::warn!("LOCAL_STORE_DIR not set; orders are kept in memory only");
                orders = Arc::new(LocalOrderRepository::in_memory());
                catalog = Arc::new(LocalCatalogRepository::in_memory());
            }
        }

        let credentials: Arc<dyn CredentialVerifier> = match &config.admin {
            Some(admin) => Arc::new(StaticCredentialVerifier::new(
                admin.username.clone(),
                admin.password.clone(),
            )),
            None => {
                log::warn!("ADMIN_USERNAME/ADMIN_PASSWORD not set; admin endpoints are disabled");
                Arc::new(DenyAllVerifier)
            }
        };

        Ok(Self::new(orders, catalog, credentials, config))
    }
}

/// Registers every route. Shared by the server and the HTTP tests.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.route("/delivery/quote", web::get().to(handlers::delivery::quote))
        .route("/admin/login", web::post().to(handlers::admin::login))
        .service(
            web::scope("/orders")
                .route("", web::post().to(handlers::orders::create_order))
                .route("", web::get().to(handlers::orders::list_orders))
                .route("/stats", web::get().to(handlers::orders::order_stats))
                .route("/{order_id}", web::get().to(handlers::orders::get_order))
                .route(
                    "/{order_id}/status",
                    web::post().to(handlers::orders::transition_status),
                )
                .route(
                    "/{order_id}/status",
                    web::put().to(handlers::orders::force_status),
                ),
        )
        .service(
            web::scope("/products")
                .route("", web::get().to(handlers::catalog::list_products))
                .route("", web::post().to(handlers::catalog::add_product))
                .route("/{id}", web::put().to(handlers::catalog::update_product))
                .route("/{id}", web::delete().to(handlers::catalog::delete_product)),
        )
        .service(
            web::scope("/categories")
                .route("", web::get().to(handlers::catalog::list_categories))
                .route("", web::post().to(handlers::catalog::add_category))
                .route("/{id}", web::delete().to(handlers::catalog::delete_category)),
        );
}

/// Build and return an actix-web `Server` bound to `host:port`.
///
/// The caller is responsible for `.await`-ing (or `tokio::spawn`-ing) the
/// returned server.
pub fn build_server(
    state: AppState,
    host: &str,
    port: u16,
) -> std::io::Result<actix_web::dev::Server> {
    let state = web::Data::new(state);
    Ok(HttpServer::new(move || {
        App::new()
            .app_data(state.clone())
            .wrap(Logger::default())
            .configure(configure)
            .service(
                SwaggerUi::new("/swagger-ui/{_:.*}")
                    .url("/api-docs/openapi.json", handlers::ApiDoc::openapi()),
            )
    })
    .bind((host.to_string(), port))?
    .run())
}
