use actix_cors::Cors;
use actix_web::{web, App, HttpServer};
use anyhow::{anyhow, Context};
use db_pool::{create_pool, DbConfig};
use engagement_service::config::{Config, StoreBackend};
use engagement_service::handlers;
use engagement_service::middleware::{IdentityMiddleware, JwtValidator, RequestMetrics};
use engagement_service::repository::{InMemoryStore, Repositories};
use engagement_service::AppState;
use std::sync::Arc;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

const SERVICE_NAME: &str = "engagement-service";

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "info,actix_web=info,sqlx=warn".into());
    let json = std::env::var("LOG_FORMAT")
        .map(|v| v.eq_ignore_ascii_case("json"))
        .unwrap_or(false);

    let registry = tracing_subscriber::registry().with(filter);
    if json {
        registry
            .with(tracing_subscriber::fmt::layer().json().with_current_span(true))
            .init();
    } else {
        registry.with(tracing_subscriber::fmt::layer()).init();
    }
}

fn build_cors(config: &Config) -> Cors {
    let mut cors = Cors::default();
    if config.cors.allows_any() {
        cors = cors.allow_any_origin();
    } else {
        for origin in config.cors.origins() {
            cors = cors.allowed_origin(origin);
        }
    }
    cors.allow_any_method()
        .allow_any_header()
        .supports_credentials()
        .max_age(3600)
}

async fn build_repositories(config: &Config) -> anyhow::Result<Repositories> {
    match config.store.backend {
        StoreBackend::Postgres => {
            let db_config = DbConfig::from_env(SERVICE_NAME).map_err(|e| anyhow!(e))?;
            db_config.log_config();
            let pool = create_pool(db_config)
                .await
                .context("Failed to create database pool")?;

            sqlx::migrate!("./migrations")
                .run(&pool)
                .await
                .context("Failed to run database migrations")?;
            info!("Database migrations applied");

            Ok(Repositories::postgres(pool))
        }
        StoreBackend::Memory => {
            warn!("Using in-memory store; data is lost on restart");
            Ok(Repositories::in_memory(Arc::new(InMemoryStore::new())))
        }
    }
}

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    init_tracing();

    let config = Config::from_env()
        .map_err(|e| anyhow!(e))
        .context("Configuration loading failed")?;

    info!(
        version = env!("CARGO_PKG_VERSION"),
        env = %config.app.env,
        store = ?config.store.backend,
        "Starting {}",
        SERVICE_NAME
    );

    let repos = build_repositories(&config).await?;
    let state = web::Data::new(AppState::new(
        repos,
        config.policy.allow_self_subscription,
    ));
    let validator = Arc::new(JwtValidator::new(&config.auth.jwt_secret));

    let bind_address = format!("{}:{}", config.app.host, config.app.port);
    info!(address = %bind_address, "HTTP server listening");

    let server_config = config.clone();
    HttpServer::new(move || {
        App::new()
            .app_data(state.clone())
            .wrap(IdentityMiddleware::new(validator.clone()))
            .wrap(RequestMetrics)
            .wrap(build_cors(&server_config))
            .wrap(tracing_actix_web::TracingLogger::default())
            .configure(handlers::configure)
    })
    .bind(&bind_address)
    .with_context(|| format!("Failed to bind {}", bind_address))?
    .run()
    .await
    .context("HTTP server terminated with an error")?;

    info!("engagement-service shut down");
    Ok(())
}
