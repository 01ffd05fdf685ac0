use actix_cors::Cors;
use actix_web::{web, App, HttpResponse, HttpServer};
use redis::aio::ConnectionManager;
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use std::io;
use std::time::Duration;
use tracing::{info, warn};
use tracing_actix_web::TracingLogger;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use gallery_service::config::Config;
use gallery_service::db;
use gallery_service::handlers;
use gallery_service::services::GalleryService;

async fn health(pool: web::Data<PgPool>) -> HttpResponse {
    let database = match sqlx::query_scalar::<_, i32>("SELECT 1")
        .fetch_one(pool.get_ref())
        .await
    {
        Ok(_) => "ok",
        Err(_) => "error",
    };

    let healthy = database == "ok";
    let status = if healthy { "healthy" } else { "unhealthy" };

    let body = serde_json::json!({
        "status": status,
        "database": database,
        "timestamp": chrono::Utc::now().to_rfc3339(),
    });

    if healthy {
        HttpResponse::Ok().json(body)
    } else {
        HttpResponse::ServiceUnavailable().json(body)
    }
}

async fn metrics() -> HttpResponse {
    use prometheus::Encoder;

    let encoder = prometheus::TextEncoder::new();
    let metric_families = prometheus::gather();
    let mut buffer = Vec::new();

    if let Err(e) = encoder.encode(&metric_families, &mut buffer) {
        tracing::error!("Failed to encode metrics: {}", e);
        return HttpResponse::InternalServerError().finish();
    }

    HttpResponse::Ok()
        .content_type(encoder.format_type())
        .body(buffer)
}

#[actix_web::main]
async fn main() -> io::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,actix_web=debug".into()),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .json()
                .with_current_span(true)
                .with_target(true),
        )
        .init();

    let config = match Config::from_env() {
        Ok(cfg) => cfg,
        Err(e) => {
            tracing::error!("Configuration loading failed: {}", e);
            eprintln!("ERROR: Failed to load configuration: {}", e);
            std::process::exit(1);
        }
    };

    info!("Starting gallery-service v{}", env!("CARGO_PKG_VERSION"));
    info!("Environment: {}", config.app.env);

    let pool = match PgPoolOptions::new()
        .max_connections(config.database.max_connections)
        .acquire_timeout(Duration::from_secs(5))
        .connect(&config.database.url)
        .await
    {
        Ok(pool) => pool,
        Err(e) => {
            tracing::error!("Database pool creation failed: {}", e);
            eprintln!("ERROR: Failed to connect to database: {}", e);
            std::process::exit(1);
        }
    };

    if let Err(e) = db::ensure_gallery_tables(&pool).await {
        tracing::error!("Schema bootstrap failed: {}", e);
        eprintln!("ERROR: Failed to ensure gallery tables: {}", e);
        std::process::exit(1);
    }

    // Redis is optional: without it every page request goes to Postgres
    let redis = match redis::Client::open(config.cache.url.as_str()) {
        Ok(client) => match ConnectionManager::new(client).await {
            Ok(manager) => {
                info!("Redis cache connected");
                Some(manager)
            }
            Err(e) => {
                warn!("Redis unavailable, gallery cache disabled: {}", e);
                None
            }
        },
        Err(e) => {
            warn!("Invalid Redis URL, gallery cache disabled: {}", e);
            None
        }
    };

    let gallery_service = web::Data::new(GalleryService::new(
        pool.clone(),
        redis,
        &config.gallery,
    ));
    let pool_data = web::Data::new(pool);

    let bind_addr = (config.app.host.clone(), config.app.port);
    let allowed_origins = config.cors.allowed_origins.clone();
    info!("Listening on {}:{}", config.app.host, config.app.port);

    HttpServer::new(move || {
        let mut cors = Cors::default()
            .allowed_methods(vec!["GET", "POST", "PUT", "DELETE"])
            .allow_any_header()
            .max_age(3600);
        for origin in allowed_origins.split(',').map(str::trim) {
            if !origin.is_empty() {
                cors = cors.allowed_origin(origin);
            }
        }

        App::new()
            .wrap(TracingLogger::default())
            .wrap(cors)
            .app_data(gallery_service.clone())
            .app_data(pool_data.clone())
            .configure(handlers::configure)
            .route("/health", web::get().to(health))
            .route("/metrics", web::get().to(metrics))
    })
    .bind(bind_addr)?
    .run()
    .await
}
