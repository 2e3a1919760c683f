//! Cabin Reservation Backend - Main Entry Point
//!
//! Initializes and starts the Axum web server with all configured routes,
//! middleware, and database/Redis connections.

use std::net::SocketAddr;
use std::time::Duration;

use axum::Router;
use tokio::net::TcpListener;
use tower_http::compression::CompressionLayer;
use tower_http::services::ServeDir;
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::{self, TraceLayer};
use tracing::{error, info, Level};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use cabin_reservation_backend::{
    config::Settings,
    db,
    middleware::cors::{cors_layer, cors_layer_multiple_origins},
    redis::RedisManager,
    routes,
    state::AppState,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    if let Err(e) = dotenvy::dotenv() {
        if !matches!(e, dotenvy::Error::Io(_)) {
            eprintln!("Warning: Failed to load .env file: {}", e);
        }
    }

    init_tracing();

    info!("Starting Cabin Reservation Backend (Rust)");
    info!("Version: {}", env!("CARGO_PKG_VERSION"));

    let config = match Settings::new() {
        Ok(cfg) => cfg,
        Err(e) => {
            error!("Failed to load configuration: {}", e);
            return Err(anyhow::anyhow!("Configuration error: {}", e));
        },
    };

    info!(
        environment = %config.environment,
        port = config.server.port,
        log_level = %config.server.log_level,
        "Configuration loaded"
    );

    info!("Connecting to PostgreSQL...");
    let db_config = db::DbConfig {
        max_connections: config.database.max_connections,
        min_connections: config.database.min_connections,
        acquire_timeout: Duration::from_secs(config.database.connection_timeout_secs),
        idle_timeout: Duration::from_secs(600),
    };
    let db = match db::init_pool_with_url(&config.database.url, Some(db_config)).await {
        Ok(db) => {
            info!("PostgreSQL connection established");
            db
        },
        Err(e) => {
            error!("Failed to connect to PostgreSQL: {}", e);
            return Err(anyhow::anyhow!("Database connection error: {}", e));
        },
    };

    info!("Running database migrations...");
    if let Err(e) = db::migrations::run_migrations(db.pool()).await {
        error!("Failed to run migrations: {}", e);
        return Err(anyhow::anyhow!("Migration error: {}", e));
    }

    info!("Seeding essential data...");
    if let Err(e) = db::seed::seed_essential_data(db.pool()).await {
        error!("Failed to seed essential data: {}", e);
    }

    if config.is_development() {
        info!("Seeding sample data (development mode)...");
        if let Err(e) = db::seed::seed_sample_data(db.pool()).await {
            error!("Failed to seed sample data: {}", e);
        }
    }

    info!("Connecting to Redis...");
    let redis = match RedisManager::new(&config.redis.url).await {
        Ok(r) => {
            info!("Redis connection established");
            r
        },
        Err(e) => {
            error!("Failed to connect to Redis: {}", e);
            return Err(anyhow::anyhow!("Redis connection error: {}", e));
        },
    };

    let state = AppState::new(db.pool().clone(), redis.connection.clone(), config.clone());

    let app = create_app(state, &config);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.server.port));
    info!("Starting server on http://{}", addr);

    let listener = TcpListener::bind(addr).await?;
    info!("Server is ready to accept connections on port {}", config.server.port);

    log_startup_info(&config);

    axum::serve(listener, app).await?;

    Ok(())
}

/// Initialize tracing/logging subscriber
fn init_tracing() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "cabin_reservation_backend=debug,tower_http=debug,axum=trace,sqlx=warn".into()
            }),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(true)
                .with_thread_ids(false)
                .with_file(false)
                .with_line_number(false),
        )
        .init();
}

/// Log startup information about configured features
fn log_startup_info(config: &Settings) {
    info!("=== Server Configuration ===");
    info!("  Environment: {}", config.environment);
    info!("  Port: {}", config.server.port);
    info!("  Frontend URL: {}", config.server.frontend_url);
    info!("  Business timezone: {}", config.business.timezone);
    info!("  Hold duration: {}s", config.business.hold_duration_secs);

    if config.calendar.is_configured() {
        info!("  Calendar gateway: Enabled");
    } else {
        info!("  Calendar gateway: Not configured");
    }

    if config.payment.is_configured() {
        info!("  Payment gateway: Enabled");
    } else {
        info!("  Payment gateway: Not configured");
    }

    if config.email.is_configured() {
        info!("  SMTP email: Enabled");
    } else {
        info!("  SMTP email: Not configured");
    }

    if config.admin.is_configured() {
        info!("  Admin API: Enabled");
    } else {
        info!("  Admin API: Not configured (admin routes will reject all requests)");
    }

    info!("============================");
}

/// Creates the main application with all routes and middleware.
///
/// Routes are mounted at the literal paths described in the external
/// interface table (`/cabins`, `/hold`, `/book`, `/admin/*`, ...) rather
/// than nested under `/api`; see `routes::create_router`. Cabin photos are
/// served read-only from the configured images directory, falling back to
/// the catalog's `imageRefs` when a cabin has no local folder.
fn create_app(state: AppState, config: &Settings) -> Router {
    let app = routes::create_router(state).nest_service("/images", ServeDir::new(&config.business.images_dir));

    app.layer(CompressionLayer::new())
        .layer(TimeoutLayer::new(Duration::from_secs(30)))
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(trace::DefaultMakeSpan::new().level(Level::INFO))
                .on_response(trace::DefaultOnResponse::new().level(Level::INFO))
                .on_failure(trace::DefaultOnFailure::new().level(Level::ERROR)),
        )
        .layer(build_cors_layer(config))
}

/// Build CORS layer based on configuration
fn build_cors_layer(config: &Settings) -> tower_http::cors::CorsLayer {
    if config.is_development() {
        let origins = config.cors_origins();
        let origin_strs: Vec<&str> = origins.iter().map(|s| s.as_str()).collect();
        cors_layer_multiple_origins(origin_strs)
    } else {
        cors_layer()
    }
}
