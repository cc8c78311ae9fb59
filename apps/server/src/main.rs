use std::sync::Arc;

use actix_cors::Cors;
use actix_web::{middleware, App, HttpServer};

use distbot::clock::SystemClock;
use distbot::config;
use distbot::state::AppState;

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    // Load .env file if present
    dotenvy::dotenv().ok();

    // Unknown environment names are reported by Config::from_env below
    let log_level = config::Environment::from_env()
        .map(|environment| environment.log_level())
        .unwrap_or("info");

    // Initialize logging
    env_logger::init_from_env(env_logger::Env::new().default_filter_or(log_level));

    // Load configuration
    let config = config::Config::from_env().map_err(|e| {
        log::error!("Configuration error: {}", e);
        std::io::Error::new(std::io::ErrorKind::InvalidInput, e.to_string())
    })?;

    log::info!(
        "Starting distbot ({}) on {}:{}, posting to {}",
        config.environment,
        config.host,
        config.port,
        config.slack.channel
    );

    let state = AppState::from_config(&config, Arc::new(SystemClock)).map_err(|e| {
        log::error!("Startup error: {}", e);
        std::io::Error::other(e.to_string())
    })?;

    if !state.gate.is_enabled() {
        log::warn!("Webhook signature validation is DISABLED");
    } else if !state.gate.verifies_signatures() {
        log::warn!(
            "WEBHOOK_SIGNING_SECRET not set: webhook signatures are only checked for presence and timestamp freshness, NOT verified"
        );
    }

    log::info!(
        "Rate limit: {} requests per minute per client",
        config.security.rate_limit_per_minute
    );

    // Clone values for the closure
    let host = config.host.clone();
    let port = config.port;

    let server = HttpServer::new(move || {
        let cors = Cors::default()
            .allow_any_origin()
            .allowed_methods(vec!["GET", "POST", "OPTIONS"])
            .allowed_headers(vec![
                actix_web::http::header::ACCEPT,
                actix_web::http::header::CONTENT_TYPE,
                actix_web::http::header::HeaderName::from_static(
                    distbot::auth::SIGNATURE_HEADER,
                ),
                actix_web::http::header::HeaderName::from_static(
                    distbot::auth::TIMESTAMP_HEADER,
                ),
            ])
            .max_age(3600);

        let state = state.clone();
        App::new()
            .wrap(middleware::Logger::default())
            .wrap(cors)
            .configure(move |cfg| state.configure(cfg))
    })
    .bind((host.as_str(), port))?
    .shutdown_timeout(30)
    .run();

    // Spawn graceful shutdown handler
    let server_handle = server.handle();
    tokio::spawn(async move {
        shutdown_signal().await;
        log::info!("Shutdown signal received, stopping server...");
        server_handle.stop(true).await;
    });

    server.await
}

/// Wait for shutdown signal (Ctrl+C or SIGTERM)
async fn shutdown_signal() {
    let ctrl_c = async {
        match tokio::signal::ctrl_c().await {
            Ok(()) => {}
            Err(e) => {
                log::error!("Failed to install Ctrl+C handler: {}", e);
                // Wait forever if signal handler fails
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                log::error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
