//! Aegis Server - REST API for face-recognition login
//!
//! Boots with whatever capabilities the environment provides: endpoints
//! whose backing capability is missing answer 503 instead of failing the
//! whole process at startup.

use std::net::SocketAddr;
use std::sync::Arc;

use aegis_core::{FaceExtractor, MatchPolicy, OracleFactory};
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use aegis_server::auth::TokenIssuer;
use aegis_server::config::Config;
use aegis_server::crop_store::CropStore;
use aegis_server::db::UserRepository;
use aegis_server::gallery_store::PostgresGalleryStore;
use aegis_server::routes::create_router_with_config;
use aegis_server::state::AppState;

#[tokio::main]
async fn main() -> Result<(), std::io::Error> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info,tower_http=debug")),
        )
        .init();

    println!("╔════════════════════════════════════════════╗");
    println!("║        AEGIS Face Login API v0.1.0         ║");
    println!("║      Face-Recognition Authentication       ║");
    println!("╚════════════════════════════════════════════╝");

    let config = Config::from_env();
    let state = build_state(&config).await;

    info!(
        database = state.gallery_store.is_some(),
        face_oracle = ?state.extractor.as_deref().map(|e| e.oracle_kind()),
        token_issuer = state.token_issuer.is_some(),
        crop_store = state.crop_store.is_some(),
        match_threshold = state.match_policy.threshold,
        "Capabilities resolved"
    );

    let app = create_router_with_config(&config, state);

    let addr = config.socket_addr();
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!("Listening on http://{}", addr);
    info!("API docs at http://{}/docs", addr);

    // ConnectInfo is required by the rate limiter's peer-IP key extractor.
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await
}

/// Assemble application state from configuration.
///
/// Each capability is attempted independently; a failure downgrades the
/// service instead of aborting startup.
async fn build_state(config: &Config) -> AppState {
    let (gallery_store, user_repo) = match &config.database_url {
        Some(url) => {
            match PostgresGalleryStore::new(
                url,
                config.database_max_connections,
                config.database_min_connections,
            )
            .await
            {
                Ok(store) => {
                    info!("Database connected, migrations applied");
                    let repo = UserRepository::new(store.pool().clone());
                    (Some(Arc::new(store)), Some(Arc::new(repo)))
                }
                Err(e) => {
                    error!("Database connection failed: {}", e);
                    (None, None)
                }
            }
        }
        None => {
            warn!("DATABASE_URL not set, running without persistence");
            (None, None)
        }
    };

    let token_issuer = match &config.token_secret {
        Some(secret) => Some(Arc::new(TokenIssuer::new(secret, config.token_ttl_minutes))),
        None => {
            warn!("TOKEN_SECRET not set, refusing to issue tokens");
            None
        }
    };

    let crop_store = match CropStore::new(&config.crop_dir) {
        Ok(store) => Some(Arc::new(store)),
        Err(e) => {
            warn!(
                "Crop store unavailable at {}: {}",
                config.crop_dir.display(),
                e
            );
            None
        }
    };

    AppState {
        gallery_store,
        user_repo,
        extractor: build_extractor(config),
        crop_store,
        token_issuer,
        match_policy: MatchPolicy::with_threshold(config.match_threshold),
        max_file_size: config.max_file_size_mb * 1024 * 1024,
    }
}

/// Pick the face oracle for this process.
///
/// Prefers the dlib models when both files are present; falls back to the
/// mock oracle only when explicitly allowed.
fn build_extractor(config: &Config) -> Option<Arc<FaceExtractor>> {
    #[cfg(feature = "dlib")]
    {
        use aegis_core::{DlibOracleConfig, OracleConfig};

        if config.landmark_model.exists() && config.encoder_model.exists() {
            let dlib_config =
                DlibOracleConfig::new(&config.landmark_model, &config.encoder_model);
            match OracleFactory::create(OracleConfig::Dlib(dlib_config)) {
                Ok(oracle) => {
                    info!("Face oracle: dlib models loaded");
                    return Some(Arc::new(FaceExtractor::new(oracle)));
                }
                Err(e) => error!("Failed to load dlib models: {}", e),
            }
        } else {
            warn!(
                "dlib model files not found ({} / {})",
                config.landmark_model.display(),
                config.encoder_model.display()
            );
        }
    }

    if config.allow_mock_oracle {
        warn!("Using MOCK face oracle (not for production)");
        return Some(Arc::new(FaceExtractor::new(OracleFactory::create_mock())));
    }

    warn!("No face oracle available, face endpoints disabled");
    None
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!("Failed to install Ctrl+C handler: {}", e);
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => error!("Failed to install SIGTERM handler: {}", e),
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!("Received Ctrl+C, shutting down"),
        _ = terminate => info!("Received SIGTERM, shutting down"),
    }
}
