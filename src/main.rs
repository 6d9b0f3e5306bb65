mod core;
mod features;
mod modules;
mod shared;

use crate::core::config::{Config, StorageBackend, StorageConfig};
use crate::core::middleware;
use crate::core::session::SessionStore;
use crate::features::apartments::{models::ApartmentDirectory, routes as apartment_routes, ApartmentState};
use crate::features::reports::{routes as report_routes, ReportService, ReportState};
use crate::modules::google::{
    AccessTokenSource, DriveClient, ServiceAccountTokenManager, SheetsClient, SCOPE_DRIVE,
    SCOPE_SPREADSHEETS,
};
use crate::modules::storage::{
    DrivePhotoStore, JsonFileStore, LocalPhotoStore, PhotoStore, ReportStore, SheetsReportStore,
};
use crate::shared::constants::APARTMENTS;
use crate::shared::templates::TemplateEngine;
use axum::{extract::DefaultBodyLimit, Router};
use std::sync::Arc;
use tower_http::request_id::{PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::services::ServeDir;
use tower_http::trace::{DefaultOnRequest, DefaultOnResponse, TraceLayer};
use tracing::Level;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

fn main() -> anyhow::Result<()> {
    // Build Tokio runtime with configurable worker threads
    let worker_threads = std::env::var("TOKIO_WORKER_THREADS")
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or_else(|| {
            std::thread::available_parallelism()
                .map(|p| p.get())
                .unwrap_or(4)
        });

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .worker_threads(worker_threads)
        .enable_all()
        .build()?;

    runtime.block_on(async_main(worker_threads))
}

async fn async_main(worker_threads: usize) -> anyhow::Result<()> {
    // Load .env file BEFORE initializing logger so RUST_LOG is available
    let _ = dotenvy::dotenv();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    let config = Config::from_env().map_err(|e| anyhow::anyhow!(e))?;
    tracing::info!(
        "Configuration loaded: backend={:?}, tokio_worker_threads={}, pid={}",
        config.storage.backend,
        worker_threads,
        std::process::id()
    );

    let apartments = Arc::new(ApartmentDirectory::from_roster(APARTMENTS));
    let templates = Arc::new(TemplateEngine::new()?);
    tracing::info!("Templates loaded");

    // Pick the persistence strategy
    let (report_store, photo_store) = build_stores(&config, &apartments)?;
    tracing::info!("Report store initialized ({})", report_store.backend_name());

    let report_service = Arc::new(ReportService::new(report_store, photo_store));

    let sessions = Arc::new(SessionStore::new(
        config.app.session_ttl,
        config.app.session_cookie_secure,
    ));
    tracing::info!(
        "Session store initialized (idle ttl {}s)",
        config.app.session_ttl.as_secs()
    );

    // Simple health check endpoint
    async fn health_check() -> axum::http::StatusCode {
        axum::http::StatusCode::OK
    }
    let health_route = Router::new().route("/health", axum::routing::get(health_check));

    let page_routes = Router::new()
        .merge(apartment_routes::routes(ApartmentState {
            apartments: Arc::clone(&apartments),
            templates: Arc::clone(&templates),
        }))
        .merge(report_routes::routes(
            ReportState {
                report_service,
                apartments,
                templates,
            },
            config.app.max_request_body_size,
        ))
        .route_layer(axum::middleware::from_fn_with_state(
            sessions,
            middleware::session_middleware,
        ));

    let app = Router::new()
        .merge(page_routes)
        .merge(health_route)
        .nest_service(
            "/static/uploads",
            ServeDir::new(&config.storage.upload_dir),
        )
        .layer(DefaultBodyLimit::max(config.app.max_request_body_size))
        // Propagate X-Request-Id to response headers
        .layer(PropagateRequestIdLayer::x_request_id())
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(middleware::MakeSpanWithRequestId)
                .on_request(DefaultOnRequest::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        // Generate X-Request-Id using UUID v7 (or use client-provided one)
        .layer(SetRequestIdLayer::x_request_id(middleware::MakeRequestUuid));

    // Start server
    let addr = config.app.server_address();
    let socket_addr: std::net::SocketAddr = addr
        .parse()
        .map_err(|e| anyhow::anyhow!("Invalid address: {}", e))?;

    // Use socket2 for TCP listener configuration
    let socket = socket2::Socket::new(
        socket2::Domain::for_address(socket_addr),
        socket2::Type::STREAM,
        Some(socket2::Protocol::TCP),
    )?;

    socket.set_reuse_address(true)?;
    socket.set_nodelay(true)?;
    socket.set_nonblocking(true)?;
    socket.bind(&socket_addr.into())?;
    socket.listen(1024)?;

    let listener = tokio::net::TcpListener::from_std(socket.into())?;
    tracing::info!("Server listening on {}", format!("http://{}", addr));

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server stopped");
    Ok(())
}

/// Wire the report and photo stores for the configured backend
fn build_stores(
    config: &Config,
    apartments: &ApartmentDirectory,
) -> anyhow::Result<(Arc<dyn ReportStore>, Arc<dyn PhotoStore>)> {
    let StorageConfig {
        backend,
        data_file,
        upload_dir,
    } = &config.storage;
    let local_photos = LocalPhotoStore::new(upload_dir);

    if *backend == StorageBackend::File {
        tracing::info!("Using JSON data file {}", data_file.display());
        return Ok((
            Arc::new(JsonFileStore::new(data_file, apartments.clone())),
            Arc::new(local_photos),
        ));
    }

    let google = config
        .google
        .as_ref()
        .ok_or_else(|| anyhow::anyhow!("Google configuration is required for {:?}", backend))?;

    let scopes: &[&str] = match backend {
        StorageBackend::SheetsDrive => &[SCOPE_SPREADSHEETS, SCOPE_DRIVE],
        _ => &[SCOPE_SPREADSHEETS],
    };
    let tokens: Arc<dyn AccessTokenSource> = Arc::new(
        ServiceAccountTokenManager::from_file(&google.credentials_file, scopes)
            .map_err(|e| anyhow::anyhow!("Failed to load Google credentials: {}", e))?,
    );

    let sheets = SheetsClient::new(
        &google.sheets_api_base,
        &google.spreadsheet_id,
        Arc::clone(&tokens),
    )?;
    let report_store: Arc<dyn ReportStore> =
        Arc::new(SheetsReportStore::new(sheets, &google.sheet_name));
    tracing::info!(
        "Using spreadsheet {} (sheet {})",
        google.spreadsheet_id,
        google.sheet_name
    );

    let photo_store: Arc<dyn PhotoStore> = match (backend, google.drive_folder_id.as_deref()) {
        (StorageBackend::SheetsDrive, Some(folder_id)) => {
            let drive = DriveClient::new(&google.drive_api_base, folder_id, tokens)?;
            tracing::info!("Photos will be published to Drive folder {}", folder_id);
            Arc::new(DrivePhotoStore::new(local_photos, Arc::new(drive)))
        }
        (StorageBackend::SheetsDrive, None) => {
            anyhow::bail!("DRIVE_FOLDER_ID is required for the sheets_drive backend")
        }
        _ => Arc::new(local_photos),
    };

    Ok((report_store, photo_store))
}

async fn shutdown_signal() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => tracing::info!("Shutdown signal received"),
        Err(e) => {
            // Without a signal handler the server simply runs until killed
            tracing::error!("Failed to listen for shutdown signal: {}", e);
            std::future::pending::<()>().await;
        }
    }
}
