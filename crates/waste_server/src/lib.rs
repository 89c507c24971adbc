//! HTTP server wiring for waste (routes, handlers, shared state, background expiry).

/// HTTP error mapping for handlers.
pub mod error;
/// Background expiry task.
pub mod expiry;
/// HTTP handlers for paste reads and writes.
pub mod handlers;
/// Syntax and terminal rendering.
pub mod render;
/// Bundled pastes written at startup.
pub mod seeds;
/// Page template.
pub mod template;

pub use render::{HtmlRenderer, Render};
pub use template::PageTemplate;
pub use waste_core::{config, db, models, AppError, Config, Database, DEFAULT_PORT};

use axum::{
    http::{header, HeaderValue},
    routing::get,
    Router,
};
use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::{
    compression::CompressionLayer, set_header::SetResponseHeaderLayer, trace::TraceLayer,
};
use waste_core::delivery::DeliveryPolicy;

const PAGE_CSP: &str = "default-src 'none'; style-src 'unsafe-inline'; script-src 'unsafe-inline'; connect-src 'self'; img-src data: 'self'; media-src data: 'self'; frame-src data: 'self'; frame-ancestors 'none'";

/// Shared state passed to HTTP handlers.
#[derive(Clone)]
pub struct AppState {
    pub db: Arc<Database>,
    pub config: Arc<Config>,
    pub delivery: Arc<DeliveryPolicy>,
    pub renderer: Arc<dyn Render>,
    pub pages: Arc<PageTemplate>,
}

impl AppState {
    /// Construct shared application state with the default HTML renderer.
    ///
    /// # Arguments
    /// - `config`: Loaded configuration.
    /// - `db`: Open database handle.
    ///
    /// # Errors
    /// Returns an error when the page template fails to compile.
    pub fn new(config: Config, db: Database) -> Result<Self, AppError> {
        Self::with_renderer(config, db, Arc::new(HtmlRenderer::new()))
    }

    /// Construct shared application state around a specific renderer.
    ///
    /// # Errors
    /// Returns an error when the page template fails to compile.
    pub fn with_renderer(
        config: Config,
        db: Database,
        renderer: Arc<dyn Render>,
    ) -> Result<Self, AppError> {
        Ok(Self {
            delivery: Arc::new(DeliveryPolicy::from_config(&config)),
            db: Arc::new(db),
            config: Arc::new(config),
            renderer,
            pages: Arc::new(PageTemplate::new()?),
        })
    }
}

/// Create the application router with all routes and middleware.
pub fn create_app(state: AppState) -> Router {
    use handlers::{paste, view};

    Router::new()
        .route(
            "/",
            get(view::front_page)
                .post(paste::write_root)
                .put(paste::write_root)
                .delete(paste::write_root),
        )
        .route("/new", get(view::new_page))
        .route("/r/:id", get(view::raw_paste))
        .route(
            "/:id",
            get(view::view_paste)
                .post(paste::write_paste)
                .put(paste::write_paste)
                .delete(paste::write_paste),
        )
        .with_state(state)
        .layer(
            tower::ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(CompressionLayer::new())
                .layer(SetResponseHeaderLayer::if_not_present(
                    header::CONTENT_SECURITY_POLICY,
                    HeaderValue::from_static(PAGE_CSP),
                )),
        )
}

/// Resolve the listener address from env var overrides and security policy.
///
/// # Arguments
/// - `config`: Server configuration containing the configured `port`.
/// - `allow_public_access`: Whether non-loopback bind targets are permitted.
///
/// # Returns
/// A validated socket address that enforces loopback when public access is disabled.
pub fn resolve_bind_address(config: &Config, allow_public_access: bool) -> SocketAddr {
    let default_bind = SocketAddr::from(([127, 0, 0, 1], config.port));
    let requested = match std::env::var("BIND") {
        Ok(value) => match value.trim().parse::<SocketAddr>() {
            Ok(addr) => addr,
            Err(err) => {
                tracing::warn!(
                    "Invalid BIND='{}': {}. Falling back to {}",
                    value,
                    err,
                    default_bind
                );
                default_bind
            }
        },
        Err(_) => default_bind,
    };

    if allow_public_access || requested.ip().is_loopback() {
        return requested;
    }

    tracing::warn!(
        "Non-loopback bind {} requested without ALLOW_PUBLIC_ACCESS; forcing 127.0.0.1",
        requested
    );
    SocketAddr::from(([127, 0, 0, 1], requested.port()))
}

/// Run the Axum server with graceful shutdown support.
///
/// # Errors
/// Returns any I/O error produced by `axum::serve`.
pub async fn serve_router(
    listener: tokio::net::TcpListener,
    state: AppState,
    shutdown_signal: impl Future<Output = ()> + Send + 'static,
) -> Result<(), std::io::Error> {
    let app = create_app(state);
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal)
        .await
}
