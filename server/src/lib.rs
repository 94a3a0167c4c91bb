//! Lookout HTTP service.
//!
//! A thin axum shell over the job runner: submission, status polling,
//! results and report download. Business logic lives in the `crates/`
//! directory.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]

pub mod error;
pub mod handlers;
pub mod maintenance;
pub mod report;
pub mod state;

pub use error::{ApiError, ApiResult};
pub use state::AppState;

use axum::{
    routing::{get, post},
    Router,
};
use handlers::search;
use tower_http::trace::TraceLayer;

/// Build the application router.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/search", post(search::submit_search))
        .route("/status/{id}", get(search::search_status))
        .route("/results/{id}", get(search::search_results))
        .route("/download/{id}", get(search::download_report))
        .route("/health", get(handlers::health_check))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Initialize the tracing subscriber.
///
/// `RUST_LOG` wins; otherwise `debug` selects `info,lookout=debug`.
pub fn init_tracing(debug: bool) {
    use tracing_subscriber::{fmt, prelude::*, EnvFilter};

    let default = if debug { "info,lookout=debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    tracing_subscriber::registry()
        .with(fmt::layer().with_target(true))
        .with(filter)
        .init();
}
