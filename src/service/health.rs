//! Liveness endpoint for hosting platforms.

use axum::{Router, routing::get};
use tokio::net::TcpListener;
use tracing::{info, instrument};

use crate::base::types::Void;

/// The body served on `GET /`.
pub const ALIVE: &str = "genie-bridge is alive!";

/// Builds the health router.
pub fn router() -> Router {
    Router::new().route("/", get(|| async { ALIVE }))
}

/// Serves the health router on `port` until the process exits.
#[instrument]
pub async fn serve(port: u16) -> Void {
    let listener = TcpListener::bind(("0.0.0.0", port)).await?;

    info!("Health endpoint listening on {}", listener.local_addr()?);

    axum::serve(listener, router()).await?;

    Ok(())
}
