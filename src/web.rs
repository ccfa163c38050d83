use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::{Context, Result};
use axum::Router;
use axum::extract::State;
use axum::response::Json;
use axum::routing::get;
use tokio::net::TcpListener;
use tokio::sync::watch;
use tokio_util::sync::CancellationToken;
use tracing::{info, instrument};

use crate::events::GridSnapshot;
use crate::source::{ImageSource, Listing, load_universe};

struct AppState<S> {
    source: Arc<S>,
    snapshots: watch::Receiver<GridSnapshot>,
}

impl<S> Clone for AppState<S> {
    fn clone(&self) -> Self {
        Self {
            source: Arc::clone(&self.source),
            snapshots: self.snapshots.clone(),
        }
    }
}

/// `GET /api/images` lists the source; `GET /api/grid` returns the latest grid snapshot.
pub fn router<S: ImageSource + 'static>(
    source: Arc<S>,
    snapshots: watch::Receiver<GridSnapshot>,
) -> Router {
    let state = AppState { source, snapshots };
    Router::new()
        .route("/api/images", get(list_images::<S>))
        .route("/api/grid", get(grid_snapshot::<S>))
        .with_state(state)
}

#[instrument(skip_all, fields(%bind_addr))]
pub async fn serve<S: ImageSource + 'static>(
    source: Arc<S>,
    snapshots: watch::Receiver<GridSnapshot>,
    bind_addr: SocketAddr,
    cancel: CancellationToken,
) -> Result<()> {
    let app = router(source, snapshots);
    let listener = TcpListener::bind(bind_addr)
        .await
        .with_context(|| format!("failed to bind grid web server on {bind_addr}"))?;
    info!("grid web server listening");

    axum::serve(listener, app.into_make_service())
        .with_graceful_shutdown(cancel.cancelled_owned())
        .await
        .context("grid web server exited")?;
    info!("grid web server stopped");
    Ok(())
}

async fn list_images<S: ImageSource>(State(state): State<AppState<S>>) -> Json<Listing> {
    let files = load_universe(state.source.as_ref()).await;
    Json(Listing { files })
}

async fn grid_snapshot<S>(State(state): State<AppState<S>>) -> Json<GridSnapshot> {
    Json(state.snapshots.borrow().clone())
}
