pub mod dashboard;
pub mod views;

use std::sync::{Arc, Mutex};

use anyhow::Result;
use axum::routing::get;
use axum::Router;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;
use tracing::{error, info};

use crate::client::SlotApiClient;
use crate::store::{self, SlotStore};

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) store: Arc<Mutex<SlotStore>>,
}

pub async fn serve(base_url: &str, addr: &str) -> Result<()> {
    let client = SlotApiClient::new(base_url)?;

    let mut initial = SlotStore::new();
    if let Err(e) = initial.load_snapshot(&client).await {
        error!("Initial snapshot failed, starting with an empty board: {e:#}");
    }
    let store = Arc::new(Mutex::new(initial));

    // Keep the board live in the background for every request.
    tokio::spawn({
        let store = Arc::clone(&store);
        let client = client.clone();
        async move {
            if let Err(e) = store::run_live_updates(store, client).await {
                error!("Live updates stopped: {e:#}");
            }
        }
    });

    let app = Router::new()
        .route("/", get(dashboard::dashboard_handler))
        .layer(TraceLayer::new_for_http())
        .with_state(AppState { store });

    let listener = TcpListener::bind(addr).await?;
    info!("Dashboard listening on http://{}", addr);
    axum::serve(listener, app).await?;
    Ok(())
}
