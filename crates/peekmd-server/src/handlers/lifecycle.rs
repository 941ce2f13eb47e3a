//! Browser keep-alive handlers.
//!
//! The page pings on load and calls `/close` when it unloads. A reload
//! produces a close immediately followed by a ping, so shutdown waits for
//! the close grace period and only proceeds if no ping arrived meanwhile.

use std::sync::Arc;

use axum::extract::State;

use crate::state::AppState;

/// Handle GET /ping.
pub(crate) async fn ping(State(state): State<Arc<AppState>>) -> &'static str {
    state.mark_open();
    "ok"
}

/// Handle GET /close.
pub(crate) async fn close(State(state): State<Arc<AppState>>) -> &'static str {
    state.mark_closed();

    let state = Arc::clone(&state);
    tokio::spawn(async move {
        tokio::time::sleep(state.close_grace()).await;
        if state.is_open() {
            tracing::debug!("Preview reopened, keeping server alive");
        } else {
            state.shutdown.notify_one();
        }
    });

    "ok"
}
