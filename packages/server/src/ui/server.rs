//! Server execution logic.

use std::sync::Arc;

use axum::{
    Router,
    routing::{get, patch, post},
};
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;

use super::{
    handler::{
        award_debate_win, create_debate, create_speak_request, debug_rooms, delete_debate,
        delete_speak_request, end_debate, get_debate, get_participants, health_check, host_mute,
        join_debate, leave_debate, list_debates, list_speak_requests, resolve_speak_request,
        self_mute, websocket_handler,
    },
    signal::shutdown_signal,
    state::AppState,
};

/// Debate room server
///
/// Serves the room WebSocket endpoint and the debate HTTP API over one
/// router. The hub dispatcher is spawned by the caller; the server only holds
/// a handle to it through [`AppState`].
///
/// # Example
///
/// ```ignore
/// let (state, hub) = assemble(Dependencies::in_memory(), config.connection);
/// tokio::spawn(hub.run());
/// Server::new(state).run("127.0.0.1".to_string(), 8080).await?;
/// ```
pub struct Server {
    state: Arc<AppState>,
}

impl Server {
    pub fn new(state: Arc<AppState>) -> Self {
        Self { state }
    }

    /// Build the router with every route attached.
    pub fn router(&self) -> Router {
        Router::new()
            // WebSocket エンドポイント
            .route("/ws", get(websocket_handler))
            // HTTP エンドポイント
            .route("/api/health", get(health_check))
            .route("/api/debates", get(list_debates).post(create_debate))
            .route("/api/debates/{id}", get(get_debate).delete(delete_debate))
            .route("/api/debates/{id}/end", post(end_debate))
            .route("/api/debates/{id}/award-win", post(award_debate_win))
            .route("/api/debates/{id}/join", post(join_debate))
            .route("/api/debates/{id}/leave", post(leave_debate))
            .route(
                "/api/debates/{id}/participants",
                get(get_participants).patch(host_mute),
            )
            .route("/api/debates/{id}/self-mute", patch(self_mute))
            .route(
                "/api/debates/{id}/speak-requests",
                get(list_speak_requests).post(create_speak_request),
            )
            .route(
                "/api/debates/{id}/speak-requests/{request_id}",
                patch(resolve_speak_request).delete(delete_speak_request),
            )
            .route("/debug/rooms", get(debug_rooms))
            .layer(TraceLayer::new_for_http())
            .with_state(self.state.clone())
    }

    /// Bind to `host:port` and serve until a shutdown signal arrives.
    ///
    /// # Errors
    ///
    /// Returns an error if the server fails to bind to the specified address or
    /// if there's an error during server execution.
    pub async fn run(self, host: String, port: u16) -> Result<(), std::io::Error> {
        let bind_addr = format!("{}:{}", host, port);
        let listener = TcpListener::bind(&bind_addr).await?;

        tracing::info!("Debate server listening on {}", listener.local_addr()?);
        tracing::info!("Connect to: ws://{}/ws?roomId=<id>&userId=<id>", bind_addr);
        tracing::info!("Press Ctrl+C to shutdown gracefully");

        axum::serve(listener, self.router())
            .with_graceful_shutdown(shutdown_signal())
            .await?;

        tracing::info!("Server shutdown complete");
        Ok(())
    }

    /// Serve on an already bound listener without a shutdown signal.
    pub async fn serve(self, listener: TcpListener) -> Result<(), std::io::Error> {
        axum::serve(listener, self.router()).await
    }
}
