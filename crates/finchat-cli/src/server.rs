//! HTTP query endpoint
//!
//! `POST /query` answers a single prompt with no conversation history. The
//! answer is streamed back as plain text while the model produces it.

use axum::{
    Json, Router,
    body::{Body, Bytes},
    extract::State,
    http::{StatusCode, header},
    response::{IntoResponse, Response},
    routing::{get, post},
};
use finchat_core::Error;
use finchat_llm::{ChunkStream, Message, StreamChunk};
use finchat_runtime::{APOLOGY, CompletionOrchestrator};
use futures::{Stream, StreamExt, stream};
use serde::Deserialize;
use serde_json::json;
use std::convert::Infallible;
use std::net::SocketAddr;
use std::sync::Arc;
use tracing::{error, info, warn};

const TEXT_PLAIN: &str = "text/plain; charset=utf-8";

/// Shared state for the handlers
#[derive(Clone)]
pub struct AppState {
    orchestrator: Arc<CompletionOrchestrator>,
    diagnostics: bool,
}

impl AppState {
    pub fn new(orchestrator: Arc<CompletionOrchestrator>, diagnostics: bool) -> Self {
        Self {
            orchestrator,
            diagnostics,
        }
    }

    fn failure_text(&self, err: &Error) -> String {
        if self.diagnostics {
            format!("{APOLOGY}\n\nDetails: {err}")
        } else {
            APOLOGY.to_string()
        }
    }
}

/// Request body for `POST /query`
#[derive(Debug, Deserialize)]
pub struct QueryRequest {
    pub query: String,
}

/// Build the application router
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(health))
        .route("/query", post(handle_query))
        .with_state(state)
}

/// Bind `addr` and serve until Ctrl-C
pub async fn serve(addr: SocketAddr, state: AppState) -> anyhow::Result<()> {
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!(addr = %listener.local_addr()?, "Listening");

    axum::serve(listener, router(state))
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
            info!("Shutting down");
        })
        .await?;

    Ok(())
}

async fn health() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}

async fn handle_query(
    State(state): State<AppState>,
    Json(request): Json<QueryRequest>,
) -> Response {
    let query = request.query.trim();
    if query.is_empty() {
        return (StatusCode::BAD_REQUEST, "query must not be empty").into_response();
    }

    info!(chars = query.chars().count(), "Query received");

    let prepared = match state.orchestrator.run(&[Message::user(query)]).await {
        Ok(prepared) => prepared,
        Err(e) => {
            error!(error = %e, "Query failed before streaming");
            return (
                StatusCode::BAD_GATEWAY,
                [(header::CONTENT_TYPE, TEXT_PLAIN)],
                state.failure_text(&e),
            )
                .into_response();
        }
    };

    let body = answer_body(prepared.stream, state);
    ([(header::CONTENT_TYPE, TEXT_PLAIN)], Body::from_stream(body)).into_response()
}

/// Text chunks as body bytes; a transport failure appends the apology and ends the body
fn answer_body(
    chunks: ChunkStream,
    state: AppState,
) -> impl Stream<Item = Result<Bytes, Infallible>> + Send + 'static {
    stream::unfold(Some(chunks), move |chunks| {
        let state = state.clone();
        async move {
            let mut chunks = chunks?;
            loop {
                match chunks.next().await? {
                    Ok(StreamChunk::Text(text)) => {
                        return Some((Ok::<_, Infallible>(Bytes::from(text)), Some(chunks)));
                    }
                    Ok(StreamChunk::ToolEvent { .. } | StreamChunk::Metadata { .. }) => {}
                    Err(e) => {
                        let err = Error::from(e);
                        warn!(error = %err, "Answer stream interrupted");
                        let tail = format!("\n\n{}", state.failure_text(&err));
                        return Some((Ok::<_, Infallible>(Bytes::from(tail)), None));
                    }
                }
            }
        }
    })
}
