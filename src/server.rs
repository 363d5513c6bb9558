//! HTTP API server.
//!
//! A thin JSON layer over the board. Page rendering and static assets are
//! served elsewhere; this server only answers data requests.
//!
//! # Endpoints
//!
//! | Method | Path | Description |
//! |--------|------|-------------|
//! | `GET`  | `/search?query=&offset=` | One page of ranked (or random) posts |
//! | `GET`  | `/postdata/{id}` | A single post, as a one-item page |
//! | `GET`  | `/stats.json` | Post count and top keywords |
//! | `GET`  | `/sitemap.xml` | Sitemap of every post |
//! | `GET`  | `/health` | Health check (version and board load state) |
//!
//! # Error Contract
//!
//! ```json
//! { "error": { "code": "not_found", "message": "cannot find post" } }
//! ```
//!
//! Error codes: `not_found` (404), `internal` (500).
//!
//! # Startup
//!
//! The board is populated in the background. The server accepts
//! connections immediately; board requests wait for the load to finish,
//! while `/health` answers right away and reports the load state.

use axum::{
    extract::{Path, Query, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};
use tower_http::cors::{Any, CorsLayer};

use crate::board::LoadState;
use crate::config::Config;
use crate::context::BoardContext;
use crate::get::{parse_post_id, post_page};
use crate::report::Severity;
use crate::search::{parse_offset, search_page, SearchPage};
use crate::sitemap::build_sitemap;
use crate::stats::{board_stats, Stats};

/// Starts the HTTP server.
///
/// Binds to `[server].bind`, kicks off board population, and serves until
/// the process is terminated.
pub async fn run_server(config: &Config) -> anyhow::Result<()> {
    let ctx = BoardContext::start(config).await?;
    serve(ctx).await
}

/// Serve an already-built context.
pub async fn serve(ctx: BoardContext) -> anyhow::Result<()> {
    let bind_addr = ctx.config.server.bind.clone();
    let app = router(ctx);

    let listener = tokio::net::TcpListener::bind(&bind_addr).await?;
    tracing::info!(address = %bind_addr, "server listening");
    axum::serve(listener, app).await?;

    Ok(())
}

/// All routes, with permissive CORS.
pub fn router(ctx: BoardContext) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/search", get(handle_search))
        .route("/postdata/{id}", get(handle_post_data))
        .route("/stats.json", get(handle_stats))
        .route("/sitemap.xml", get(handle_sitemap))
        .route("/health", get(handle_health))
        .layer(cors)
        .with_state(ctx)
}

// ============ Error response ============

#[derive(Serialize)]
struct ErrorBody {
    error: ErrorDetail,
}

#[derive(Serialize)]
struct ErrorDetail {
    code: String,
    message: String,
}

/// Internal error type that converts into an Axum HTTP response.
struct AppError {
    status: StatusCode,
    code: String,
    message: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let body = ErrorBody {
            error: ErrorDetail {
                code: self.code,
                message: self.message,
            },
        };
        (self.status, Json(body)).into_response()
    }
}

fn not_found(message: impl Into<String>) -> AppError {
    AppError {
        status: StatusCode::NOT_FOUND,
        code: "not_found".to_string(),
        message: message.into(),
    }
}

fn internal(message: impl Into<String>) -> AppError {
    AppError {
        status: StatusCode::INTERNAL_SERVER_ERROR,
        code: "internal".to_string(),
        message: message.into(),
    }
}

// ============ GET /search ============

#[derive(Debug, Deserialize)]
struct SearchQuery {
    #[serde(default)]
    query: String,
    /// Kept as a string so a malformed offset means `0` rather than a 400.
    #[serde(default)]
    offset: Option<String>,
}

async fn handle_search(
    State(ctx): State<BoardContext>,
    Query(params): Query<SearchQuery>,
) -> Json<SearchPage> {
    let offset = parse_offset(params.offset.as_deref());
    let mut rng = StdRng::from_entropy();
    let page = search_page(
        &ctx.board,
        &params.query,
        offset,
        ctx.config.search.max_results,
        &mut rng,
    )
    .await;
    Json(page)
}

// ============ GET /postdata/{id} ============

async fn handle_post_data(
    State(ctx): State<BoardContext>,
    Path(raw_id): Path<String>,
) -> Result<Json<SearchPage>, AppError> {
    let Some(id) = parse_post_id(&raw_id) else {
        ctx.reporter
            .report(Severity::Warning, "cannot parse post id", &[("id", raw_id.as_str())]);
        return Err(not_found("cannot parse post id"));
    };

    match post_page(&ctx.board, id).await {
        Some(page) => Ok(Json(page)),
        None => {
            ctx.reporter
                .report(Severity::Warning, "cannot find post", &[("id", raw_id.as_str())]);
            Err(not_found("cannot find post"))
        }
    }
}

// ============ GET /stats.json ============

async fn handle_stats(State(ctx): State<BoardContext>) -> Json<Stats> {
    Json(board_stats(&ctx.board, &ctx.keywords).await)
}

// ============ GET /sitemap.xml ============

async fn handle_sitemap(State(ctx): State<BoardContext>) -> Result<Response, AppError> {
    let urls = ctx.board.urls().await;
    let xml = build_sitemap(&ctx.config.server.host, &urls).map_err(|e| {
        tracing::error!(error = %e, "cannot build sitemap");
        internal(e.to_string())
    })?;
    Ok(([(header::CONTENT_TYPE, "application/xml")], xml).into_response())
}

// ============ GET /health ============

#[derive(Serialize)]
struct HealthResponse {
    status: String,
    version: String,
    board: LoadState,
}

async fn handle_health(State(ctx): State<BoardContext>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        board: ctx.board.load_state(),
    })
}
