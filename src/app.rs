use anyhow::Result;
use axum::{
    extract::State,
    http::{header, StatusCode},
    response::{Html, IntoResponse, Response},
    routing::get,
    Form, Json, Router,
};
use axum_extra::extract::cookie::{Cookie, CookieJar};
use serde::Deserialize;
use serde_json::json;
use std::{env, net::SocketAddr, sync::Arc};
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::trace::TraceLayer;
use tracing::{error, info, warn};

use crate::askfred::{AskFredClient, RosterSource};
use crate::export;
use crate::models::RosterResults;
use crate::parser;
use crate::render;
use crate::session::{self, SessionStore};
use crate::tracker;

const MAX_BODY_BYTES: usize = 1024 * 1024; // pasted blobs are a few hundred lines at most
const DEFAULT_PORT: u16 = 8080;

#[derive(Clone)]
pub struct AppState {
    pub roster: Arc<dyn RosterSource>,
    pub sessions: SessionStore,
    pub signing_secret: String,
}

pub async fn run_server() -> Result<()> {
    let roster: Arc<dyn RosterSource> = Arc::new(AskFredClient::new()?);
    let state = AppState {
        roster,
        sessions: SessionStore::new(),
        signing_secret: signing_secret(),
    };

    let app = build_router(state);

    let port = env::var("PORT")
        .ok()
        .and_then(|p| p.parse().ok())
        .unwrap_or(DEFAULT_PORT);
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    info!("Listening on {}", addr);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}

fn signing_secret() -> String {
    env::var("SESSION_SECRET")
        .ok()
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| {
            warn!("SESSION_SECRET not set - using a development-only default");
            "development-only-secret-replace-me".to_string()
        })
}

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(index).post(generate))
        .route("/export.csv", get(export_csv))
        .route("/health", get(health))
        .layer(RequestBodyLimitLayer::new(MAX_BODY_BYTES))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn health() -> impl IntoResponse {
    Json(json!({"status": "ok"}))
}

async fn index() -> Html<String> {
    Html(render::render_page(None))
}

#[derive(Deserialize)]
pub struct GenerateForm {
    #[serde(default)]
    pub askfred_url: String,
    #[serde(default)]
    pub pasted_text: String,
}

/// Runs whichever ingestion path the form supplies, buffers the rows
/// for the session's export, and renders the result list. Fetch or
/// parse trouble degrades to an empty result set; the handler never
/// fails outright.
async fn generate(
    State(state): State<AppState>,
    jar: CookieJar,
    Form(form): Form<GenerateForm>,
) -> (CookieJar, Html<String>) {
    let url = form.askfred_url.trim();
    let results = if !url.is_empty() {
        match state.roster.fetch_events(url).await {
            Ok(events) => {
                info!("Extracted {} event(s) from tournament page", events.len());
                RosterResults::Events(events)
            }
            Err(e) => {
                warn!("Failed to load tournament page: {e:#}");
                RosterResults::Events(Vec::new())
            }
        }
    } else {
        let fencers = tracker::enrich_all(parser::parse_entrant_text(&form.pasted_text));
        info!("Parsed {} fencer(s) from pasted text", fencers.len());
        RosterResults::Entrants(fencers)
    };

    let session_id = jar
        .get(session::SESSION_COOKIE)
        .and_then(|c| session::verify_cookie_value(c.value(), &state.signing_secret))
        .unwrap_or_else(session::mint_session_id);

    state.sessions.store(&session_id, results.export_rows()).await;

    let cookie = Cookie::build((
        session::SESSION_COOKIE,
        session::cookie_value(&session_id, &state.signing_secret),
    ))
    .path("/")
    .http_only(true)
    .build();

    (jar.add(cookie), Html(render::render_page(Some(&results))))
}

/// Replays the session's last-aggregated record set as a CSV download.
/// A missing, stale, or tampered session yields a header-only document,
/// never an error status.
async fn export_csv(State(state): State<AppState>, jar: CookieJar) -> Response {
    let rows = match jar
        .get(session::SESSION_COOKIE)
        .and_then(|c| session::verify_cookie_value(c.value(), &state.signing_secret))
    {
        Some(session_id) => state
            .sessions
            .fetch(&session_id)
            .await
            .unwrap_or_default(),
        None => Vec::new(),
    };

    match export::write_csv(&rows) {
        Ok(body) => (
            StatusCode::OK,
            [
                (header::CONTENT_TYPE, "text/csv".to_string()),
                (
                    header::CONTENT_DISPOSITION,
                    format!("attachment;filename={}", export::EXPORT_FILENAME),
                ),
            ],
            body,
        )
            .into_response(),
        Err(e) => {
            error!("Failed to build CSV export: {e:#}");
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{signal, SignalKind};
        let mut term = signal(SignalKind::terminate()).expect("failed to install SIGTERM handler");
        term.recv().await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Shutdown signal received (Ctrl+C)");
        }
        _ = terminate => {
            info!("Shutdown signal received (SIGTERM)");
        }
    }
}
