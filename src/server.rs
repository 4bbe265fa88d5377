//! Query Service HTTP server.
//!
//! Read-only JSON API over the two scrape stores. Every listing endpoint
//! takes a `departamento` query parameter (minimum 2 characters) and
//! answers with the envelope
//!
//! ```json
//! { "fuente": "Foursquare", "departamento": "Sucre", "total": 2, "sitios": [...] }
//! ```
//!
//! # Endpoints
//!
//! | Method | Path | Description |
//! |--------|------|-------------|
//! | `GET` | `/foursquare/sities_clean` | curated site listing |
//! | `GET` | `/foursquare/sities_full` | full site documents |
//! | `GET` | `/foursquare/reseñantes` | curated reviewer listing |
//! | `GET` | `/foursquare/reseñantes_full` | full reviewer documents |
//! | `GET` | `/foursquare/tips_expand` | one row per embedded tip |
//! | `GET` | `/google/sities` | curated site listing with rating |
//! | `GET` | `/google/sities_full` | full site documents |
//! | `GET` | `/ping` | liveness check against both stores |
//!
//! # Error Contract
//!
//! `{ "error": { "code", "message", "departamento"? } }` with codes
//! `bad_request` (400), `not_found` (404, region echoed back) and
//! `storage` (500, underlying fault text attached). Not-found wins when
//! both could apply: validation runs first, storage faults are only
//! reachable once the region is acceptable.
//!
//! # CORS
//!
//! All origins, methods, and headers are permitted so the browser
//! dashboard can call the service cross-origin.

use axum::{
    extract::{Query, State},
    routing::get,
    Json, Router,
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::cors::{Any, CorsLayer};
use tracing::info;

use crate::config::Config;
use crate::db::{self, Stores};
use crate::error::ApiError;
use crate::models::{RatedSiteSummary, Reviewer, ReviewerSummary, Site, SiteSummary};
use crate::query::{
    expanded_tips, regional_listing, EmptyTips, COLL_GOOGLE_SITES, COLL_REVIEWERS, COLL_SITES,
};

const FUENTE_FOURSQUARE: &str = "Foursquare";
const FUENTE_GOOGLE: &str = "Google Maps";

/// Shared application state passed to all route handlers via Axum's
/// `State` extractor.
#[derive(Clone)]
struct AppState {
    stores: Stores,
    config: Arc<Config>,
}

/// Binds the configured address and serves until the process is terminated.
pub async fn run_server(config: &Config, bind: &str) -> anyhow::Result<()> {
    let stores = db::connect(config).await?;
    let listener = TcpListener::bind(bind).await?;
    info!("query service listening on http://{}", bind);
    serve(listener, stores, config.clone()).await
}

/// Serves on an already-bound listener. Split out of [`run_server`] so the
/// integration tests can bind an ephemeral port first.
pub async fn serve(listener: TcpListener, stores: Stores, config: Config) -> anyhow::Result<()> {
    let app = router(stores.clone(), config);
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    stores.close().await;
    Ok(())
}

fn router(stores: Stores, config: Config) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let state = AppState {
        stores,
        config: Arc::new(config),
    };

    // The reviewer paths are registered literally and percent-encoded:
    // routing happens before percent-decoding, and clients send either form.
    Router::new()
        .route("/foursquare/sities_clean", get(foursquare_sites_clean))
        .route("/foursquare/sities_full", get(foursquare_sites_full))
        .route("/foursquare/reseñantes", get(foursquare_reviewers))
        .route("/foursquare/rese%C3%B1antes", get(foursquare_reviewers))
        .route("/foursquare/reseñantes_full", get(foursquare_reviewers_full))
        .route(
            "/foursquare/rese%C3%B1antes_full",
            get(foursquare_reviewers_full),
        )
        .route("/foursquare/tips_expand", get(foursquare_tips_expand))
        .route("/google/sities", get(google_sites))
        .route("/google/sities_full", get(google_sites_full))
        .route("/ping", get(ping))
        .layer(cors)
        .with_state(state)
}

async fn shutdown_signal() {
    let _ = tokio::signal::ctrl_c().await;
}

/// Region filter shared by every listing endpoint.
#[derive(Deserialize)]
struct RegionQuery {
    departamento: String,
}

/// Success envelope: fixed fields plus a per-entity key for the rows.
fn envelope<T: Serialize>(
    fuente: &str,
    departamento: &str,
    entity_key: &str,
    items: &[T],
) -> Result<Json<Value>, ApiError> {
    let mut body = Map::new();
    body.insert("fuente".to_string(), json!(fuente));
    body.insert("departamento".to_string(), json!(departamento));
    body.insert("total".to_string(), json!(items.len()));
    body.insert(
        entity_key.to_string(),
        serde_json::to_value(items).map_err(|e| ApiError::Storage(e.to_string()))?,
    );
    Ok(Json(Value::Object(body)))
}

fn no_sites(departamento: &str) -> ApiError {
    ApiError::not_found(departamento, format!("No hay sitios en {}", departamento))
}

fn no_reviewers(departamento: &str) -> ApiError {
    ApiError::not_found(
        departamento,
        format!("No se encontraron reseñantes en {}", departamento),
    )
}

fn no_tips(departamento: &str) -> ApiError {
    ApiError::not_found(
        departamento,
        format!(
            "No se encontraron tips en el departamento {}",
            departamento
        ),
    )
}

async fn foursquare_sites_clean(
    State(state): State<AppState>,
    Query(q): Query<RegionQuery>,
) -> Result<Json<Value>, ApiError> {
    let sites: Vec<Site> =
        regional_listing(&state.stores.foursquare, COLL_SITES, &q.departamento).await?;
    if sites.is_empty() {
        return Err(no_sites(&q.departamento));
    }
    let items: Vec<SiteSummary> = sites.iter().map(SiteSummary::from).collect();
    envelope(FUENTE_FOURSQUARE, &q.departamento, "sitios", &items)
}

async fn foursquare_sites_full(
    State(state): State<AppState>,
    Query(q): Query<RegionQuery>,
) -> Result<Json<Value>, ApiError> {
    let sites: Vec<Site> =
        regional_listing(&state.stores.foursquare, COLL_SITES, &q.departamento).await?;
    if sites.is_empty() {
        return Err(no_sites(&q.departamento));
    }
    envelope(FUENTE_FOURSQUARE, &q.departamento, "sitios", &sites)
}

async fn foursquare_reviewers(
    State(state): State<AppState>,
    Query(q): Query<RegionQuery>,
) -> Result<Json<Value>, ApiError> {
    let reviewers: Vec<Reviewer> =
        regional_listing(&state.stores.foursquare, COLL_REVIEWERS, &q.departamento).await?;
    if reviewers.is_empty() {
        return Err(no_reviewers(&q.departamento));
    }
    let items: Vec<ReviewerSummary> = reviewers.iter().map(ReviewerSummary::from).collect();
    envelope(FUENTE_FOURSQUARE, &q.departamento, "reseñantes", &items)
}

async fn foursquare_reviewers_full(
    State(state): State<AppState>,
    Query(q): Query<RegionQuery>,
) -> Result<Json<Value>, ApiError> {
    let reviewers: Vec<Reviewer> =
        regional_listing(&state.stores.foursquare, COLL_REVIEWERS, &q.departamento).await?;
    if reviewers.is_empty() {
        return Err(no_reviewers(&q.departamento));
    }
    envelope(FUENTE_FOURSQUARE, &q.departamento, "reseñantes", &reviewers)
}

/// Not-found is evaluated against the flattened rows: matching parents
/// whose tip lists are all empty still answer 404.
async fn foursquare_tips_expand(
    State(state): State<AppState>,
    Query(q): Query<RegionQuery>,
) -> Result<Json<Value>, ApiError> {
    let rows = expanded_tips(&state.stores.foursquare, &q.departamento, EmptyTips::Drop).await?;
    if rows.is_empty() {
        return Err(no_tips(&q.departamento));
    }
    envelope(FUENTE_FOURSQUARE, &q.departamento, "tips", &rows)
}

async fn google_sites(
    State(state): State<AppState>,
    Query(q): Query<RegionQuery>,
) -> Result<Json<Value>, ApiError> {
    let sites: Vec<Site> =
        regional_listing(&state.stores.google, COLL_GOOGLE_SITES, &q.departamento).await?;
    if sites.is_empty() {
        return Err(no_sites(&q.departamento));
    }
    let items: Vec<RatedSiteSummary> = sites.iter().map(RatedSiteSummary::from).collect();
    envelope(FUENTE_GOOGLE, &q.departamento, "sitios", &items)
}

async fn google_sites_full(
    State(state): State<AppState>,
    Query(q): Query<RegionQuery>,
) -> Result<Json<Value>, ApiError> {
    let sites: Vec<Site> =
        regional_listing(&state.stores.google, COLL_GOOGLE_SITES, &q.departamento).await?;
    if sites.is_empty() {
        return Err(no_sites(&q.departamento));
    }
    envelope(FUENTE_GOOGLE, &q.departamento, "sitios", &sites)
}

/// JSON response body for `GET /ping`.
#[derive(Serialize)]
struct PingResponse {
    status: &'static str,
    bases: [String; 2],
}

async fn ping(State(state): State<AppState>) -> Result<Json<PingResponse>, ApiError> {
    db::ping(&state.stores.foursquare)
        .await
        .map_err(|e| ApiError::Storage(format!("Error de conexión: {}", e)))?;
    db::ping(&state.stores.google)
        .await
        .map_err(|e| ApiError::Storage(format!("Error de conexión: {}", e)))?;
    Ok(Json(PingResponse {
        status: "ok",
        bases: [
            state.config.foursquare_db.clone(),
            state.config.google_db.clone(),
        ],
    }))
}
