//! HTTP route handlers.

use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post, put},
};
use chrono::Utc;
use tower_http::trace::TraceLayer;
use tracing::{debug, error, warn};

use crate::app::Intent;
use crate::board::BoardView;
use crate::domain::GlobalId;
use crate::mvg::TransitApi;
use crate::pins::{PinError, PinSlot};
use crate::resolver::Catalog;
use crate::search::SearchResults;

use super::dto::*;
use super::state::AppState;

/// Create the application router.
pub fn create_router<A: TransitApi>(state: AppState<A>) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/board", get(board::<A>))
        .route("/catalog", get(catalog::<A>))
        .route("/catalog/query", post(catalog_query::<A>))
        .route(
            "/stations/search",
            get(station_search::<A>).post(submit_station_search::<A>),
        )
        .route("/search/close", post(close_search::<A>))
        .route("/select", post(select_station::<A>))
        .route("/pins", get(pins::<A>))
        .route("/pins/:slot", put(set_pin::<A>))
        .route("/refresh", post(refresh::<A>))
        .route("/notifications", get(notifications::<A>))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Health check endpoint.
async fn health() -> &'static str {
    "ok"
}

/// Departure board for the selected station, as of now.
async fn board<A: TransitApi>(State(state): State<AppState<A>>) -> Json<BoardView> {
    Json(state.app.board(Utc::now()))
}

async fn catalog<A: TransitApi>(State(state): State<AppState<A>>) -> Json<Catalog> {
    Json(state.app.catalog())
}

/// Feed the station dropdown. Results land in the catalog once the query
/// has settled; the response is the search state right after submission.
async fn catalog_query<A: TransitApi>(
    State(state): State<AppState<A>>,
    Json(req): Json<QueryRequest>,
) -> Result<impl IntoResponse, AppError> {
    state.app.handle(Intent::DropdownQuery(req.query))?;
    Ok((StatusCode::ACCEPTED, Json::<SearchResults>(state.app.dropdown())))
}

/// Latest pin picker search results.
async fn station_search<A: TransitApi>(State(state): State<AppState<A>>) -> Json<SearchResults> {
    Json(state.app.panel())
}

/// Feed the pin picker's search box. Debounced like the dropdown; poll
/// `GET /stations/search` for the settled results.
async fn submit_station_search<A: TransitApi>(
    State(state): State<AppState<A>>,
    Json(req): Json<QueryRequest>,
) -> Result<impl IntoResponse, AppError> {
    state.app.handle(Intent::PanelQuery(req.query))?;
    Ok((StatusCode::ACCEPTED, Json::<SearchResults>(state.app.panel())))
}

/// The search view was closed: cancel pending and in-flight searches.
async fn close_search<A: TransitApi>(
    State(state): State<AppState<A>>,
) -> Result<StatusCode, AppError> {
    state.app.handle(Intent::CloseSearch)?;
    Ok(StatusCode::NO_CONTENT)
}

async fn select_station<A: TransitApi>(
    State(state): State<AppState<A>>,
    Json(req): Json<SelectRequest>,
) -> Result<Json<SelectResponse>, AppError> {
    let id = GlobalId::parse(&req.global_id).map_err(|e| AppError::BadRequest {
        message: format!("Invalid station id {:?}: {e}", req.global_id),
    })?;

    let selected = match state.app.select_station(&id) {
        Ok(_) => true,
        Err(e) => {
            debug!(error = %e, "ignoring selection");
            false
        }
    };
    Ok(Json(SelectResponse {
        selected,
        station: state.app.feed().station,
    }))
}

async fn pins<A: TransitApi>(State(state): State<AppState<A>>) -> Json<PinsResponse> {
    Json(PinsResponse {
        home: state.app.pin(PinSlot::Home),
        work: state.app.pin(PinSlot::Work),
    })
}

async fn set_pin<A: TransitApi>(
    State(state): State<AppState<A>>,
    Path(slot): Path<String>,
    Json(req): Json<SetPinRequest>,
) -> Result<Json<PinsResponse>, AppError> {
    let slot = PinSlot::parse(&slot).ok_or_else(|| AppError::NotFound {
        message: format!("Unknown pin slot: {slot}"),
    })?;
    let station = req
        .into_pinned()
        .map_err(|message| AppError::BadRequest { message })?;

    state.app.handle(Intent::SetPin(slot, station))?;

    Ok(Json(PinsResponse {
        home: state.app.pin(PinSlot::Home),
        work: state.app.pin(PinSlot::Work),
    }))
}

async fn refresh<A: TransitApi>(State(state): State<AppState<A>>) -> Result<StatusCode, AppError> {
    state.app.handle(Intent::Refresh)?;
    Ok(StatusCode::ACCEPTED)
}

/// Notifications raised since the last call.
async fn notifications<A: TransitApi>(
    State(state): State<AppState<A>>,
) -> Json<NotificationsResponse> {
    Json(NotificationsResponse {
        notifications: state.notifications.drain(),
    })
}

/// Application error type.
#[derive(Debug)]
pub enum AppError {
    BadRequest { message: String },
    NotFound { message: String },
    Internal { message: String },
}

impl From<PinError> for AppError {
    fn from(e: PinError) -> Self {
        AppError::Internal {
            message: e.to_string(),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> axum::response::Response {
        let (status, message) = match self {
            AppError::BadRequest { message } => (StatusCode::BAD_REQUEST, message),
            AppError::NotFound { message } => (StatusCode::NOT_FOUND, message),
            AppError::Internal { message } => (StatusCode::INTERNAL_SERVER_ERROR, message),
        };

        if status.is_server_error() {
            error!(%status, "{message}");
        } else {
            warn!(%status, "{message}");
        }

        let body = Json(ErrorResponse { error: message });
        (status, body).into_response()
    }
}
