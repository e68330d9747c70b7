//! HTTP handler functions for the surveillance map API.

use actix_web::{HttpResponse, web};
use surveillance_map_ai::answer_question;
use surveillance_map_geography::build_map_overlay;
use surveillance_map_records::RefreshOutcome;
use surveillance_map_server_models::{
    ApiHealth, ChatRequest, ChatResponse, ErrorResponse, RefreshResponse,
};

use crate::AppState;

/// `GET /api/health`
pub async fn health(state: web::Data<AppState>) -> HttpResponse {
    HttpResponse::Ok().json(ApiHealth {
        healthy: true,
        version: env!("CARGO_PKG_VERSION").to_string(),
        records: state.store.snapshot().len(),
        boundaries_loaded: state.boundaries.is_some(),
    })
}

/// `GET /api/data`
///
/// Returns every record of the current snapshot as a JSON array.
pub async fn data(state: web::Data<AppState>) -> HttpResponse {
    HttpResponse::Ok().json(&state.store.snapshot().records)
}

/// `POST /api/refresh-data`
///
/// Reloads records from the configured source. On failure the previous
/// snapshot keeps being served.
pub async fn refresh(state: web::Data<AppState>) -> HttpResponse {
    match state.store.refresh(state.source.as_ref()).await {
        Ok(RefreshOutcome::Replaced { rows } | RefreshOutcome::Unchanged { rows }) => {
            HttpResponse::Ok().json(RefreshResponse::success(rows))
        }
        Ok(RefreshOutcome::AlreadyRunning) => {
            HttpResponse::Conflict().json(RefreshResponse::error("Refresh already in progress"))
        }
        Err(e) => {
            log::error!("Refresh failed: {e}");
            HttpResponse::InternalServerError().json(RefreshResponse::error(e.to_string()))
        }
    }
}

/// `POST /api/chat`
///
/// Answers a free-text question about the current snapshot.
pub async fn chat(state: web::Data<AppState>, body: web::Json<ChatRequest>) -> HttpResponse {
    let snapshot = state.store.snapshot();
    log::info!("Chat question: {:?}", body.message);

    let response = answer_question(
        state.generator.as_deref(),
        &snapshot.records,
        &body.message,
    )
    .await;

    HttpResponse::Ok().json(ChatResponse { response })
}

/// `GET /api/map-data/{year}`
///
/// Returns the district boundaries annotated with case totals for `year`.
pub async fn map_data(state: web::Data<AppState>, path: web::Path<i32>) -> HttpResponse {
    let year = path.into_inner();
    let snapshot = state.store.snapshot();

    match build_map_overlay(
        &snapshot.records,
        state.boundaries.as_deref(),
        year,
        &state.district_property,
    ) {
        Ok(overlay) => HttpResponse::Ok().json(overlay),
        Err(e) => {
            log::warn!("Map data for {year} unavailable: {e}");
            HttpResponse::InternalServerError().json(ErrorResponse {
                error: e.to_string(),
            })
        }
    }
}
