//! HTTP API endpoint handlers.

use std::sync::Arc;

use axum::{
    Json,
    extract::{Query, State},
    http::StatusCode,
};

use crate::{
    infrastructure::dto::{
        http::{ErrorResponse, HistoryQuery, RoomSummaryDto, StatsDto},
        websocket::ChatMessageDto,
    },
    ui::state::AppState,
    usecase::{GetHistoryUseCase, HistoryError},
};

/// Health check endpoint
pub async fn health_check() -> Json<serde_json::Value> {
    Json(serde_json::json!({"status": "ok"}))
}

/// Recent messages, oldest first
pub async fn get_messages(
    State(state): State<Arc<AppState>>,
    Query(query): Query<HistoryQuery>,
) -> Result<Json<Vec<ChatMessageDto>>, (StatusCode, Json<ErrorResponse>)> {
    let usecase = GetHistoryUseCase::new(
        state.store.clone(),
        state.settings.history_limit,
        state.settings.history_max_limit,
    );

    match usecase.execute(query.room.as_deref(), query.limit).await {
        Ok(messages) => Ok(Json(messages.iter().map(ChatMessageDto::from).collect())),
        Err(e @ HistoryError::InvalidRoom(_)) => Err((
            StatusCode::BAD_REQUEST,
            Json(ErrorResponse {
                error: e.to_string(),
            }),
        )),
        Err(e @ HistoryError::Store(_)) => {
            tracing::error!("Failed to load history: {}", e);
            Err((
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse {
                    error: "Failed to load messages".to_string(),
                }),
            ))
        }
    }
}

/// Get list of rooms with live members
pub async fn get_rooms(State(state): State<Arc<AppState>>) -> Json<Vec<RoomSummaryDto>> {
    let mut rooms: Vec<RoomSummaryDto> = state
        .registry
        .count_by_room()
        .await
        .into_iter()
        .map(|(room, members)| RoomSummaryDto {
            room: room.into_string(),
            members,
        })
        .collect();
    rooms.sort_by(|a, b| a.room.cmp(&b.room));
    Json(rooms)
}

/// Connection and dispatch counters
pub async fn get_stats(State(state): State<Arc<AppState>>) -> Json<StatsDto> {
    let dispatch = state.stats.snapshot();
    Json(StatsDto {
        connections: state.registry.len().await,
        rooms: state.registry.count_by_room().await.len(),
        queue_available: state.queue.available(),
        messages: dispatch.messages,
        delivered: dispatch.delivered,
        failed: dispatch.failed,
    })
}
