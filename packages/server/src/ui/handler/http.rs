//! HTTP API endpoint handlers.

use std::sync::Arc;

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};

use crate::{
    domain::{ErrorCode, RoomId},
    infrastructure::dto::http::{
        ActiveRoomsDto, ArchivedRoomDetailDto, ArchivedRoomsDto, ErrorDto, HealthDto,
    },
    ui::state::AppState,
    usecase::GetArchivedRoomError,
};

type ApiError = (StatusCode, Json<ErrorDto>);

fn api_error(status: StatusCode, code: ErrorCode) -> ApiError {
    (status, Json(ErrorDto { code }))
}

fn internal_error(error: impl std::fmt::Display) -> ApiError {
    tracing::error!("Failed to serve HTTP request: {}", error);
    api_error(StatusCode::INTERNAL_SERVER_ERROR, ErrorCode::InternalError)
}

/// Health check endpoint
pub async fn health_check() -> Json<HealthDto> {
    Json(HealthDto { status: "ok" })
}

/// Active rooms with their participant counts
pub async fn get_active_rooms(
    State(state): State<Arc<AppState>>,
) -> Result<Json<ActiveRoomsDto>, ApiError> {
    let snapshots = state
        .query_rooms_usecase
        .active_rooms()
        .await
        .map_err(internal_error)?;

    // Domain Model から DTO への変換
    Ok(Json(ActiveRoomsDto {
        rooms: snapshots.iter().map(Into::into).collect(),
    }))
}

/// Archived rooms
pub async fn get_archived_rooms(
    State(state): State<Arc<AppState>>,
) -> Result<Json<ArchivedRoomsDto>, ApiError> {
    let rooms = state
        .query_rooms_usecase
        .archived_rooms()
        .await
        .map_err(internal_error)?;

    Ok(Json(ArchivedRoomsDto {
        rooms: rooms.iter().map(Into::into).collect(),
    }))
}

/// One archived room with its full message history
pub async fn get_archived_room(
    State(state): State<Arc<AppState>>,
    Path(room_id): Path<i64>,
) -> Result<Json<ArchivedRoomDetailDto>, ApiError> {
    match state
        .query_rooms_usecase
        .archived_room(RoomId::new(room_id))
        .await
    {
        Ok(archived) => Ok(Json(ArchivedRoomDetailDto {
            room: (&archived.room).into(),
            messages: archived.messages.iter().map(Into::into).collect(),
        })),
        Err(e @ (GetArchivedRoomError::RoomNotFound | GetArchivedRoomError::RoomNotArchived)) => {
            Err(api_error(StatusCode::NOT_FOUND, e.code()))
        }
        Err(GetArchivedRoomError::Repository(e)) => Err(internal_error(e)),
    }
}
