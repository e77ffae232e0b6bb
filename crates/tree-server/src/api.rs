//! The three JSON endpoints.
//!
//! Every response uses the `{"success": ..., "data" | "error": ...}`
//! envelope; database failures map to 500 with a human-readable message
//! and no internal details.

use std::sync::Arc;

use axum::Json;
use axum::extract::State;
use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use serde::{Deserialize, Serialize};
use tracing::{error, info};

use crate::config::Config;
use crate::db::Db;
use tree_core::{Gradient, LeafType, Note, NoteDraft, RemoteStats};

/// Shared application state
pub struct AppState {
    pub config: Config,
    pub db: Db,
}

#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

impl<T> ApiResponse<T> {
    fn ok(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
        }
    }

    fn error(message: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(message.into()),
        }
    }
}

/// Insert payload. Everything optional so required-field misses produce
/// the 400 envelope instead of a deserialization rejection.
#[derive(Debug, Default, Deserialize)]
pub struct IncomingLeaf {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub teacher: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub x: Option<i32>,
    #[serde(default)]
    pub y: Option<i32>,
    #[serde(rename = "type", default)]
    pub leaf_type: Option<LeafType>,
    #[serde(default)]
    pub gradient: Option<Gradient>,
}

impl IncomingLeaf {
    fn into_draft(self) -> Result<NoteDraft, &'static str> {
        let required = |value: Option<String>| {
            value.filter(|v| !v.trim().is_empty())
        };
        let (Some(name), Some(teacher), Some(message)) = (
            required(self.name),
            required(self.teacher),
            required(self.message),
        ) else {
            return Err("Missing required fields: name, teacher, message");
        };
        Ok(NoteDraft {
            student_name: name,
            teacher_name: teacher,
            message,
            x: self.x,
            y: self.y,
            leaf_type: self.leaf_type,
            gradient: self.gradient,
        })
    }
}

/// POST /api/add-leaf
pub async fn add_leaf(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<IncomingLeaf>, JsonRejection>,
) -> (StatusCode, Json<ApiResponse<Note>>) {
    let Ok(Json(payload)) = payload else {
        return (
            StatusCode::BAD_REQUEST,
            Json(ApiResponse::error("Invalid JSON body")),
        );
    };

    let draft = match payload.into_draft() {
        Ok(draft) => draft,
        Err(message) => {
            return (StatusCode::BAD_REQUEST, Json(ApiResponse::error(message)));
        }
    };

    match state.db.insert_leaf(&draft, &state.config.leaf_defaults).await {
        Ok(note) => {
            info!("Leaf added: {} -> {}", note.student_name, note.teacher_name);
            (StatusCode::CREATED, Json(ApiResponse::ok(note)))
        }
        Err(err) => {
            error!("Database error on insert: {}", err);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ApiResponse::error("Failed to save the leaf to the database")),
            )
        }
    }
}

/// GET /api/get-leaves
pub async fn get_leaves(
    State(state): State<Arc<AppState>>,
) -> (StatusCode, Json<ApiResponse<Vec<Note>>>) {
    match state.db.list_recent(state.config.list_cap).await {
        Ok(notes) => (StatusCode::OK, Json(ApiResponse::ok(notes))),
        Err(err) => {
            error!("Database error on list: {}", err);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ApiResponse::error("Failed to load leaves from the database")),
            )
        }
    }
}

/// GET /api/stats
pub async fn stats(
    State(state): State<Arc<AppState>>,
) -> (StatusCode, Json<ApiResponse<RemoteStats>>) {
    match state.db.stats(state.config.recent_window_hours).await {
        Ok(stats) => (StatusCode::OK, Json(ApiResponse::ok(stats))),
        Err(err) => {
            error!("Database error on stats: {}", err);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ApiResponse::error("Failed to compute statistics")),
            )
        }
    }
}
