// --------------------------------------------------
// Handles API endpoints for time blocks and schedule runs.
//
// Responsibilities:
// - List / delete / complete time blocks
// - Run the auto-scheduler and persist the new blocks
// -------------------------------------------------

use axum::{
    extract::Path,
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use chrono::{NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::TimeBlock;
use crate::scheduler;
use crate::store;

#[derive(Debug, Serialize)]
pub struct BlocksResponse {
    pub now: String,
    pub blocks: Vec<TimeBlock>,
}

// -----------------------------
// GET /api/blocks
// Returns all time blocks stored in db.json
// -----------------------------
pub async fn get_blocks() -> impl IntoResponse {
    let db = match store::load_db() {
        Ok(db) => db,
        Err(error) => {
            tracing::error!(%error, "failed to load db");
            return (StatusCode::INTERNAL_SERVER_ERROR, "failed to load db").into_response();
        }
    };

    Json(BlocksResponse {
        now: Utc::now().to_rfc3339(),
        blocks: db.blocks,
    })
    .into_response()
}

// -----------------------------
// DELETE /api/blocks/:id
// Removes a block permanently
// -----------------------------
pub async fn delete_block(Path(id): Path<String>) -> impl IntoResponse {
    let id = match Uuid::parse_str(&id) {
        Ok(u) => u,
        Err(_) => return (StatusCode::BAD_REQUEST, "invalid id").into_response(),
    };

    let mut db = match store::load_db() {
        Ok(db) => db,
        Err(error) => {
            tracing::error!(%error, "failed to load db");
            return (StatusCode::INTERNAL_SERVER_ERROR, "failed to load db").into_response();
        }
    };

    let before = db.blocks.len();
    db.blocks.retain(|b| b.id != id);

    if db.blocks.len() == before {
        return (StatusCode::NOT_FOUND, "block not found").into_response();
    }

    if let Err(error) = store::save_db(&db) {
        tracing::error!(%error, "failed to save db");
        return (StatusCode::INTERNAL_SERVER_ERROR, "failed to save db").into_response();
    }

    Json(serde_json::json!({ "ok": true })).into_response()
}

// -----------------------------
// POST /api/blocks/:id/complete
// Marks a block as completed
// -----------------------------
pub async fn complete_block(Path(id): Path<String>) -> impl IntoResponse {
    let id = match Uuid::parse_str(&id) {
        Ok(u) => u,
        Err(_) => return (StatusCode::BAD_REQUEST, "invalid id").into_response(),
    };

    let mut db = match store::load_db() {
        Ok(db) => db,
        Err(error) => {
            tracing::error!(%error, "failed to load db");
            return (StatusCode::INTERNAL_SERVER_ERROR, "failed to load db").into_response();
        }
    };

    let Some(b) = db.blocks.iter_mut().find(|b| b.id == id) else {
        return (StatusCode::NOT_FOUND, "block not found").into_response();
    };

    b.completed = true;
    let updated = b.clone();

    if let Err(error) = store::save_db(&db) {
        tracing::error!(%error, "failed to save db");
        return (StatusCode::INTERNAL_SERVER_ERROR, "failed to save db").into_response();
    }

    Json(updated).into_response()
}

#[derive(Debug, Deserialize)]
pub struct ScheduleRequest {
    pub anchor_date: Option<String>, // "YYYY-MM-DD"
}

#[derive(Debug, Serialize)]
pub struct UnplannedResponse {
    pub task_id: String,
    pub reason: String,
}

#[derive(Debug, Serialize)]
pub struct ScheduleResponse {
    pub now: String,
    pub created: Vec<TimeBlock>,
    pub unplanned: Vec<UnplannedResponse>,
}

// -----------------------------
// POST /api/schedule
// Places every unscheduled pending task into a free slot and persists
// the resulting blocks
// -----------------------------
pub async fn run_schedule(Json(req): Json<ScheduleRequest>) -> impl IntoResponse {
    let anchor = match req.anchor_date.as_deref() {
        None => None,
        Some(raw) => match NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
            Ok(d) => Some(d),
            Err(_) => return (StatusCode::BAD_REQUEST, "invalid anchor_date").into_response(),
        },
    };

    let mut db = match store::load_db() {
        Ok(db) => db,
        Err(error) => {
            tracing::error!(%error, "failed to load db");
            return (StatusCode::INTERNAL_SERVER_ERROR, "failed to load db").into_response();
        }
    };

    let policy = match db.settings.resolve() {
        Ok(p) => p,
        Err(reason) => return (StatusCode::BAD_REQUEST, reason).into_response(),
    };

    let now = Utc::now();
    let (created, unplanned) =
        scheduler::generate_schedule(&db.tasks, &db.blocks, &policy, now, anchor);

    db.blocks.extend(created.iter().cloned());

    if let Err(error) = store::save_db(&db) {
        tracing::error!(%error, "failed to save db");
        return (StatusCode::INTERNAL_SERVER_ERROR, "failed to save db").into_response();
    }

    tracing::info!(
        created = created.len(),
        unplanned = unplanned.len(),
        anchored = anchor.is_some(),
        "schedule run"
    );

    let unplanned_resp: Vec<UnplannedResponse> = unplanned
        .into_iter()
        .map(|u| UnplannedResponse {
            task_id: u.task_id.to_string(),
            reason: u.reason,
        })
        .collect();

    Json(ScheduleResponse {
        now: now.to_rfc3339(),
        created,
        unplanned: unplanned_resp,
    })
    .into_response()
}
