// --------------------------------------------------
// Handles API endpoints related to task CRUD operations
// and working-hours settings management.
//
// Responsibilities:
// - Create / read / update / delete tasks
// - Toggle task completion
// - Get / update working-hours settings
// -------------------------------------------------

use axum::{
    extract::Path,
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::{Priority, Task, WorkHours};
use crate::scheduler;
use crate::store;

#[derive(Debug, Serialize)]
pub struct TasksResponse {
    pub now: String,
    pub tasks: Vec<Task>,
}

// -----------------------------
// GET /api/tasks
// Returns all tasks stored in db.json
// -----------------------------
pub async fn get_tasks() -> impl IntoResponse {
    let db = match store::load_db() {
        Ok(db) => db,
        Err(error) => {
            tracing::error!(%error, "failed to load db");
            return (StatusCode::INTERNAL_SERVER_ERROR, "failed to load db").into_response();
        }
    };

    Json(TasksResponse {
        now: Utc::now().to_rfc3339(),
        tasks: db.tasks,
    })
    .into_response()
}

#[derive(Debug, Deserialize)]
pub struct CreateTaskInput {
    pub title: String,
    pub priority: Priority,
    pub deadline: Option<String>, // RFC3339
    pub estimate_min: Option<i64>,
    pub tags: Option<Vec<String>>,
    pub notes: Option<String>,
}

// None means the deadline string did not parse; the inner Option is
// simply "no deadline set".
fn parse_deadline(input: Option<&str>) -> Option<Option<DateTime<Utc>>> {
    match input {
        None => Some(None),
        Some(raw) => DateTime::parse_from_rfc3339(raw)
            .map(|dt| Some(dt.with_timezone(&Utc)))
            .ok(),
    }
}

fn valid_estimate(estimate_min: Option<i64>) -> bool {
    match estimate_min {
        None => true,
        Some(m) => m > 0 && m <= scheduler::MAX_ESTIMATE_MIN,
    }
}

// -----------------------------
// POST /api/tasks
// Creates a new task and saves it to db.json
// -----------------------------
pub async fn create_task(Json(input): Json<CreateTaskInput>) -> impl IntoResponse {
    if input.title.trim().is_empty() {
        return (StatusCode::BAD_REQUEST, "title required").into_response();
    }
    if !valid_estimate(input.estimate_min) {
        return (StatusCode::BAD_REQUEST, "estimate_min must be 1..=10080").into_response();
    }
    let Some(deadline) = parse_deadline(input.deadline.as_deref()) else {
        return (StatusCode::BAD_REQUEST, "invalid deadline").into_response();
    };

    let mut db = match store::load_db() {
        Ok(db) => db,
        Err(error) => {
            tracing::error!(%error, "failed to load db");
            return (StatusCode::INTERNAL_SERVER_ERROR, "failed to load db").into_response();
        }
    };

    let task = Task {
        id: Uuid::new_v4(),
        title: input.title,
        priority: input.priority,
        deadline,
        estimate_min: input.estimate_min,
        completed: false,
        created_at: Utc::now(),
        tags: input.tags,
        notes: input.notes,
    };

    db.tasks.push(task.clone());

    if let Err(error) = store::save_db(&db) {
        tracing::error!(%error, "failed to save db");
        return (StatusCode::INTERNAL_SERVER_ERROR, "failed to save db").into_response();
    }

    Json(task).into_response()
}

#[derive(Debug, Deserialize)]
pub struct UpdateTaskInput {
    pub title: String,
    pub priority: Priority,
    pub deadline: Option<String>, // RFC3339
    pub estimate_min: Option<i64>,
    pub completed: bool,
    pub tags: Option<Vec<String>>,
    pub notes: Option<String>,
}

// -----------------------------
// PUT /api/tasks/:id
// Updates an existing task by ID
// ----------------------------
pub async fn update_task(
    Path(id): Path<String>,
    Json(input): Json<UpdateTaskInput>,
) -> impl IntoResponse {
    let id = match Uuid::parse_str(&id) {
        Ok(u) => u,
        Err(_) => return (StatusCode::BAD_REQUEST, "invalid id").into_response(),
    };

    if input.title.trim().is_empty() {
        return (StatusCode::BAD_REQUEST, "title required").into_response();
    }
    if !valid_estimate(input.estimate_min) {
        return (StatusCode::BAD_REQUEST, "estimate_min must be 1..=10080").into_response();
    }
    let Some(deadline) = parse_deadline(input.deadline.as_deref()) else {
        return (StatusCode::BAD_REQUEST, "invalid deadline").into_response();
    };

    let mut db = match store::load_db() {
        Ok(db) => db,
        Err(error) => {
            tracing::error!(%error, "failed to load db");
            return (StatusCode::INTERNAL_SERVER_ERROR, "failed to load db").into_response();
        }
    };

    let Some(t) = db.tasks.iter_mut().find(|t| t.id == id) else {
        return (StatusCode::NOT_FOUND, "task not found").into_response();
    };

    t.title = input.title;
    t.priority = input.priority;
    t.deadline = deadline;
    t.estimate_min = input.estimate_min;
    t.completed = input.completed;
    t.tags = input.tags;
    t.notes = input.notes;

    let updated = t.clone();

    if let Err(error) = store::save_db(&db) {
        tracing::error!(%error, "failed to save db");
        return (StatusCode::INTERNAL_SERVER_ERROR, "failed to save db").into_response();
    }

    Json(updated).into_response()
}

// -----------------------------
// DELETE /api/tasks/:id
// Removes a task permanently
// -----------------------------
pub async fn delete_task(Path(id): Path<String>) -> impl IntoResponse {
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

    let before = db.tasks.len();
    db.tasks.retain(|t| t.id != id);

    if db.tasks.len() == before {
        return (StatusCode::NOT_FOUND, "task not found").into_response();
    }

    if let Err(error) = store::save_db(&db) {
        tracing::error!(%error, "failed to save db");
        return (StatusCode::INTERNAL_SERVER_ERROR, "failed to save db").into_response();
    }

    Json(serde_json::json!({ "ok": true })).into_response()
}

// -----------------------------
// POST /api/tasks/:id/toggle
// Flips task completion
// -----------------------------
pub async fn toggle_task(Path(id): Path<String>) -> impl IntoResponse {
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

    let Some(t) = db.tasks.iter_mut().find(|t| t.id == id) else {
        return (StatusCode::NOT_FOUND, "task not found").into_response();
    };

    t.completed = !t.completed;

    let updated = t.clone();

    if let Err(error) = store::save_db(&db) {
        tracing::error!(%error, "failed to save db");
        return (StatusCode::INTERNAL_SERVER_ERROR, "failed to save db").into_response();
    }

    Json(updated).into_response()
}

// -----------------------------
// GET /api/settings
// Returns working-hours settings
// -----------------------------
pub async fn get_settings() -> impl IntoResponse {
    let db = match store::load_db() {
        Ok(db) => db,
        Err(error) => {
            tracing::error!(%error, "failed to load db");
            return (StatusCode::INTERNAL_SERVER_ERROR, "failed to load db").into_response();
        }
    };
    Json(db.settings).into_response()
}

// -----------------------------
// PUT /api/settings
// Updates working-hours settings
// -----------------------------
pub async fn put_settings(Json(s): Json<WorkHours>) -> impl IntoResponse {
    if let Err(reason) = s.validate() {
        return (StatusCode::BAD_REQUEST, reason).into_response();
    }

    let mut db = match store::load_db() {
        Ok(db) => db,
        Err(error) => {
            tracing::error!(%error, "failed to load db");
            return (StatusCode::INTERNAL_SERVER_ERROR, "failed to load db").into_response();
        }
    };

    db.settings = s;

    if let Err(error) = store::save_db(&db) {
        tracing::error!(%error, "failed to save db");
        return (StatusCode::INTERNAL_SERVER_ERROR, "failed to save db").into_response();
    }

    Json(db.settings).into_response()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_deadline_accepts_absent_and_rfc3339() {
        assert_eq!(parse_deadline(None), Some(None));
        let parsed = parse_deadline(Some("2026-03-02T09:00:00Z")).expect("valid deadline");
        assert_eq!(parsed.unwrap().to_rfc3339(), "2026-03-02T09:00:00+00:00");
    }

    #[test]
    fn parse_deadline_rejects_malformed() {
        assert_eq!(parse_deadline(Some("next tuesday")), None);
        assert_eq!(parse_deadline(Some("2026-03-02")), None);
    }

    #[test]
    fn valid_estimate_bounds() {
        assert!(valid_estimate(None));
        assert!(valid_estimate(Some(1)));
        assert!(valid_estimate(Some(scheduler::MAX_ESTIMATE_MIN)));
        assert!(!valid_estimate(Some(0)));
        assert!(!valid_estimate(Some(-30)));
        assert!(!valid_estimate(Some(scheduler::MAX_ESTIMATE_MIN + 1)));
        assert!(!valid_estimate(Some(i64::MAX)));
    }
}
