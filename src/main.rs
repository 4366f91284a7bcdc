// Define data modules
mod models; // Data structures (Task, TimeBlock, WorkHours, Db)
mod store; // Persistent storage (load/save db.json)
mod timeframe; // Civil-time frame conversion helpers
mod scheduler; // Core auto-scheduling engine
mod routes_tasks; // HTTP handlers for task & settings APIs
mod routes_schedule; // HTTP handlers for blocks & schedule runs

// Import axum routing utilities and Router
use axum::{
    routing::{delete, get, post, put}, // HTTP method helpers
    Router,                            // Main router type
};
use std::net::SocketAddr;
use tower_http::services::ServeDir; // Used to serve static files (HTML/CSS/JS)

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let api = Router::new()
        // schedule
        .route("/schedule", post(routes_schedule::run_schedule))
        // blocks
        .route("/blocks", get(routes_schedule::get_blocks))
        .route("/blocks/:id", delete(routes_schedule::delete_block))
        .route("/blocks/:id/complete", post(routes_schedule::complete_block))
        // tasks
        .route("/tasks", get(routes_tasks::get_tasks).post(routes_tasks::create_task))
        .route("/tasks/:id", put(routes_tasks::update_task).delete(routes_tasks::delete_task))
        .route("/tasks/:id/toggle", post(routes_tasks::toggle_task))
        // settings
        .route("/settings", get(routes_tasks::get_settings).put(routes_tasks::put_settings));

    let app = Router::new()
        .nest("/api", api)
        .nest_service("/", ServeDir::new("static"));

    let addr: SocketAddr = "127.0.0.1:3000".parse().expect("valid address");

    tracing::info!("server running at http://{addr}");
    tracing::info!("API base: http://{addr}/api");

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("bind failed");

    axum::serve(listener, app).await.expect("server error");
}
