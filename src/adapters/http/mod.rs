pub mod routes;
pub mod state;
pub mod ws;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};

use crate::adapters::http::state::HttpState;
use crate::adapters::http::ws::ws_handler;

const MAX_UPLOAD_BYTES: usize = 20 * 1024 * 1024;

pub fn router(state: HttpState) -> Router {
    Router::new()
        .route("/api/state", get(routes::get_state))
        .route("/api/image", post(routes::upload_image).delete(routes::clear_image))
        .route("/api/reselect", post(routes::reselect_image))
        .route("/api/detect", post(routes::start_detection))
        .route("/api/location", post(routes::report_location).delete(routes::forget_location))
        .route("/api/alert", post(routes::send_alert))
        .route("/api/feedback", post(routes::submit_feedback))
        .route("/ws/state", get(ws_handler))
        .layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES))
        .with_state(state)
}
