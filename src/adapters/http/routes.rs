use axum::{
    extract::{Multipart, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use tracing::{error, warn};

use crate::adapters::http::state::HttpState;
use crate::application::dto::{
    CoordinatesPayload, DetectAccepted, NoticeResponse, SendAlertRequest, StateResponse, SubmitFeedbackRequest,
};
use crate::application::services::DispatchOutcome;
use crate::domain::{
    environment::Coordinates,
    errors::DomainError,
    image::ImageAsset,
};

fn error_response(e: DomainError) -> Response {
    let status = match &e {
        DomainError::Validation(_) => StatusCode::BAD_REQUEST,
        DomainError::InvalidTransition { .. } | DomainError::NoImage => StatusCode::CONFLICT,
        DomainError::Request { .. } => StatusCode::BAD_GATEWAY,
        DomainError::GeolocationUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
    };
    (status, Json(json!({ "error": e.to_string() }))).into_response()
}

pub async fn get_state(State(st): State<HttpState>) -> impl IntoResponse {
    Json(StateResponse { state: st.orchestrator.view() })
}

pub async fn upload_image(State(st): State<HttpState>, mut multipart: Multipart) -> Response {
    loop {
        let field = match multipart.next_field().await {
            Ok(Some(field)) => field,
            Ok(None) => break,
            Err(e) => return (StatusCode::BAD_REQUEST, Json(json!({ "error": e.to_string() }))).into_response(),
        };
        if field.name() != Some("file") {
            continue;
        }
        let name = field.file_name().unwrap_or("upload").to_string();
        let media_type = field.content_type().unwrap_or("application/octet-stream").to_string();
        let bytes = match field.bytes().await {
            Ok(b) => b.to_vec(),
            Err(e) => return (StatusCode::BAD_REQUEST, Json(json!({ "error": e.to_string() }))).into_response(),
        };

        // Preview decoding is CPU-bound; keep it off the async workers.
        let orchestrator = st.orchestrator.clone();
        let asset = ImageAsset::new(name, media_type, bytes);
        return match tokio::task::spawn_blocking(move || orchestrator.select_image(asset)).await {
            Ok(Ok(view)) => Json(StateResponse { state: view }).into_response(),
            Ok(Err(e)) => {
                warn!("Upload rejected: {}", e);
                error_response(e)
            }
            Err(e) => {
                error!("Image selection task failed: {}", e);
                (StatusCode::INTERNAL_SERVER_ERROR, Json(json!({ "error": "image selection failed" }))).into_response()
            }
        };
    }
    (StatusCode::BAD_REQUEST, Json(json!({ "error": "missing multipart field 'file'" }))).into_response()
}

pub async fn clear_image(State(st): State<HttpState>) -> impl IntoResponse {
    Json(StateResponse { state: st.orchestrator.clear_image() })
}

pub async fn reselect_image(State(st): State<HttpState>) -> Response {
    match st.orchestrator.reselect() {
        Ok(view) => Json(StateResponse { state: view }).into_response(),
        Err(e) => error_response(e),
    }
}

/// Starts a run and returns immediately; progress is pushed over `/ws/state`.
pub async fn start_detection(State(st): State<HttpState>) -> Response {
    match st.orchestrator.begin_detection() {
        Ok((run_id, asset)) => {
            let orchestrator = st.orchestrator.clone();
            tokio::spawn(async move {
                orchestrator.execute(run_id, asset).await;
            });
            (StatusCode::ACCEPTED, Json(DetectAccepted { run_id })).into_response()
        }
        Err(e) => error_response(e),
    }
}

pub async fn report_location(State(st): State<HttpState>, Json(req): Json<CoordinatesPayload>) -> Response {
    match Coordinates::try_from(req) {
        Ok(coords) => {
            st.location.report(coords);
            Json(json!({ "ok": true })).into_response()
        }
        Err(e) => error_response(e),
    }
}

/// Withdraws the reported fix; later runs fall back to the default position.
pub async fn forget_location(State(st): State<HttpState>) -> impl IntoResponse {
    st.location.forget();
    Json(json!({ "ok": true }))
}

pub async fn send_alert(State(st): State<HttpState>, Json(req): Json<SendAlertRequest>) -> Response {
    let view = st.orchestrator.view();
    match st.alerts.dispatch(&req.to_phone, view.result.as_ref(), view.weather.as_ref()).await {
        Ok(DispatchOutcome::Sent(_)) => Json(NoticeResponse::ok("Alert sent")).into_response(),
        Ok(DispatchOutcome::Skipped) => {
            Json(NoticeResponse::failed("Nothing to send: enter a phone number after a detection")).into_response()
        }
        Ok(DispatchOutcome::Rejected(reason)) => Json(NoticeResponse::failed(reason)).into_response(),
        Err(e) => {
            error!("Alert failed: {:?}", e);
            (StatusCode::BAD_GATEWAY, Json(NoticeResponse::failed("Failed to send alert"))).into_response()
        }
    }
}

pub async fn submit_feedback(State(st): State<HttpState>, Json(req): Json<SubmitFeedbackRequest>) -> Response {
    let record = st.orchestrator.feedback_record(req.correct_label, req.comments);
    match st.feedback.submit(record).await {
        Ok(_) => Json(NoticeResponse::ok("Thanks for your feedback")).into_response(),
        Err(e) => {
            error!("Feedback failed: {:?}", e);
            (StatusCode::BAD_GATEWAY, Json(NoticeResponse::failed("Failed to submit feedback"))).into_response()
        }
    }
}
