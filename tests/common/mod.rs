//! In-process stand-in for the detection backend.

#![allow(dead_code)]

use std::sync::Arc;
use std::time::Duration;

use axum::{
    extract::{Multipart, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::post,
    Json, Router,
};
use parking_lot::Mutex;
use serde_json::{json, Value};

use peanutguard::config::AppConfig;

#[derive(Clone, Default)]
pub struct Behaviour {
    pub fail_detect: bool,
    pub fail_weather: bool,
    pub fail_satellite: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Upload {
    pub field: String,
    pub file_name: Option<String>,
    pub content_type: Option<String>,
    pub size: usize,
}

#[derive(Clone, Default)]
pub struct Recorded {
    pub calls: Arc<Mutex<Vec<String>>>,
    pub uploads: Arc<Mutex<Vec<Upload>>>,
    pub bodies: Arc<Mutex<Vec<(String, Value)>>>,
}

impl Recorded {
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().clone()
    }

    pub fn uploads(&self) -> Vec<Upload> {
        self.uploads.lock().clone()
    }

    pub fn body(&self, path: &str) -> Option<Value> {
        self.bodies.lock().iter().rev().find(|(p, _)| p == path).map(|(_, v)| v.clone())
    }
}

#[derive(Clone)]
struct StubState {
    behaviour: Behaviour,
    recorded: Recorded,
}

pub struct StubBackend {
    pub url: String,
    pub recorded: Recorded,
}

impl StubBackend {
    pub fn config(&self) -> AppConfig {
        AppConfig {
            api_url: self.url.clone(),
            http_timeout: Duration::from_secs(5),
            geolocation_timeout: Duration::from_millis(200),
            ..AppConfig::default()
        }
    }
}

pub async fn spawn_backend(behaviour: Behaviour) -> StubBackend {
    let recorded = Recorded::default();
    let state = StubState { behaviour, recorded: recorded.clone() };
    let app = Router::new()
        .route("/detect", post(detect))
        .route("/weather", post(weather))
        .route("/satellite", post(satellite))
        .route("/alert", post(alert))
        .route("/feedback", post(feedback))
        .with_state(state);

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    StubBackend { url: format!("http://{addr}"), recorded }
}

fn record(st: &StubState, path: &str, body: Option<Value>) {
    st.recorded.calls.lock().push(path.to_string());
    if let Some(body) = body {
        st.recorded.bodies.lock().push((path.to_string(), body));
    }
}

fn failure() -> Response {
    (StatusCode::INTERNAL_SERVER_ERROR, Json(json!({ "detail": "boom" }))).into_response()
}

async fn detect(State(st): State<StubState>, mut multipart: Multipart) -> Response {
    record(&st, "/detect", None);
    while let Some(field) = multipart.next_field().await.unwrap() {
        let upload = Upload {
            field: field.name().unwrap_or_default().to_string(),
            file_name: field.file_name().map(str::to_string),
            content_type: field.content_type().map(str::to_string),
            size: 0,
        };
        let size = field.bytes().await.unwrap().len();
        st.recorded.uploads.lock().push(Upload { size, ..upload });
    }
    if st.behaviour.fail_detect {
        return failure();
    }
    Json(json!({
        "pestName": "Aphis craccivora",
        "confidence": 92.3,
        "description": "Small insects on leaves and stems causing leaf curling and yellowing.",
        "severity": "medium",
        "recommendations": [
            "Use insecticidal soap solution",
            "Encourage beneficial insects",
            "Apply reflective mulch",
            "Regular monitoring required"
        ]
    }))
    .into_response()
}

async fn weather(State(st): State<StubState>, Json(body): Json<Value>) -> Response {
    record(&st, "/weather", Some(body));
    if st.behaviour.fail_weather {
        return failure();
    }
    Json(json!({ "temp_c": 31, "rain_mm_next_24h": 0, "advice": "No rain expected; spray in the early morning." }))
        .into_response()
}

async fn satellite(State(st): State<StubState>, Json(body): Json<Value>) -> Response {
    record(&st, "/satellite", Some(body));
    if st.behaviour.fail_satellite {
        return failure();
    }
    Json(json!({ "ndvi": 0.42, "description": "Moderate vegetation vigour." })).into_response()
}

async fn alert(State(st): State<StubState>, Json(body): Json<Value>) -> Response {
    record(&st, "/alert", Some(body.clone()));
    let phone = body["to_phone"].as_str().unwrap_or_default();
    if phone.len() < 8 {
        return Json(json!({ "status": "error", "message": "Invalid phone number" })).into_response();
    }
    Json(json!({ "status": "sent", "to": phone })).into_response()
}

async fn feedback(State(st): State<StubState>, Json(body): Json<Value>) -> Response {
    record(&st, "/feedback", Some(body));
    Json(json!({ "status": "ok" })).into_response()
}

/// Minimal valid PNG.
pub fn png_bytes() -> Vec<u8> {
    let img = image::RgbImage::from_pixel(8, 8, image::Rgb([30, 140, 50]));
    let mut out = std::io::Cursor::new(Vec::new());
    image::DynamicImage::ImageRgb8(img)
        .write_to(&mut out, image::ImageFormat::Png)
        .unwrap();
    out.into_inner()
}
