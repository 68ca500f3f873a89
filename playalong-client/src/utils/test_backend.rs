use crate::report::WatchTimeReport;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Form, Json, Router};
use parking_lot::Mutex;
use serde_json::json;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::net::TcpListener;
use url::Url;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum BackendReply {
	#[default]
	Accept,
	Refuse,
	PlainText,
	ServerError,
}

#[derive(Default)]
struct BackendState {
	comments: Mutex<HashMap<String, Vec<f64>>>,
	request_reports: Mutex<Vec<WatchTimeReport>>,
	beacon_reports: Mutex<Vec<WatchTimeReport>>,
	reply: Mutex<BackendReply>,
}

/// A local stand-in for the comment and watch time endpoints.
pub struct TestBackend {
	address: std::net::SocketAddr,
	state: Arc<BackendState>,
}

impl TestBackend {
	pub async fn start() -> Self {
		let state = Arc::new(BackendState::default());
		let router = Router::new()
			.route("/api/comments/{media_id}", get(comments))
			.route("/update_watch_time", post(update_watch_time))
			.route("/update_watch_time_beacon", post(update_watch_time_beacon))
			.with_state(state.clone());

		let listener = TcpListener::bind("127.0.0.1:0")
			.await
			.expect("Failed to bind test backend");
		let address = listener.local_addr().expect("Failed to get test backend address");
		tokio::spawn(async move {
			axum::serve(listener, router).await.expect("Test backend failed");
		});

		Self { address, state }
	}

	pub fn url(&self) -> Url {
		Url::parse(&format!("http://{}/", self.address)).expect("Invalid test backend URL")
	}

	pub fn request_url(&self) -> Url {
		self.url().join("update_watch_time").expect("Invalid request URL")
	}

	pub fn beacon_url(&self) -> Url {
		self.url().join("update_watch_time_beacon").expect("Invalid beacon URL")
	}

	pub fn set_comments(&self, media_id: &str, timestamps: Vec<f64>) {
		self.state.comments.lock().insert(media_id.to_owned(), timestamps);
	}

	pub fn set_reply(&self, reply: BackendReply) {
		*self.state.reply.lock() = reply;
	}

	pub fn request_reports(&self) -> Vec<WatchTimeReport> {
		self.state.request_reports.lock().clone()
	}

	pub fn beacon_reports(&self) -> Vec<WatchTimeReport> {
		self.state.beacon_reports.lock().clone()
	}
}

async fn comments(State(state): State<Arc<BackendState>>, Path(media_id): Path<String>) -> Response {
	match state.comments.lock().get(&media_id) {
		Some(timestamps) => Json(timestamps.clone()).into_response(),
		None => StatusCode::NOT_FOUND.into_response(),
	}
}

async fn update_watch_time(State(state): State<Arc<BackendState>>, Json(report): Json<WatchTimeReport>) -> Response {
	state.request_reports.lock().push(report);

	let reply = *state.reply.lock();
	match reply {
		BackendReply::Accept => Json(json!({"success": true, "message": "Watch time updated"})).into_response(),
		BackendReply::Refuse => Json(json!({"success": false, "message": "Media not found"})).into_response(),
		BackendReply::PlainText => "Internal error".into_response(),
		BackendReply::ServerError => (
			StatusCode::INTERNAL_SERVER_ERROR,
			Json(json!({"success": false, "message": "Database unavailable"})),
		)
			.into_response(),
	}
}

async fn update_watch_time_beacon(
	State(state): State<Arc<BackendState>>,
	Form(report): Form<WatchTimeReport>,
) -> StatusCode {
	state.beacon_reports.lock().push(report);
	StatusCode::NO_CONTENT
}
