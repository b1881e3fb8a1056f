use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use axum::Router;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, patch, post};
use axum::Json;
use serde_json::Value;
use tokio::net::TcpListener;
use tokio::task::JoinHandle;

use ceport_api::models::{LoginRequest, RegisterRequest, SensorName, SensorStatus, User};
use ceport_client::Client;

pub struct MockState {
    pub accounts: Vec<(User, String)>,
    pub readings: Vec<Value>,
    pub statuses: HashMap<SensorName, bool>,
    /// Raw body served by `/sensors/last` instead of the newest reading.
    pub last_override: Option<&'static str>,
    /// Status answered by a successful login in place of 201.
    pub login_status: StatusCode,
}

type Shared = Arc<Mutex<MockState>>;

/// In-memory REST backend listening on a random local port.
pub struct MockBackend {
    pub base_url: String,
    pub state: Shared,
    server: JoinHandle<()>,
}

impl MockBackend {
    pub async fn new() -> Self {
        let state = Arc::new(Mutex::new(MockState {
            accounts: vec![(
                User {
                    id: "6746c1".to_string(),
                    email: "driver@test.com".to_string(),
                    name: Some("Driver".to_string()),
                    created_at: Some("2025-11-26T10:00:00.000Z".to_string()),
                },
                "secret".to_string(),
            )],
            readings: Vec::new(),
            statuses: [(SensorName::Ult01, true), (SensorName::Ult02, false)]
                .into_iter()
                .collect(),
            last_override: None,
            login_status: StatusCode::CREATED,
        }));

        let router = Router::new()
            .route("/auth/login", post(login))
            .route("/auth/register", post(register))
            .route("/auth/users", get(list_users))
            .route("/sensors", get(list_readings))
            .route("/sensors/last", get(last_reading))
            .route("/sensor-status", get(list_statuses))
            .route("/sensor-status/:name", get(get_status))
            .route("/sensor-status/:name/activate", patch(activate))
            .route("/sensor-status/:name/deactivate", patch(deactivate))
            .with_state(Arc::clone(&state));

        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let address = listener.local_addr().unwrap();

        let server = tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });

        Self {
            base_url: format!("http://{address}/"),
            state,
            server,
        }
    }

    pub fn client(&self) -> Client {
        Client::with_http(reqwest::Client::new(), &self.base_url)
    }

    pub fn push_reading(&self, reading: Value) {
        self.state.lock().unwrap().readings.push(reading);
    }

    pub fn is_active(&self, name: SensorName) -> Option<bool> {
        self.state.lock().unwrap().statuses.get(&name).copied()
    }
}

impl Drop for MockBackend {
    fn drop(&mut self) {
        self.server.abort();
    }
}

async fn login(State(state): State<Shared>, Json(body): Json<LoginRequest>) -> Response {
    let state = state.lock().unwrap();

    match state
        .accounts
        .iter()
        .find(|(user, password)| user.email == body.email && *password == body.password)
    {
        Some((user, _)) => (state.login_status, Json(user.clone())).into_response(),
        None => StatusCode::UNAUTHORIZED.into_response(),
    }
}

async fn register(State(state): State<Shared>, Json(body): Json<RegisterRequest>) -> Response {
    let mut state = state.lock().unwrap();

    if state.accounts.iter().any(|(user, _)| user.email == body.email) {
        return StatusCode::CONFLICT.into_response();
    }

    let user = User {
        id: format!("u{}", state.accounts.len()),
        email: body.email,
        name: body.name,
        created_at: None,
    };
    state.accounts.push((user.clone(), body.password));

    (StatusCode::CREATED, Json(user)).into_response()
}

async fn list_users(State(state): State<Shared>) -> Response {
    let state = state.lock().unwrap();
    let users: Vec<User> = state.accounts.iter().map(|(user, _)| user.clone()).collect();

    Json(users).into_response()
}

async fn list_readings(State(state): State<Shared>) -> Response {
    Json(state.lock().unwrap().readings.clone()).into_response()
}

async fn last_reading(State(state): State<Shared>) -> Response {
    let state = state.lock().unwrap();

    if let Some(body) = state.last_override {
        return (StatusCode::OK, body).into_response();
    }

    match state.readings.last() {
        Some(reading) => Json(reading.clone()).into_response(),
        None => StatusCode::OK.into_response(),
    }
}

async fn list_statuses(State(state): State<Shared>) -> Response {
    let state = state.lock().unwrap();
    let statuses: Vec<SensorStatus> = SensorName::ALL
        .into_iter()
        .filter_map(|name| {
            state.statuses.get(&name).map(|is_active| SensorStatus {
                name,
                is_active: *is_active,
            })
        })
        .collect();

    Json(statuses).into_response()
}

fn set_status(state: &Shared, name: &str, active: Option<bool>) -> Response {
    let mut state = state.lock().unwrap();

    let Some((name, is_active)) = name
        .parse::<SensorName>()
        .ok()
        .and_then(|name| state.statuses.get_mut(&name).map(|is_active| (name, is_active)))
    else {
        return StatusCode::NOT_FOUND.into_response();
    };

    if let Some(active) = active {
        *is_active = active;
    }

    Json(SensorStatus {
        name,
        is_active: *is_active,
    })
    .into_response()
}

async fn get_status(State(state): State<Shared>, Path(name): Path<String>) -> Response {
    set_status(&state, &name, None)
}

async fn activate(State(state): State<Shared>, Path(name): Path<String>) -> Response {
    set_status(&state, &name, Some(true))
}

async fn deactivate(State(state): State<Shared>, Path(name): Path<String>) -> Response {
    set_status(&state, &name, Some(false))
}
