use std::sync::Arc;

use async_trait::async_trait;
use ceport_api::models::*;
use reqwest::{Method, RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;

use crate::configs::Backend;
use crate::error::{Error, Result};

/// Operations offered by the sensor backend.
///
/// Screens and the session only ever see this trait, so they can run against
/// the real [`Client`] or an in-process fake.
#[async_trait]
pub trait SensorBackend: Send + Sync {
    async fn login(&self, email: &str, password: &str) -> Result<User>;

    async fn register(&self, email: &str, password: &str, name: Option<&str>) -> Result<User>;

    /// Diagnostic listing of every account.
    async fn list_users(&self) -> Result<Vec<User>>;

    async fn list_sensor_readings(&self) -> Result<Vec<SensorReading>>;

    async fn last_sensor_reading(&self) -> Result<SensorReading>;

    async fn list_sensor_statuses(&self) -> Result<Vec<SensorStatus>>;

    async fn get_sensor_status(&self, name: SensorName) -> Result<SensorStatus>;

    /// Enables the sensor. Activating an active sensor leaves it active.
    async fn activate_sensor(&self, name: SensorName) -> Result<SensorStatus>;

    /// Disables the sensor. Deactivating an inactive sensor leaves it inactive.
    async fn deactivate_sensor(&self, name: SensorName) -> Result<SensorStatus>;
}

/// HTTP client for the REST backend. Cloning shares the connection pool.
#[derive(Clone)]
pub struct Client {
    http: reqwest::Client,
    base_url: Arc<str>,
}

struct Reply {
    status: StatusCode,
    body: Vec<u8>,
}

impl Reply {
    fn decode<T: DeserializeOwned>(self, what: &'static str) -> Result<T> {
        if self.body.is_empty() {
            return Err(Error::NoData);
        }

        serde_json::from_slice(&self.body).map_err(|source| Error::Parse { what, source })
    }

    fn require<T: DeserializeOwned>(
        self,
        success: StatusCode,
        operation: &'static str,
        what: &'static str,
    ) -> Result<T> {
        if self.status != success {
            return Err(Error::UnexpectedStatus {
                operation,
                status: self.status.as_u16(),
            });
        }

        self.decode(what)
    }
}

impl Client {
    pub fn new(backend: &Backend) -> Result<Self> {
        let http = reqwest::Client::builder().build()?;

        Ok(Self::with_http(http, &backend.base_url))
    }

    pub fn with_http(http: reqwest::Client, base_url: &str) -> Self {
        Self {
            http,
            base_url: Arc::from(base_url.trim_end_matches('/')),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        tracing::debug!("{} {}", method, path);

        self.http.request(method, format!("{}{}", self.base_url, path))
    }

    async fn send(&self, request: RequestBuilder) -> Result<Reply> {
        let response = request.send().await?;
        let status = response.status();
        let body = response.bytes().await?.to_vec();

        tracing::debug!("status {} with {} bytes", status, body.len());

        Ok(Reply { status, body })
    }

    async fn sensor_status(
        &self,
        method: Method,
        path: String,
        name: SensorName,
        operation: &'static str,
    ) -> Result<SensorStatus> {
        let reply = self.send(self.request(method, &path)).await?;

        if reply.status == StatusCode::NOT_FOUND {
            return Err(Error::NotFound(name));
        }

        reply.require(StatusCode::OK, operation, "sensor status")
    }
}

#[async_trait]
impl SensorBackend for Client {
    async fn login(&self, email: &str, password: &str) -> Result<User> {
        let body = LoginRequest {
            email: email.to_string(),
            password: password.to_string(),
        };

        let reply = self
            .send(self.request(Method::POST, "/auth/login").json(&body))
            .await?;

        match reply.status {
            StatusCode::UNAUTHORIZED => Err(Error::InvalidCredentials),
            _ => reply.require(StatusCode::CREATED, "Login", "user data"),
        }
    }

    async fn register(&self, email: &str, password: &str, name: Option<&str>) -> Result<User> {
        let body = RegisterRequest {
            email: email.to_string(),
            password: password.to_string(),
            name: name.map(str::to_string),
        };

        let reply = self
            .send(self.request(Method::POST, "/auth/register").json(&body))
            .await?;

        match reply.status {
            StatusCode::CONFLICT => Err(Error::Conflict),
            _ => reply.require(StatusCode::CREATED, "Registration", "user data"),
        }
    }

    async fn list_users(&self) -> Result<Vec<User>> {
        self.send(self.request(Method::GET, "/auth/users"))
            .await?
            .require(StatusCode::OK, "Listing users", "users")
    }

    async fn list_sensor_readings(&self) -> Result<Vec<SensorReading>> {
        self.send(self.request(Method::GET, "/sensors"))
            .await?
            .require(StatusCode::OK, "Listing sensors", "sensors")
    }

    async fn last_sensor_reading(&self) -> Result<SensorReading> {
        self.send(self.request(Method::GET, "/sensors/last"))
            .await?
            .require(StatusCode::OK, "Reading sensors", "sensor data")
    }

    async fn list_sensor_statuses(&self) -> Result<Vec<SensorStatus>> {
        self.send(self.request(Method::GET, "/sensor-status"))
            .await?
            .require(StatusCode::OK, "Listing sensor statuses", "sensor statuses")
    }

    async fn get_sensor_status(&self, name: SensorName) -> Result<SensorStatus> {
        self.sensor_status(
            Method::GET,
            format!("/sensor-status/{name}"),
            name,
            "Sensor status",
        )
        .await
    }

    async fn activate_sensor(&self, name: SensorName) -> Result<SensorStatus> {
        let status = self
            .sensor_status(
                Method::PATCH,
                format!("/sensor-status/{name}/activate"),
                name,
                "Activation",
            )
            .await?;

        tracing::info!("sensor {} activated", name);

        Ok(status)
    }

    async fn deactivate_sensor(&self, name: SensorName) -> Result<SensorStatus> {
        let status = self
            .sensor_status(
                Method::PATCH,
                format!("/sensor-status/{name}/deactivate"),
                name,
                "Deactivation",
            )
            .await?;

        tracing::info!("sensor {} deactivated", name);

        Ok(status)
    }
}
