use std::fmt::{self, Display, Formatter};
use std::sync::Arc;

use async_trait::async_trait;
use ceport_api::models::User;

use crate::client::SensorBackend;
use crate::configs::Polling;
use crate::error::{Error, Result};
use crate::monitor::*;

/// Asks the user a yes/no question.
#[async_trait]
pub trait Prompt: Send {
    async fn confirm(&mut self, title: &str, message: &str) -> bool;
}

/// Outcome shown to the user after an action.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub title: String,
    pub message: String,
}

impl Notification {
    pub fn success<S: Into<String>>(message: S) -> Self {
        Self {
            title: "Success".to_string(),
            message: message.into(),
        }
    }

    pub fn error(error: &Error) -> Self {
        Self {
            title: "Error".to_string(),
            message: error.to_string(),
        }
    }

    pub fn is_success(&self) -> bool {
        self.title == "Success"
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SensorAction {
    Activate,
    Deactivate,
}

impl SensorAction {
    fn past_tense(&self) -> &'static str {
        match self {
            SensorAction::Activate => "activated",
            SensorAction::Deactivate => "deactivated",
        }
    }
}

impl Display for SensorAction {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        match self {
            SensorAction::Activate => write!(f, "activate"),
            SensorAction::Deactivate => write!(f, "deactivate"),
        }
    }
}

/// A spot toggle waiting for the user's confirmation.
pub struct ToggleRequest {
    backend: Arc<dyn SensorBackend>,
    spot: Spot,
    action: SensorAction,
}

impl ToggleRequest {
    pub fn spot(&self) -> Spot {
        self.spot
    }

    pub fn action(&self) -> SensorAction {
        self.action
    }

    pub fn title(&self) -> String {
        format!("Spot {}", self.spot)
    }

    pub fn message(&self) -> String {
        format!("Do you want to {} spot {}?", self.action, self.spot)
    }

    pub async fn execute(self) -> Notification {
        let sensor = self.spot.sensor();
        let result = match self.action {
            SensorAction::Activate => self.backend.activate_sensor(sensor).await,
            SensorAction::Deactivate => self.backend.deactivate_sensor(sensor).await,
        };

        match result {
            Ok(_) => {
                Notification::success(format!("Spot {} {}", self.spot, self.action.past_tense()))
            }
            Err(e) => {
                tracing::warn!("failed to {} spot {}: {}", self.action, self.spot, e);
                Notification::error(&e)
            }
        }
    }
}

/// The logged in user together with the backend every screen talks to.
pub struct Session {
    backend: Arc<dyn SensorBackend>,
    user: User,
}

impl Session {
    pub async fn login(
        backend: Arc<dyn SensorBackend>,
        email: &str,
        password: &str,
    ) -> Result<Self> {
        validate_credentials(email, password)?;

        let user = backend.login(email, password).await?;

        tracing::info!("Login successful: {}", user.email);

        Ok(Self { backend, user })
    }

    pub async fn register(
        backend: Arc<dyn SensorBackend>,
        email: &str,
        password: &str,
        name: Option<&str>,
    ) -> Result<Self> {
        validate_credentials(email, password)?;

        let user = backend.register(email, password, name).await?;

        tracing::info!("Registration successful: {}", user.email);

        Ok(Self { backend, user })
    }

    pub fn user(&self) -> &User {
        &self.user
    }

    pub fn backend(&self) -> &Arc<dyn SensorBackend> {
        &self.backend
    }

    pub fn greeting(&self) -> String {
        match &self.user.name {
            Some(name) => format!("Welcome to Parking: {} ({})", self.user.email, name),
            None => format!("Welcome to Parking: {}", self.user.email),
        }
    }

    pub fn dashboard(&self, polling: &Polling) -> MonitorHandle<DashboardSnapshot> {
        Monitor::start(DashboardScreen::new(Arc::clone(&self.backend)), polling)
    }

    pub fn parking(&self, polling: &Polling) -> MonitorHandle<ParkingSnapshot> {
        Monitor::start(ParkingScreen::new(Arc::clone(&self.backend)), polling)
    }

    /// Reads the spot's sensor status and picks the opposite action.
    pub async fn prepare_toggle(&self, spot: Spot) -> Result<ToggleRequest> {
        let status = self.backend.get_sensor_status(spot.sensor()).await?;

        let action = if status.is_active {
            SensorAction::Deactivate
        } else {
            SensorAction::Activate
        };

        Ok(ToggleRequest {
            backend: Arc::clone(&self.backend),
            spot,
            action,
        })
    }

    /// Runs the tap protocol for a spot: status, confirmation, action, refresh.
    ///
    /// Returns `None` when the user declined.
    pub async fn toggle_spot<P: Prompt + ?Sized>(
        &self,
        spot: Spot,
        prompt: &mut P,
        parking: &MonitorHandle<ParkingSnapshot>,
    ) -> Option<Notification> {
        let request = match self.prepare_toggle(spot).await {
            Ok(request) => request,
            Err(e) => return Some(Notification::error(&e)),
        };

        if !prompt.confirm(&request.title(), &request.message()).await {
            return None;
        }

        let notification = request.execute().await;

        parking.refresh();

        Some(notification)
    }
}

fn validate_credentials(email: &str, password: &str) -> Result<()> {
    if email.is_empty() {
        return Err(Error::validation("Please enter your email"));
    }

    if password.is_empty() {
        return Err(Error::validation("Please enter your password"));
    }

    Ok(())
}
