use std::collections::{HashMap, HashSet};
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;

use ceport_api::models::{SensorName, SensorReading, SensorStatus, User};
use ceport_client::{Error, Result, SensorBackend};

/// In-process backend with call counters, for tests running on paused time.
pub struct FakeBackend {
    pub reading: Mutex<SensorReading>,
    pub statuses: Mutex<HashMap<SensorName, bool>>,
    /// Sensors whose status route answers with a server error.
    pub broken: Mutex<HashSet<SensorName>>,
    pub fail_readings: AtomicBool,
    /// Makes activate and deactivate fail while status queries still answer.
    pub fail_toggles: AtomicBool,
    pub latency: Mutex<Duration>,
    pub reading_calls: AtomicUsize,
    pub status_calls: AtomicUsize,
    pub toggles: AtomicUsize,
}

impl FakeBackend {
    pub fn new(reading: SensorReading) -> Self {
        Self {
            reading: Mutex::new(reading),
            statuses: Mutex::new(
                [(SensorName::Ult01, true), (SensorName::Ult02, true)]
                    .into_iter()
                    .collect(),
            ),
            broken: Mutex::new(HashSet::new()),
            fail_readings: AtomicBool::new(false),
            fail_toggles: AtomicBool::new(false),
            latency: Mutex::new(Duration::ZERO),
            reading_calls: AtomicUsize::new(0),
            status_calls: AtomicUsize::new(0),
            toggles: AtomicUsize::new(0),
        }
    }

    pub fn set_reading(&self, reading: SensorReading) {
        *self.reading.lock().unwrap() = reading;
    }

    pub fn set_active(&self, name: SensorName, active: bool) {
        self.statuses.lock().unwrap().insert(name, active);
    }

    pub fn set_latency(&self, latency: Duration) {
        *self.latency.lock().unwrap() = latency;
    }

    pub fn reading_calls(&self) -> usize {
        self.reading_calls.load(Ordering::SeqCst)
    }

    pub fn status_calls(&self) -> usize {
        self.status_calls.load(Ordering::SeqCst)
    }

    fn toggle(
        &self,
        name: SensorName,
        active: bool,
        operation: &'static str,
    ) -> Result<SensorStatus> {
        self.toggles.fetch_add(1, Ordering::SeqCst);

        if self.fail_toggles.load(Ordering::SeqCst) {
            return Err(Error::UnexpectedStatus {
                operation,
                status: 500,
            });
        }

        self.status(name, Some(active))
    }

    pub fn is_active(&self, name: SensorName) -> Option<bool> {
        self.statuses.lock().unwrap().get(&name).copied()
    }

    fn status(&self, name: SensorName, set: Option<bool>) -> Result<SensorStatus> {
        if self.broken.lock().unwrap().contains(&name) {
            return Err(Error::UnexpectedStatus {
                operation: "Sensor status",
                status: 500,
            });
        }

        let mut statuses = self.statuses.lock().unwrap();
        let is_active = statuses.get_mut(&name).ok_or(Error::NotFound(name))?;

        if let Some(active) = set {
            *is_active = active;
        }

        Ok(SensorStatus {
            name,
            is_active: *is_active,
        })
    }
}

pub fn reading(ult01: f64, ult02: f64) -> SensorReading {
    SensorReading {
        tem01: Some(22.5),
        hum01: Some(40.0),
        gas01: Some(300.0),
        son01: Some(30.0),
        ult01: Some(ult01),
        ult02: Some(ult02),
        ..Default::default()
    }
}

#[async_trait]
impl SensorBackend for FakeBackend {
    async fn login(&self, email: &str, password: &str) -> Result<User> {
        if email != "driver@test.com" || password != "secret" {
            return Err(Error::InvalidCredentials);
        }

        Ok(User {
            id: "6746c1".to_string(),
            email: email.to_string(),
            name: None,
            created_at: None,
        })
    }

    async fn register(&self, email: &str, _password: &str, name: Option<&str>) -> Result<User> {
        Ok(User {
            id: "u1".to_string(),
            email: email.to_string(),
            name: name.map(str::to_string),
            created_at: None,
        })
    }

    async fn list_users(&self) -> Result<Vec<User>> {
        Ok(Vec::new())
    }

    async fn list_sensor_readings(&self) -> Result<Vec<SensorReading>> {
        Ok(vec![self.reading.lock().unwrap().clone()])
    }

    async fn last_sensor_reading(&self) -> Result<SensorReading> {
        self.reading_calls.fetch_add(1, Ordering::SeqCst);

        let latency = *self.latency.lock().unwrap();
        if !latency.is_zero() {
            tokio::time::sleep(latency).await;
        }

        if self.fail_readings.load(Ordering::SeqCst) {
            return Err(Error::NoData);
        }

        Ok(self.reading.lock().unwrap().clone())
    }

    async fn list_sensor_statuses(&self) -> Result<Vec<SensorStatus>> {
        let statuses = self.statuses.lock().unwrap();

        Ok(statuses
            .iter()
            .map(|(name, is_active)| SensorStatus {
                name: *name,
                is_active: *is_active,
            })
            .collect())
    }

    async fn get_sensor_status(&self, name: SensorName) -> Result<SensorStatus> {
        self.status_calls.fetch_add(1, Ordering::SeqCst);
        self.status(name, None)
    }

    async fn activate_sensor(&self, name: SensorName) -> Result<SensorStatus> {
        self.toggle(name, true, "Activation")
    }

    async fn deactivate_sensor(&self, name: SensorName) -> Result<SensorStatus> {
        self.toggle(name, false, "Deactivation")
    }
}
