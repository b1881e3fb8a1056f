pub mod classify;
pub mod client;
pub mod configs;
pub mod error;
pub mod monitor;
pub mod session;

pub use client::{Client, SensorBackend};
pub use error::{Error, Result};
pub use session::{Notification, Prompt, Session};
