pub mod settings;

pub use settings::{Backend, Logger, Polling, Settings};
