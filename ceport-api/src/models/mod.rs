mod auth;
mod sensor;

pub use auth::*;
pub use sensor::*;
