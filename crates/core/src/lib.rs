#![forbid(unsafe_code)]

pub mod dashboard;
pub mod error;
pub mod model;
pub mod progress;
pub mod time;

pub use error::ModelError;
pub use time::Clock;
