pub mod client;
pub mod error;
pub mod model;
pub mod timestamp;

pub use client::SchedulingApi;
pub use error::SchedulingError;
pub use model::*;
