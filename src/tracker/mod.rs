pub mod api;
pub mod client;
pub mod types;

pub use api::{HttpTracker, TrackerApi};
pub use client::{RequestBody, TrackerClient};
pub use types::EntityId;
