// Campaign Provisioner - one-shot campaign setup against the tracker REST API
// This exposes the building blocks for the binary and for integration tests

pub mod config;
pub mod error;
pub mod provision;
pub mod telemetry;
pub mod tracker;

pub use crate::config::{ProvisionerConfig, TrackerSettings};
pub use error::{DuplicateField, ProvisionError};
pub use provision::{
    derive_keyword, AccessOutcome, HttpPageFetcher, PageFetcher, ProvisionOptions,
    ProvisionReport, Provisioner,
};
pub use telemetry::init_telemetry;
pub use tracker::{EntityId, HttpTracker, RequestBody, TrackerApi, TrackerClient};
