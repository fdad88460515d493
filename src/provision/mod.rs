pub mod checks;
pub mod keyword;
pub mod page;
pub mod payload;
pub mod permissions;
pub mod workflow;

pub use keyword::derive_keyword;
pub use page::{HttpPageFetcher, PageFetcher};
pub use workflow::{AccessOutcome, ProvisionOptions, ProvisionReport, Provisioner};
