//! Tower middleware.

pub mod api_version;

pub use api_version::{ApiVersionLayer, ApiVersionService};
