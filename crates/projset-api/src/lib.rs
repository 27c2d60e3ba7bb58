// projset-api: Async Rust client for the project settings API

pub mod client;
pub mod error;
pub mod models;
pub mod projects;
pub mod transport;

pub use client::ProjectClient;
pub use error::Error;
pub use models::{
    ConfigField, ConfigValue, ErrorBody, ErrorMessage, OrganizationDetails, ProjectDetails,
    TeamSummary, UpdateResponse,
};
pub use transport::{TlsMode, TransportConfig};
