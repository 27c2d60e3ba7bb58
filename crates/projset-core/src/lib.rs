// projset-core: Field registry, form state, and submit flow between
// projset-api and the front ends (CLI/TUI).

pub mod config;
pub mod convert;
pub mod error;
pub mod form;
pub mod layout;
pub mod model;
pub mod registry;
pub mod settings;
pub mod value;

// ── Primary re-exports ──────────────────────────────────────────────
pub use projset_api::ProjectClient;
pub use config::{ClientConfig, TlsVerification};
pub use error::CoreError;
pub use form::{FormMsg, FormState, SubmitPhase};
pub use layout::{RenderedField, RenderedSection, SECTIONS, Section};
pub use model::{
    Choice, ErrorMap, FieldDescriptor, FieldKind, FormData, LabelFormat, Location, Organization,
    Project, Props, RouteParams, SavedField, Team,
};
pub use registry::Registry;
pub use settings::{ProjectSettings, SettingsApi, SubmitOutcome, SubmitRequest, load_props};
