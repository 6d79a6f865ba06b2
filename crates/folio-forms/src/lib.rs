//! Folio Request Forms
//!
//! Submission workflow behind the portfolio site's contact form and
//! certificate request form.
//!
//! ## Flow
//! - [`validator::Validator`] checks required fields before anything leaves the form
//! - [`controller::SubmissionController`] guards against a second in-flight request
//! - [`relay::SubmissionClient`] makes exactly one call to the email relay
//! - the outcome lands back in [`domain::FormState`] for the view to render
//!
//! ## Extras
//! - Certificate catalog for the request form
//! - Route access guard over a [`session::SessionProvider`]
//! - Owned smooth-scroll controller
//! - Registration API client

pub mod api;
pub mod catalog;
pub mod config;
pub mod controller;
pub mod domain;
pub mod relay;
pub mod scroll;
pub mod session;
pub mod validator;

pub use config::{FormsConfig, RelayConfig};
pub use controller::{SubmissionController, SubmitOutcome};
pub use domain::{FormDefinition, FormKind, FormState, FormStatus, SubmissionRequest};
pub use relay::{EmailRelayClient, RelayError, RelayReceipt, SubmissionClient, SubmissionResult};
pub use validator::{ValidationError, ValidationResult, Validator};

use thiserror::Error;

// =============================================================================
// Error Types
// =============================================================================

#[derive(Error, Debug)]
pub enum FormsError {
    #[error("Unknown certificate: {0}")]
    UnknownCertificate(String),

    #[error("Invalid relay endpoint: {0}")]
    InvalidEndpoint(#[from] url::ParseError),

    #[error("HTTP client error: {0}")]
    HttpClient(#[from] reqwest::Error),

    #[error(transparent)]
    Form(#[from] domain::FormError),

    #[error("Config error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, FormsError>;
