//! Form events
use chrono::{DateTime, Utc};

use super::value_objects::FailureKind;

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum DomainEvent { Form(FormEvent) }

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum FormEvent {
    ValidationRejected { form_id: String, missing: Vec<String> },
    SubmissionStarted { form_id: String, attempt: u64, at: DateTime<Utc> },
    SubmissionSucceeded { form_id: String, attempt: u64 },
    SubmissionFailed { form_id: String, attempt: u64, kind: FailureKind },
    SubmissionAbandoned { form_id: String, attempt: u64 },
    NoticeDismissed { form_id: String },
}
