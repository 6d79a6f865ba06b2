//! Form State Aggregate
use chrono::{DateTime, Duration, Utc};
use serde::Serialize;
use std::collections::BTreeMap;

use crate::domain::events::{DomainEvent, FormEvent};
use crate::domain::value_objects::{FailureKind, FormDefinition, FormKind};
use crate::validator::ValidationError;

/// Undrained events kept per form; the oldest are dropped past this.
pub const MAX_PENDING_EVENTS: usize = 64;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub enum FormStatus { #[default] Idle, Submitting, Succeeded, Failed }

/// Transient confirmation shown after a successful send.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Notice {
    pub message: String,
    pub attempt: u64,
    pub expires_at: DateTime<Utc>,
}

/// State of one mounted form.
///
/// # Invariants
/// - `last_error` is set only while `status == Failed`
/// - `notice` is set only while `status == Succeeded`
/// - at most one submission is in flight (`begin_submission` refuses a second)
#[derive(Clone, Debug)]
pub struct FormState {
    id: String,
    kind: FormKind,
    fields: BTreeMap<String, String>,
    status: FormStatus,
    last_error: Option<String>,
    validation: Option<ValidationError>,
    notice: Option<Notice>,
    attempts: u64,
    updated_at: DateTime<Utc>,
    events: Vec<DomainEvent>,
}

impl FormState {
    pub fn mount(definition: &FormDefinition) -> Self {
        let fields = definition.fields.iter().map(|f| (f.name.clone(), String::new())).collect();
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            kind: definition.kind,
            fields,
            status: FormStatus::Idle,
            last_error: None,
            validation: None,
            notice: None,
            attempts: 0,
            updated_at: Utc::now(),
            events: vec![],
        }
    }

    pub fn id(&self) -> &str { &self.id }
    pub fn kind(&self) -> FormKind { self.kind }
    pub fn fields(&self) -> &BTreeMap<String, String> { &self.fields }
    pub fn field(&self, name: &str) -> Option<&str> { self.fields.get(name).map(String::as_str) }
    pub fn status(&self) -> FormStatus { self.status }
    pub fn last_error(&self) -> Option<&str> { self.last_error.as_deref() }
    pub fn validation(&self) -> Option<&ValidationError> { self.validation.as_ref() }
    pub fn notice(&self) -> Option<&Notice> { self.notice.as_ref() }
    pub fn attempts(&self) -> u64 { self.attempts }
    pub fn updated_at(&self) -> DateTime<Utc> { self.updated_at }

    /// Applies a user edit. Editing out of `Failed` or `Succeeded` returns the form to `Idle`.
    pub fn set_field(&mut self, name: &str, value: impl Into<String>) -> Result<(), FormError> {
        let slot = self.fields.get_mut(name).ok_or_else(|| FormError::UnknownField(name.to_string()))?;
        *slot = value.into();
        self.validation = None;
        match self.status {
            FormStatus::Failed => {
                self.status = FormStatus::Idle;
                self.last_error = None;
            }
            FormStatus::Succeeded => {
                self.status = FormStatus::Idle;
                self.notice = None;
            }
            FormStatus::Idle | FormStatus::Submitting => {}
        }
        self.touch();
        Ok(())
    }

    /// Records a failed validation. The form goes (or stays) `Idle`.
    pub fn reject(&mut self, error: ValidationError) {
        if self.status == FormStatus::Submitting {
            return;
        }
        self.status = FormStatus::Idle;
        self.last_error = None;
        self.notice = None;
        self.raise_event(FormEvent::ValidationRejected {
            form_id: self.id.clone(),
            missing: error.missing.iter().cloned().collect(),
        });
        self.validation = Some(error);
        self.touch();
    }

    /// Moves to `Submitting` and returns the attempt number.
    pub fn begin_submission(&mut self) -> Result<u64, FormError> {
        if self.status == FormStatus::Submitting {
            return Err(FormError::AlreadySubmitting);
        }
        self.status = FormStatus::Submitting;
        self.attempts += 1;
        self.last_error = None;
        self.validation = None;
        self.notice = None;
        self.raise_event(FormEvent::SubmissionStarted { form_id: self.id.clone(), attempt: self.attempts, at: Utc::now() });
        self.touch();
        Ok(self.attempts)
    }

    /// Relay accepted the request: clear the fields and raise the notice.
    pub fn complete(&mut self, message: impl Into<String>, shown_for: Duration) -> Result<(), FormError> {
        if self.status != FormStatus::Submitting {
            return Err(FormError::NotSubmitting);
        }
        for value in self.fields.values_mut() {
            value.clear();
        }
        self.status = FormStatus::Succeeded;
        self.notice = Some(Notice { message: message.into(), attempt: self.attempts, expires_at: Utc::now() + shown_for });
        self.raise_event(FormEvent::SubmissionSucceeded { form_id: self.id.clone(), attempt: self.attempts });
        self.touch();
        Ok(())
    }

    /// Relay call failed: keep the fields so the user can retry.
    pub fn fail(&mut self, kind: FailureKind, message: impl Into<String>) -> Result<(), FormError> {
        if self.status != FormStatus::Submitting {
            return Err(FormError::NotSubmitting);
        }
        self.status = FormStatus::Failed;
        self.last_error = Some(message.into());
        self.raise_event(FormEvent::SubmissionFailed { form_id: self.id.clone(), attempt: self.attempts, kind });
        self.touch();
        Ok(())
    }

    /// Caller gave up on `attempt` before it resolved: back to `Idle` with the
    /// fields kept. Ignored when a different attempt is current.
    pub fn abandon(&mut self, attempt: u64) -> bool {
        if self.status != FormStatus::Submitting || self.attempts != attempt {
            return false;
        }
        self.status = FormStatus::Idle;
        self.raise_event(FormEvent::SubmissionAbandoned { form_id: self.id.clone(), attempt });
        self.touch();
        true
    }

    /// Clears the notice raised by `attempt`. A newer notice is left alone.
    pub fn dismiss_notice(&mut self, attempt: u64) -> bool {
        let current = self.notice.as_ref().is_some_and(|n| n.attempt == attempt);
        if !current || self.status != FormStatus::Succeeded {
            return false;
        }
        self.notice = None;
        self.status = FormStatus::Idle;
        self.raise_event(FormEvent::NoticeDismissed { form_id: self.id.clone() });
        self.touch();
        true
    }

    pub fn take_events(&mut self) -> Vec<DomainEvent> { std::mem::take(&mut self.events) }

    fn raise_event(&mut self, e: FormEvent) {
        if self.events.len() >= MAX_PENDING_EVENTS {
            self.events.remove(0);
        }
        self.events.push(DomainEvent::Form(e));
    }

    fn touch(&mut self) { self.updated_at = Utc::now(); }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FormError {
    #[error("unknown field: {0}")]
    UnknownField(String),

    #[error("a submission is already in flight")]
    AlreadySubmitting,

    #[error("no submission in flight")]
    NotSubmitting,

    #[error("form is unmounted")]
    Unmounted,
}
