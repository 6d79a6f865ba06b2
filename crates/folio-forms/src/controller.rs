//! Submission controller
//!
//! Drives one mounted form through `Idle -> Submitting -> {Succeeded, Failed}`.
//! The form state lock is never held across an await; unmount is signalled
//! through a watch channel so an in-flight call can be abandoned and a late
//! result never touches a disposed form.

use parking_lot::Mutex;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tracing::{debug, info, warn};

use crate::config::FormsConfig;
use crate::domain::{DomainEvent, FormDefinition, FormError, FormState, FormStatus};
use crate::relay::{RelayError, RelayReceipt, SubmissionClient};
use crate::validator::{ValidationError, ValidationResult, Validator};

/// Default lifetime of the success notice.
pub const NOTICE_DURATION: Duration = Duration::from_secs(4);

/// What a call to [`SubmissionController::submit`] did.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// Relay accepted the message; fields were cleared.
    Sent(RelayReceipt),
    /// Required fields missing; nothing was sent.
    Invalid(ValidationError),
    /// Relay call failed; fields were kept.
    Failed(RelayError),
    /// A submission was already in flight; nothing was sent.
    AlreadyInFlight,
    /// Form was unmounted before the result could be applied.
    Discarded,
}

pub struct SubmissionController {
    definition: FormDefinition,
    validator: Validator,
    client: Arc<dyn SubmissionClient>,
    state: Arc<Mutex<FormState>>,
    notice_duration: Duration,
    unmounted: watch::Sender<bool>,
}

impl SubmissionController {
    pub fn mount(definition: FormDefinition, client: Arc<dyn SubmissionClient>) -> Self {
        let state = FormState::mount(&definition);
        debug!("Mounted {} form {}", definition.kind, state.id());
        let (unmounted, _) = watch::channel(false);
        Self {
            validator: Validator::for_form(&definition),
            definition,
            client,
            state: Arc::new(Mutex::new(state)),
            notice_duration: NOTICE_DURATION,
            unmounted,
        }
    }

    pub fn from_config(config: &FormsConfig, definition: FormDefinition, client: Arc<dyn SubmissionClient>) -> Self {
        Self::mount(definition, client)
            .with_notice_duration(config.notice_duration())
            .with_strict_email(config.strict_email)
    }

    pub fn with_notice_duration(mut self, duration: Duration) -> Self {
        self.notice_duration = duration;
        self
    }

    pub fn with_strict_email(mut self, enabled: bool) -> Self {
        self.validator = self.validator.strict_email(enabled);
        self
    }

    pub fn definition(&self) -> &FormDefinition {
        &self.definition
    }

    pub fn snapshot(&self) -> FormState {
        self.state.lock().clone()
    }

    pub fn status(&self) -> FormStatus {
        self.state.lock().status()
    }

    pub fn is_mounted(&self) -> bool {
        !*self.unmounted.borrow()
    }

    pub fn set_field(&self, name: &str, value: impl Into<String>) -> Result<(), FormError> {
        if !self.is_mounted() {
            return Err(FormError::Unmounted);
        }
        self.state.lock().set_field(name, value)
    }

    pub fn take_events(&self) -> Vec<DomainEvent> {
        self.state.lock().take_events()
    }

    /// Disposes the form. An in-flight call is abandoned and its result dropped.
    pub fn unmount(&self) {
        if !self.unmounted.send_replace(true) {
            debug!("Unmounted {} form", self.definition.kind);
        }
    }

    pub async fn submit(&self) -> SubmitOutcome {
        if !self.is_mounted() {
            return SubmitOutcome::Discarded;
        }

        let (request, attempt) = {
            let mut state = self.state.lock();
            if state.status() == FormStatus::Submitting {
                debug!("Submit ignored, {} form {} already in flight", self.definition.kind, state.id());
                return SubmitOutcome::AlreadyInFlight;
            }
            if let ValidationResult::Invalid(error) = self.validator.validate(state.fields()) {
                info!("Rejected {} form {}: {}", self.definition.kind, state.id(), error);
                state.reject(error.clone());
                return SubmitOutcome::Invalid(error);
            }
            let attempt = match state.begin_submission() {
                Ok(attempt) => attempt,
                Err(_) => return SubmitOutcome::AlreadyInFlight,
            };
            info!("Submitting {} form {} (attempt {})", self.definition.kind, state.id(), attempt);
            (self.definition.template.build_request(state.fields()), attempt)
        };

        let mut in_flight = InFlight { controller: self, attempt, armed: true };
        let mut unmounted = self.unmounted.subscribe();
        let result = tokio::select! {
            result = self.client.send(&request) => result,
            _ = unmounted.wait_for(|gone| *gone) => {
                in_flight.disarm();
                warn!("{} form unmounted during attempt {}, dropping submission", self.definition.kind, attempt);
                return SubmitOutcome::Discarded;
            }
        };
        in_flight.disarm();

        let mut state = self.state.lock();
        if !self.is_mounted() {
            warn!("{} form unmounted before attempt {} resolved, dropping result", self.definition.kind, attempt);
            return SubmitOutcome::Discarded;
        }

        match result {
            Ok(receipt) => {
                let shown_for = chrono::Duration::from_std(self.notice_duration).unwrap_or_else(|_| chrono::Duration::zero());
                if let Err(e) = state.complete(self.definition.kind.confirmation(), shown_for) {
                    warn!("Could not complete {} form {}: {}", self.definition.kind, state.id(), e);
                }
                info!("Sent {} form {} (attempt {})", self.definition.kind, state.id(), attempt);
                drop(state);
                self.schedule_notice_dismissal(attempt);
                SubmitOutcome::Sent(receipt)
            }
            Err(error) => {
                let message = format!("Failed to send ({error}). Please email directly: {}", self.definition.fallback_contact);
                if let Err(e) = state.fail(error.kind(), message) {
                    warn!("Could not fail {} form {}: {}", self.definition.kind, state.id(), e);
                }
                warn!("Sending {} form {} failed: {}", self.definition.kind, state.id(), error);
                SubmitOutcome::Failed(error)
            }
        }
    }

    fn schedule_notice_dismissal(&self, attempt: u64) {
        let state = Arc::downgrade(&self.state);
        let mut unmounted = self.unmounted.subscribe();
        let shown_for = self.notice_duration;

        tokio::spawn(async move {
            tokio::select! {
                _ = tokio::time::sleep(shown_for) => {}
                _ = unmounted.wait_for(|gone| *gone) => return,
            }
            if let Some(state) = state.upgrade() {
                if state.lock().dismiss_notice(attempt) {
                    debug!("Dismissed notice for attempt {}", attempt);
                }
            }
        });
    }
}

/// Returns the form to `Idle` if a `submit` future is dropped mid-flight.
struct InFlight<'a> {
    controller: &'a SubmissionController,
    attempt: u64,
    armed: bool,
}

impl InFlight<'_> {
    fn disarm(&mut self) {
        self.armed = false;
    }
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        if !self.armed || !self.controller.is_mounted() {
            return;
        }
        if self.controller.state.lock().abandon(self.attempt) {
            warn!("{} form attempt {} cancelled by caller", self.controller.definition.kind, self.attempt);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{FailureKind, FormEvent, SubmissionRequest};
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tokio::sync::Notify;
    use tokio_test::{assert_pending, assert_ready};

    struct MockRelay {
        calls: AtomicUsize,
        requests: Mutex<Vec<SubmissionRequest>>,
        gate: Option<Arc<Notify>>,
        result: Result<RelayReceipt, RelayError>,
    }

    impl MockRelay {
        fn ok() -> Self {
            Self::with_result(Ok(RelayReceipt { status: 200, text: "OK".into() }))
        }

        fn with_result(result: Result<RelayReceipt, RelayError>) -> Self {
            Self { calls: AtomicUsize::new(0), requests: Mutex::new(vec![]), gate: None, result }
        }

        fn gated(mut self, gate: Arc<Notify>) -> Self {
            self.gate = Some(gate);
            self
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl SubmissionClient for MockRelay {
        async fn send(&self, request: &SubmissionRequest) -> crate::relay::SubmissionResult {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.requests.lock().push(request.clone());
            if let Some(gate) = &self.gate {
                gate.notified().await;
            }
            self.result.clone()
        }
    }

    fn contact(relay: Arc<MockRelay>) -> SubmissionController {
        SubmissionController::mount(FormDefinition::contact("template_contact", "owner@example.com"), relay)
    }

    fn fill(controller: &SubmissionController, name: &str, email: &str, message: &str) {
        controller.set_field("name", name).unwrap();
        controller.set_field("email", email).unwrap();
        controller.set_field("message", message).unwrap();
    }

    fn statuses(events: &[DomainEvent]) -> Vec<&'static str> {
        events
            .iter()
            .map(|DomainEvent::Form(e)| match e {
                FormEvent::ValidationRejected { .. } => "rejected",
                FormEvent::SubmissionStarted { .. } => "submitting",
                FormEvent::SubmissionSucceeded { .. } => "succeeded",
                FormEvent::SubmissionFailed { .. } => "failed",
                FormEvent::SubmissionAbandoned { .. } => "abandoned",
                FormEvent::NoticeDismissed { .. } => "dismissed",
            })
            .collect()
    }

    #[tokio::test]
    async fn test_missing_name_makes_no_call() {
        let relay = Arc::new(MockRelay::ok());
        let controller = contact(relay.clone());
        fill(&controller, "", "a@b.com", "hi");

        let outcome = controller.submit().await;

        let SubmitOutcome::Invalid(err) = outcome else { panic!("expected validation failure") };
        assert!(err.missing.contains("name"));
        assert_eq!(relay.calls(), 0);
        let state = controller.snapshot();
        assert_eq!(state.status(), FormStatus::Idle);
        assert!(state.validation().is_some_and(|v| v.missing.contains("name")));
        assert_eq!(state.field("email"), Some("a@b.com"));
    }

    #[tokio::test]
    async fn test_success_clears_fields() {
        let relay = Arc::new(MockRelay::ok());
        let controller = contact(relay.clone());
        fill(&controller, "Ada", "ada@x.com", "hello");

        let outcome = controller.submit().await;

        assert!(matches!(outcome, SubmitOutcome::Sent(ref r) if r.status == 200));
        assert_eq!(relay.calls(), 1);
        let state = controller.snapshot();
        assert_eq!(state.status(), FormStatus::Succeeded);
        assert_eq!(state.field("name"), Some(""));
        assert_eq!(state.field("email"), Some(""));
        assert_eq!(state.field("message"), Some(""));
        assert!(state.notice().is_some());
        assert_eq!(statuses(&controller.take_events()), vec!["submitting", "succeeded"]);

        let sent = relay.requests.lock();
        assert_eq!(sent[0].template_id, "template_contact");
        assert_eq!(sent[0].payload["contact_form_name"], "Ada");
        assert_eq!(sent[0].payload["content"], "hello");
    }

    #[tokio::test]
    async fn test_failure_keeps_fields() {
        let relay = Arc::new(MockRelay::with_result(Err(RelayError::NetworkFailure("connection reset".into()))));
        let controller = contact(relay.clone());
        fill(&controller, "Ada", "ada@x.com", "hello");

        let outcome = controller.submit().await;

        assert!(matches!(outcome, SubmitOutcome::Failed(ref e) if e.kind() == FailureKind::NetworkFailure));
        let state = controller.snapshot();
        assert_eq!(state.status(), FormStatus::Failed);
        assert_eq!(state.field("name"), Some("Ada"));
        assert_eq!(state.field("message"), Some("hello"));
        let error = state.last_error().unwrap();
        assert!(error.contains("connection reset"));
        assert!(error.contains("owner@example.com"));
        assert_eq!(statuses(&controller.take_events()), vec!["submitting", "failed"]);
    }

    #[tokio::test]
    async fn test_retry_after_failure_uses_same_path() {
        let relay = Arc::new(MockRelay::with_result(Err(RelayError::Timeout(Duration::from_secs(10)))));
        let controller = contact(relay.clone());
        fill(&controller, "Ada", "ada@x.com", "hello");

        assert!(matches!(controller.submit().await, SubmitOutcome::Failed(_)));
        assert!(matches!(controller.submit().await, SubmitOutcome::Failed(_)));
        assert_eq!(relay.calls(), 2);
        assert_eq!(controller.snapshot().attempts(), 2);

        controller.set_field("name", "").unwrap();
        assert!(matches!(controller.submit().await, SubmitOutcome::Invalid(_)));
        assert_eq!(relay.calls(), 2);
        assert_eq!(controller.status(), FormStatus::Idle);
    }

    #[tokio::test]
    async fn test_second_submit_while_in_flight_is_ignored() {
        let gate = Arc::new(Notify::new());
        let relay = Arc::new(MockRelay::ok().gated(gate.clone()));
        let controller = contact(relay.clone());
        fill(&controller, "Ada", "ada@x.com", "hello");

        let mut first = tokio_test::task::spawn(controller.submit());
        assert_pending!(first.poll());
        assert_eq!(controller.status(), FormStatus::Submitting);

        assert_eq!(controller.submit().await, SubmitOutcome::AlreadyInFlight);
        assert_eq!(relay.calls(), 1);

        gate.notify_one();
        assert!(first.is_woken());
        let outcome = assert_ready!(first.poll());
        assert!(matches!(outcome, SubmitOutcome::Sent(_)));
        assert_eq!(relay.calls(), 1);
    }

    #[tokio::test]
    async fn test_dropped_submit_frees_the_form() {
        let gate = Arc::new(Notify::new());
        let relay = Arc::new(MockRelay::ok().gated(gate.clone()));
        let controller = contact(relay.clone());
        fill(&controller, "Ada", "ada@x.com", "hello");

        let timed_out = tokio::time::timeout(Duration::from_millis(50), controller.submit()).await;
        assert!(timed_out.is_err());
        assert_eq!(relay.calls(), 1);
        let state = controller.snapshot();
        assert_eq!(state.status(), FormStatus::Idle);
        assert_eq!(state.field("message"), Some("hello"));

        let mut retry = tokio_test::task::spawn(controller.submit());
        assert_pending!(retry.poll());
        assert_eq!(relay.calls(), 2);
        assert_eq!(controller.status(), FormStatus::Submitting);

        gate.notify_one();
        let outcome = assert_ready!(retry.poll());
        assert!(matches!(outcome, SubmitOutcome::Sent(_)));
        assert_eq!(
            statuses(&controller.take_events()),
            vec!["submitting", "abandoned", "submitting", "succeeded"]
        );
    }

    #[tokio::test]
    async fn test_unmount_during_flight_discards_result() {
        let gate = Arc::new(Notify::new());
        let relay = Arc::new(MockRelay::ok().gated(gate.clone()));
        let controller = Arc::new(contact(relay.clone()));
        fill(&controller, "Ada", "ada@x.com", "hello");

        let task = tokio::spawn({
            let controller = controller.clone();
            async move { controller.submit().await }
        });
        while relay.calls() == 0 {
            tokio::task::yield_now().await;
        }

        let before = controller.snapshot();
        controller.unmount();
        gate.notify_one();

        assert_eq!(task.await.unwrap(), SubmitOutcome::Discarded);
        let after = controller.snapshot();
        assert_eq!(after.status(), before.status());
        assert_eq!(after.fields(), before.fields());
        assert_eq!(after.updated_at(), before.updated_at());
        assert_eq!(controller.set_field("name", "Grace"), Err(FormError::Unmounted));
        assert_eq!(controller.submit().await, SubmitOutcome::Discarded);
        assert_eq!(relay.calls(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_notice_auto_dismisses() {
        let relay = Arc::new(MockRelay::ok());
        let controller = contact(relay);
        fill(&controller, "Ada", "ada@x.com", "hello");

        assert!(matches!(controller.submit().await, SubmitOutcome::Sent(_)));
        assert_eq!(controller.status(), FormStatus::Succeeded);

        tokio::time::sleep(Duration::from_secs(3)).await;
        assert_eq!(controller.status(), FormStatus::Succeeded);

        tokio::time::sleep(Duration::from_secs(2)).await;
        tokio::task::yield_now().await;
        let state = controller.snapshot();
        assert_eq!(state.status(), FormStatus::Idle);
        assert!(state.notice().is_none());
        assert!(state.fields().values().all(String::is_empty));
    }

    #[tokio::test(start_paused = true)]
    async fn test_config_sets_notice_and_strict_email() {
        let mut config = FormsConfig::default();
        config.notice_secs = 1;
        config.strict_email = true;
        let relay = Arc::new(MockRelay::ok());
        let controller = SubmissionController::from_config(&config, config.contact_form(), relay.clone());

        fill(&controller, "Ada", "not-an-email", "hello");
        let SubmitOutcome::Invalid(err) = controller.submit().await else { panic!("bad email accepted") };
        assert!(err.malformed.contains("email"));
        assert_eq!(relay.calls(), 0);

        controller.set_field("email", "ada@x.com").unwrap();
        assert!(matches!(controller.submit().await, SubmitOutcome::Sent(_)));
        tokio::time::sleep(Duration::from_millis(1500)).await;
        tokio::task::yield_now().await;
        assert_eq!(controller.status(), FormStatus::Idle);
    }

    #[tokio::test]
    async fn test_certificate_request_payload() {
        let relay = Arc::new(MockRelay::ok());
        let config = FormsConfig::default();
        let controller = SubmissionController::mount(config.certificate_form("ai-creatives-alx-2024").unwrap(), relay.clone());
        controller.set_field("name", "Ada").unwrap();
        controller.set_field("email", "ada@x.com").unwrap();

        assert!(matches!(controller.submit().await, SubmitOutcome::Sent(_)));
        let sent = relay.requests.lock();
        assert_eq!(sent[0].template_id, "template_iewnln1");
        assert_eq!(sent[0].payload["content"], "Requesting certificate: AI for Creatives");
    }
}
