use std::sync::Arc;

use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use shared::domain::{FormField, SubmissionId};
use tokio::sync::broadcast;
use tracing::{debug, info, warn};

pub mod cancel;
pub mod config;
pub mod outcome;
pub mod state;
pub mod transport;

pub use cancel::CancelToken;
pub use config::{load_settings, load_settings_from, SettingsError, SignupSettings, StatusMessages};
pub use outcome::{SubmissionError, SubmissionOutcome};
pub use state::{FormState, FormView};
pub use transport::{HttpSignupTransport, SignupTransport, TransportResponse};

const EVENT_CHANNEL_CAPACITY: usize = 256;

#[derive(Debug, Clone)]
pub enum FormEvent {
    StateChanged(FormState),
    SubmissionStarted {
        id: SubmissionId,
    },
    SubmissionFinished {
        id: SubmissionId,
        outcome: SubmissionOutcome,
        finished_at: DateTime<Utc>,
    },
    SubmissionCancelled {
        id: SubmissionId,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmitRejection {
    AlreadySubmitting,
    TornDown,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitResult {
    Completed(SubmissionOutcome),
    Cancelled,
    Rejected(SubmitRejection),
}

struct ControllerState {
    form: FormState,
    next_submission: SubmissionId,
}

// The state lock is never held across an await.
pub struct FormController {
    transport: Arc<dyn SignupTransport>,
    messages: StatusMessages,
    inner: Mutex<ControllerState>,
    cancel: CancelToken,
    events: broadcast::Sender<FormEvent>,
}

impl FormController {
    pub fn new(transport: Arc<dyn SignupTransport>, messages: StatusMessages) -> Self {
        let (events, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        Self {
            transport,
            messages,
            inner: Mutex::new(ControllerState {
                form: FormState::default(),
                next_submission: SubmissionId(0),
            }),
            cancel: CancelToken::new(),
            events,
        }
    }

    pub fn from_settings(settings: &SignupSettings) -> Result<Self, SubmissionError> {
        let transport = HttpSignupTransport::new(settings)?;
        info!(endpoint = %transport.endpoint(), "signup controller ready");
        Ok(Self::new(Arc::new(transport), settings.messages.clone()))
    }

    pub fn subscribe(&self) -> broadcast::Receiver<FormEvent> {
        self.events.subscribe()
    }

    pub fn messages(&self) -> &StatusMessages {
        &self.messages
    }

    pub fn state(&self) -> FormState {
        self.inner.lock().form.clone()
    }

    pub fn view(&self) -> FormView {
        self.inner.lock().form.view(&self.messages)
    }

    pub fn is_submitting(&self) -> bool {
        self.inner.lock().form.submitting
    }

    pub fn update_field(&self, field: FormField, value: impl Into<String>) {
        let snapshot = {
            let mut inner = self.inner.lock();
            inner.form.update_field(field, value);
            inner.form.clone()
        };
        self.publish(FormEvent::StateChanged(snapshot));
    }

    pub fn toggle_visibility(&self) -> bool {
        let (visible, snapshot) = {
            let mut inner = self.inner.lock();
            let visible = inner.form.toggle_visibility();
            (visible, inner.form.clone())
        };
        self.publish(FormEvent::StateChanged(snapshot));
        visible
    }

    /// Cancels any in-flight submission and refuses further submits.
    pub fn teardown(&self) {
        self.cancel.cancel();
        debug!("signup controller torn down");
    }

    pub async fn submit(&self) -> SubmitResult {
        let (id, request, snapshot) = {
            let mut inner = self.inner.lock();
            if self.cancel.is_cancelled() {
                return SubmitResult::Rejected(SubmitRejection::TornDown);
            }
            if inner.form.submitting {
                debug!("ignoring submit while a submission is in flight");
                return SubmitResult::Rejected(SubmitRejection::AlreadySubmitting);
            }

            let id = inner.next_submission;
            inner.next_submission = id.next();
            inner.form.submitting = true;
            inner.form.status_message.clear();
            inner.form.last_submission = Some(id);
            (id, inner.form.snapshot(), inner.form.clone())
        };
        let guard = InFlight {
            controller: self,
            armed: true,
        };
        self.publish(FormEvent::StateChanged(snapshot));
        self.publish(FormEvent::SubmissionStarted { id });
        info!(submission = %id, "submitting signup form");

        let result = tokio::select! {
            biased;
            _ = self.cancel.cancelled() => None,
            result = self.transport.post_signup(&request) => Some(result),
        };

        let Some(result) = result else {
            drop(guard);
            warn!(submission = %id, "signup submission cancelled; late response discarded");
            self.publish(FormEvent::SubmissionCancelled { id });
            return SubmitResult::Cancelled;
        };

        let outcome = outcome::outcome_from(result, &self.messages);
        guard.finish(&outcome);
        self.publish(FormEvent::SubmissionFinished {
            id,
            outcome: outcome.clone(),
            finished_at: Utc::now(),
        });
        SubmitResult::Completed(outcome)
    }

    fn publish(&self, event: FormEvent) {
        // No subscribers is fine: the rendering layer may poll `view()` instead.
        let _ = self.events.send(event);
    }
}

// Clears `submitting` on every exit path, including a dropped submit future.
struct InFlight<'a> {
    controller: &'a FormController,
    armed: bool,
}

impl InFlight<'_> {
    fn finish(mut self, outcome: &SubmissionOutcome) {
        self.armed = false;
        let snapshot = {
            let mut inner = self.controller.inner.lock();
            inner.form.submitting = false;
            inner.form.status_message = outcome.message().to_string();
            inner.form.clone()
        };
        self.controller.publish(FormEvent::StateChanged(snapshot));
    }
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        if !self.armed {
            return;
        }
        let snapshot = {
            let mut inner = self.controller.inner.lock();
            inner.form.submitting = false;
            inner.form.clone()
        };
        self.controller.publish(FormEvent::StateChanged(snapshot));
    }
}

#[cfg(test)]
#[path = "tests/lib_tests.rs"]
mod tests;
