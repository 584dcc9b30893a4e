use std::collections::BTreeMap;
use std::fmt::{Display, Formatter};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};
use std::time::Duration;

use thiserror::Error;

use super::binding::{FormSurface, StatusTone, annotate};
use super::field::{FieldKey, FieldLens, FormData, FormModel};
use super::submit::Submitter;
use super::validation::{FormReport, FormValidator, ValidationResult};
use crate::config::FormConfig;
use crate::messages::MessageCatalog;
use crate::scheduler::{SharedScheduler, TimerHandle};

static FORM_ID_ALLOCATOR: AtomicU64 = AtomicU64::new(1);

#[derive(Clone, Copy, Debug, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct FormId(pub u64);

impl FormId {
    pub fn next() -> Self {
        Self(FORM_ID_ALLOCATOR.fetch_add(1, Ordering::SeqCst))
    }
}

impl Display for FormId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "form-{}", self.0)
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum SubmitPhase {
    Idle,
    Pending,
    Success,
    Error,
}

#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub enum SubmissionStatus {
    #[default]
    Idle,
    Pending,
    Success {
        message: String,
    },
    Error {
        message: String,
    },
}

impl SubmissionStatus {
    pub fn phase(&self) -> SubmitPhase {
        match self {
            SubmissionStatus::Idle => SubmitPhase::Idle,
            SubmissionStatus::Pending => SubmitPhase::Pending,
            SubmissionStatus::Success { .. } => SubmitPhase::Success,
            SubmissionStatus::Error { .. } => SubmitPhase::Error,
        }
    }

    pub fn message(&self) -> Option<&str> {
        match self {
            SubmissionStatus::Success { message } | SubmissionStatus::Error { message } => {
                Some(message.as_str())
            }
            SubmissionStatus::Idle | SubmissionStatus::Pending => None,
        }
    }

    pub fn tone(&self) -> Option<StatusTone> {
        match self.phase() {
            SubmitPhase::Success => Some(StatusTone::Success),
            SubmitPhase::Error => Some(StatusTone::Error),
            SubmitPhase::Idle | SubmitPhase::Pending => None,
        }
    }

    pub fn is_pending(&self) -> bool {
        self.phase() == SubmitPhase::Pending
    }
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct FormOptions {
    pub success_display: Duration,
    pub validate_on_blur: bool,
    pub clear_error_on_input: bool,
}

impl Default for FormOptions {
    fn default() -> Self {
        Self {
            success_display: Duration::from_millis(5000),
            validate_on_blur: true,
            clear_error_on_input: true,
        }
    }
}

impl FormOptions {
    pub fn from_config(config: &FormConfig) -> Self {
        Self {
            success_display: config.success_display(),
            ..Self::default()
        }
    }
}

#[derive(Clone, Debug)]
pub struct FormSnapshot<M> {
    pub model: M,
    pub status: SubmissionStatus,
    pub submit_count: u32,
    /// Whether the current values would pass validation now. `results`
    /// only holds what was last shown to the user.
    pub is_valid: bool,
    pub results: BTreeMap<FieldKey, ValidationResult>,
}

#[derive(Debug, Error, Clone, Eq, PartialEq)]
pub enum FormError {
    #[error("form state lock poisoned while {0}")]
    StatePoisoned(&'static str),
    #[error("invalid submit state transition: {from:?} -> {to:?}")]
    InvalidStateTransition { from: SubmitPhase, to: SubmitPhase },
    #[error("form submit is already in progress")]
    AlreadySubmitting,
    #[error("form has no field named `{0}`")]
    UnknownField(FieldKey),
}

pub type FormResult<T> = Result<T, FormError>;

pub(super) struct FormState<M> {
    id: FormId,
    model: M,
    status: SubmissionStatus,
    submit_count: u32,
    submitting: bool,
    results: BTreeMap<FieldKey, ValidationResult>,
    generation: u64,
    clear_timer: Option<TimerHandle>,
}

impl<M> FormState<M> {
    // Any scheduled status clear belongs to an older generation after this.
    fn cancel_clear_timer(&mut self) {
        if let Some(timer) = self.clear_timer.take() {
            timer.cancel();
        }
        self.generation = self.generation.wrapping_add(1);
    }
}

/// Resets the single-flight flag however `submit` exits, including when its
/// future is dropped mid-flight.
struct SubmitGuard<M> {
    state: Arc<RwLock<FormState<M>>>,
}

impl<M> Drop for SubmitGuard<M> {
    fn drop(&mut self) {
        let mut state = match self.state.write() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        state.submitting = false;
    }
}

#[derive(Clone)]
pub struct FormController<M>
where
    M: FormModel,
{
    options: FormOptions,
    validator: FormValidator,
    state: Arc<RwLock<FormState<M>>>,
    surface: Arc<dyn FormSurface>,
    scheduler: SharedScheduler,
}

impl<M> FormController<M>
where
    M: FormModel,
{
    pub fn new(
        model: M,
        surface: Arc<dyn FormSurface>,
        scheduler: SharedScheduler,
        options: FormOptions,
    ) -> Self {
        Self {
            options,
            validator: FormValidator::default(),
            state: Arc::new(RwLock::new(FormState {
                id: FormId::next(),
                model,
                status: SubmissionStatus::Idle,
                submit_count: 0,
                submitting: false,
                results: BTreeMap::new(),
                generation: 0,
                clear_timer: None,
            })),
            surface,
            scheduler,
        }
    }

    pub fn with_validator(mut self, validator: FormValidator) -> Self {
        self.validator = validator;
        self
    }

    pub fn messages(&self) -> &MessageCatalog {
        self.validator.messages()
    }

    pub fn form_id(&self) -> FormResult<FormId> {
        Ok(read_lock(&self.state, "reading form id")?.id)
    }

    pub fn status(&self) -> FormResult<SubmissionStatus> {
        Ok(read_lock(&self.state, "reading submission status")?
            .status
            .clone())
    }

    pub fn model(&self) -> FormResult<M> {
        Ok(read_lock(&self.state, "reading form model")?.model.clone())
    }

    pub fn snapshot(&self) -> FormResult<FormSnapshot<M>> {
        let state = read_lock(&self.state, "creating form snapshot")?;
        Ok(FormSnapshot {
            model: state.model.clone(),
            status: state.status.clone(),
            submit_count: state.submit_count,
            is_valid: self
                .validator
                .validate_form(&state.model.read_fields())
                .is_valid(),
            results: state.results.clone(),
        })
    }

    /// Latest error message shown for `key`, if any.
    pub fn field_error(&self, key: &FieldKey) -> FormResult<Option<String>> {
        Ok(read_lock(&self.state, "reading field error")?
            .results
            .get(key)
            .filter(|result| !result.is_valid)
            .map(|result| result.message.clone()))
    }

    /// Writes a value as the user types.
    pub fn input(&self, key: &FieldKey, value: impl Into<String>) -> FormResult<()> {
        {
            let mut state = write_lock(&self.state, "writing field value")?;
            if !state.model.set_value(key, value.into()) {
                return Err(FormError::UnknownField(key.clone()));
            }
            if self.options.clear_error_on_input {
                state.results.remove(key);
            }
        }
        if self.options.clear_error_on_input {
            self.surface.clear_field_error(key);
        }
        Ok(())
    }

    pub fn set<L>(&self, lens: L, value: impl Into<String>) -> FormResult<()>
    where
        L: FieldLens<M>,
    {
        let key = lens.key();
        {
            let mut state = write_lock(&self.state, "writing field through lens")?;
            lens.set(&mut state.model, value.into());
            if self.options.clear_error_on_input {
                state.results.remove(&key);
            }
        }
        if self.options.clear_error_on_input {
            self.surface.clear_field_error(&key);
        }
        Ok(())
    }

    /// Focus left a field. Returns `None` when blur validation is off.
    pub fn blur(&self, key: &FieldKey) -> FormResult<Option<ValidationResult>> {
        if !self.options.validate_on_blur {
            return Ok(None);
        }
        self.validate_field(key).map(Some)
    }

    pub fn validate_field(&self, key: &FieldKey) -> FormResult<ValidationResult> {
        let field = read_lock(&self.state, "reading field for validation")?
            .model
            .read_fields()
            .into_iter()
            .find(|field| &field.key == key)
            .ok_or_else(|| FormError::UnknownField(key.clone()))?;
        let result = self.validator.validate_field(&field);
        write_lock(&self.state, "writing field validation result")?
            .results
            .insert(key.clone(), result.clone());
        annotate(self.surface.as_ref(), &result);
        Ok(result)
    }

    pub fn validate_form(&self) -> FormResult<FormReport> {
        let report = {
            let mut state = write_lock(&self.state, "validating form")?;
            let report = self.validator.validate_form(&state.model.read_fields());
            record_results(&mut state, &report);
            report
        };
        self.annotate_all(&report);
        Ok(report)
    }

    /// Validates, then hands the data to `submitter`.
    ///
    /// Submission failures are reported through the returned status, never
    /// as `Err`. `Err` means the controller itself could not proceed, e.g. a
    /// submit is already in flight.
    pub async fn submit<S>(&self, submitter: &S) -> FormResult<SubmissionStatus>
    where
        S: Submitter + ?Sized,
    {
        let form_id = {
            let mut state = write_lock(&self.state, "preparing submit")?;
            if state.submitting {
                return Err(FormError::AlreadySubmitting);
            }
            state.submitting = true;
            state.cancel_clear_timer();
            state.submit_count = state.submit_count.saturating_add(1);
            state.id
        };
        let _guard = SubmitGuard {
            state: self.state.clone(),
        };

        // The submitted data is exactly the data that was validated.
        let (report, data) = {
            let mut state = write_lock(&self.state, "validating submit")?;
            let fields = state.model.read_fields();
            let report = self.validator.validate_form(&fields);
            record_results(&mut state, &report);
            if report.is_valid() {
                transition_status(&mut state, SubmissionStatus::Pending)?;
                (report, Some(FormData::from_fields(&fields)))
            } else {
                transition_status(
                    &mut state,
                    SubmissionStatus::Error {
                        message: self.messages().form_invalid.clone(),
                    },
                )?;
                (report, None)
            }
        };
        self.annotate_all(&report);

        let Some(data) = data else {
            let message = self.messages().form_invalid.clone();
            self.surface.show_status(&message, StatusTone::Error);
            tracing::debug!(
                form = %form_id,
                invalid = report.invalid_count(),
                "submit blocked by validation"
            );
            return Ok(SubmissionStatus::Error { message });
        };
        self.set_loading(true);
        let outcome = submitter.submit(&data).await;
        self.set_loading(false);

        let status = match outcome {
            Ok(()) => {
                let message = self.messages().submit_success.clone();
                let generation = {
                    let mut state = write_lock(&self.state, "completing submit")?;
                    transition_status(
                        &mut state,
                        SubmissionStatus::Success {
                            message: message.clone(),
                        },
                    )?;
                    state.model.clear();
                    state.results.clear();
                    state.generation
                };
                self.surface.reset_fields();
                self.surface.show_status(&message, StatusTone::Success);
                self.schedule_status_clear(generation)?;
                tracing::info!(form = %form_id, fields = data.len(), "form submitted");
                SubmissionStatus::Success { message }
            }
            Err(error) => {
                tracing::warn!(form = %form_id, %error, "form submission failed");
                let message = self.messages().submit_failure.clone();
                self.transition(
                    SubmissionStatus::Error {
                        message: message.clone(),
                    },
                    "recording submit failure",
                )?;
                self.surface.show_status(&message, StatusTone::Error);
                SubmissionStatus::Error { message }
            }
        };
        Ok(status)
    }

    /// Clears values, annotations and status. Rejected while a submit is in
    /// flight.
    pub fn reset(&self) -> FormResult<()> {
        {
            let mut state = write_lock(&self.state, "resetting form")?;
            if state.submitting {
                return Err(FormError::AlreadySubmitting);
            }
            state.cancel_clear_timer();
            state.model.clear();
            state.results.clear();
            transition_status(&mut state, SubmissionStatus::Idle)?;
        }
        self.surface.reset_fields();
        self.surface.hide_status();
        Ok(())
    }

    fn annotate_all(&self, report: &FormReport) {
        for result in report.results() {
            annotate(self.surface.as_ref(), result);
        }
    }

    fn transition(&self, next: SubmissionStatus, context: &'static str) -> FormResult<()> {
        let mut state = write_lock(&self.state, context)?;
        transition_status(&mut state, next)
    }

    fn set_loading(&self, loading: bool) {
        self.surface
            .set_loading(loading, self.messages().submit_label(loading));
    }

    fn schedule_status_clear(&self, generation: u64) -> FormResult<()> {
        let state = self.state.clone();
        let surface = self.surface.clone();
        let handle = self.scheduler.schedule(
            self.options.success_display,
            Box::new(move || {
                let Ok(mut state) = state.write() else {
                    tracing::warn!("form state poisoned, skipping status clear");
                    return;
                };
                if state.generation != generation
                    || state.status.phase() != SubmitPhase::Success
                {
                    return;
                }
                state.status = SubmissionStatus::Idle;
                state.clear_timer = None;
                drop(state);
                surface.hide_status();
            }),
        );
        let mut state = write_lock(&self.state, "storing status clear timer")?;
        if state.generation == generation {
            state.clear_timer = Some(handle);
        } else {
            handle.cancel();
        }
        Ok(())
    }
}

fn record_results<M>(state: &mut FormState<M>, report: &FormReport) {
    state.results = report
        .results()
        .iter()
        .map(|result| (result.key.clone(), result.clone()))
        .collect();
}

pub(super) fn transition_status<M>(
    state: &mut FormState<M>,
    next: SubmissionStatus,
) -> FormResult<()> {
    let current = state.status.phase();
    let target = next.phase();

    let allowed = current == target
        || matches!(
            (current, target),
            (SubmitPhase::Idle, SubmitPhase::Pending)
                | (SubmitPhase::Idle, SubmitPhase::Error)
                | (SubmitPhase::Pending, SubmitPhase::Success)
                | (SubmitPhase::Pending, SubmitPhase::Error)
                | (SubmitPhase::Success, SubmitPhase::Pending)
                | (SubmitPhase::Success, SubmitPhase::Error)
                | (SubmitPhase::Error, SubmitPhase::Pending)
                | (_, SubmitPhase::Idle)
        );
    if !allowed {
        return Err(FormError::InvalidStateTransition {
            from: current,
            to: target,
        });
    }
    state.status = next;
    Ok(())
}

pub(super) fn read_lock<'a, T>(
    lock: &'a RwLock<T>,
    context: &'static str,
) -> FormResult<RwLockReadGuard<'a, T>> {
    lock.read().map_err(|_| FormError::StatePoisoned(context))
}

pub(super) fn write_lock<'a, T>(
    lock: &'a RwLock<T>,
    context: &'static str,
) -> FormResult<RwLockWriteGuard<'a, T>> {
    lock.write().map_err(|_| FormError::StatePoisoned(context))
}
