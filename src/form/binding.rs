use std::collections::BTreeMap;
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use super::field::FieldKey;
use super::validation::ValidationResult;

/// Styling category of the status display.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub enum StatusTone {
    Error,
    Success,
}

impl StatusTone {
    pub fn class_name(self) -> &'static str {
        match self {
            StatusTone::Error => "error",
            StatusTone::Success => "success",
        }
    }
}

/// Presentation side of a form: per-field error annotations, the status
/// display and the submit control.
pub trait FormSurface: Send + Sync {
    fn show_field_error(&self, key: &FieldKey, message: &str);
    fn clear_field_error(&self, key: &FieldKey);
    fn show_status(&self, message: &str, tone: StatusTone);
    fn hide_status(&self);
    fn set_loading(&self, loading: bool, label: &str);
    fn reset_fields(&self);
}

pub(super) fn annotate(surface: &dyn FormSurface, result: &ValidationResult) {
    if result.is_valid {
        surface.clear_field_error(&result.key);
    } else {
        surface.show_field_error(&result.key, &result.message);
    }
}

#[derive(Clone, Copy, Debug, Default)]
pub struct NullSurface;

impl FormSurface for NullSurface {
    fn show_field_error(&self, _key: &FieldKey, _message: &str) {}
    fn clear_field_error(&self, _key: &FieldKey) {}
    fn show_status(&self, _message: &str, _tone: StatusTone) {}
    fn hide_status(&self) {}
    fn set_loading(&self, _loading: bool, _label: &str) {}
    fn reset_fields(&self) {}
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub enum SurfaceEvent {
    FieldError { key: FieldKey, message: String },
    FieldCleared { key: FieldKey },
    StatusShown { message: String, tone: StatusTone },
    StatusHidden,
    Loading { loading: bool, label: String },
    FieldsReset,
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct StatusDisplay {
    pub message: String,
    pub tone: StatusTone,
}

#[derive(Default)]
struct SurfaceState {
    field_errors: BTreeMap<FieldKey, String>,
    status: Option<StatusDisplay>,
    loading: bool,
    submit_label: String,
    events: Vec<SurfaceEvent>,
}

/// Headless surface that keeps what a page would show plus an event log.
#[derive(Clone, Default)]
pub struct InMemorySurface {
    state: Arc<RwLock<SurfaceState>>,
}

impl InMemorySurface {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn field_error(&self, key: &str) -> Option<String> {
        self.read()
            .field_errors
            .iter()
            .find(|(candidate, _)| candidate.as_str() == key)
            .map(|(_, message)| message.clone())
    }

    pub fn field_errors(&self) -> BTreeMap<FieldKey, String> {
        self.read().field_errors.clone()
    }

    pub fn status(&self) -> Option<StatusDisplay> {
        self.read().status.clone()
    }

    pub fn is_loading(&self) -> bool {
        self.read().loading
    }

    pub fn submit_label(&self) -> String {
        self.read().submit_label.clone()
    }

    pub fn events(&self) -> Vec<SurfaceEvent> {
        self.read().events.clone()
    }

    fn read(&self) -> RwLockReadGuard<'_, SurfaceState> {
        match self.state.read() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }

    fn write(&self) -> RwLockWriteGuard<'_, SurfaceState> {
        match self.state.write() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }
}

impl FormSurface for InMemorySurface {
    fn show_field_error(&self, key: &FieldKey, message: &str) {
        let mut state = self.write();
        state.field_errors.insert(key.clone(), message.to_string());
        state.events.push(SurfaceEvent::FieldError {
            key: key.clone(),
            message: message.to_string(),
        });
    }

    fn clear_field_error(&self, key: &FieldKey) {
        let mut state = self.write();
        if state.field_errors.remove(key).is_some() {
            state
                .events
                .push(SurfaceEvent::FieldCleared { key: key.clone() });
        }
    }

    fn show_status(&self, message: &str, tone: StatusTone) {
        let mut state = self.write();
        state.status = Some(StatusDisplay {
            message: message.to_string(),
            tone,
        });
        state.events.push(SurfaceEvent::StatusShown {
            message: message.to_string(),
            tone,
        });
    }

    fn hide_status(&self) {
        let mut state = self.write();
        state.status = None;
        state.events.push(SurfaceEvent::StatusHidden);
    }

    fn set_loading(&self, loading: bool, label: &str) {
        let mut state = self.write();
        state.loading = loading;
        state.submit_label = label.to_string();
        state.events.push(SurfaceEvent::Loading {
            loading,
            label: label.to_string(),
        });
    }

    fn reset_fields(&self) {
        let mut state = self.write();
        state.field_errors.clear();
        state.events.push(SurfaceEvent::FieldsReset);
    }
}
