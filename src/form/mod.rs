mod binding;
mod controller;
mod field;
mod submit;
mod validation;


pub use binding::{
    FormSurface, InMemorySurface, NullSurface, StatusDisplay, StatusTone, SurfaceEvent,
};
pub use controller::{
    FormController, FormError, FormId, FormOptions, FormResult, FormSnapshot, SubmissionStatus,
    SubmitPhase,
};
pub use field::{
    Field, FieldKey, FieldKind, FieldLens, FieldSet, FormData, FormModel, default_label,
};
pub use folio_form_derive::FormModel;
pub use submit::{
    BoxedSubmitFuture, SimulatedOutcome, SimulatedSubmitter, SubmitError, Submitter,
};
pub use validation::{
    FieldRule, FormReport, FormValidator, ValidationResult, is_valid_email, validate_field,
    validate_form,
};
