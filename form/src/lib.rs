//! Field values, validation and submission state for console forms.

mod field;
mod form;
mod handle;
pub mod validate;

pub use field::{Condition, FieldSpec, FieldValue, FormValues, Validation, Validator};
pub use form::{FieldProps, Form, FormError, Phase, SubmitOutcome, SubmitRejected};
pub use handle::{FormFeedback, FormHandle, SubmitError};
