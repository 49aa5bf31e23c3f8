use thiserror::Error;

use crate::{FieldSpec, FieldValue, FormValues, Validation};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum FormError {
    #[error("unknown field `{0}`")]
    UnknownField(String),

    #[error("field `{field}` holds a different kind of value")]
    TypeMismatch { field: String },
}

/// Why `begin_submit` refused to start a submission.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum SubmitRejected {
    #[error("invalid fields: {}", .fields.join(", "))]
    Invalid { fields: Vec<String> },

    #[error("a submission is already in flight")]
    InFlight,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Idle,
    Submitting,
}

/// Recorded result of the last submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitOutcome {
    Succeeded,
    /// Messages are shown inline as form-level errors.
    Failed { messages: Vec<String> },
}

/// What a front end needs to render one field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldProps {
    pub name: String,
    pub value: FieldValue,
    pub error: Option<String>,
    pub enabled: bool,
    pub touched: bool,
    pub dirty: bool,
}

#[derive(Debug, Clone)]
struct FieldState {
    value: FieldValue,
    dirty: bool,
    touched: bool,
    error: Option<String>,
}

impl FieldState {
    fn pristine(spec: &FieldSpec) -> Self {
        Self {
            value: spec.default.clone(),
            dirty: false,
            touched: false,
            error: None,
        }
    }
}

/// Values, per-field errors and submission phase of one form.
#[derive(Debug, Clone)]
pub struct Form {
    specs: Vec<FieldSpec>,
    fields: Vec<FieldState>,
    phase: Phase,
    form_errors: Vec<String>,
    last_outcome: Option<SubmitOutcome>,
}

impl Form {
    pub fn new(specs: Vec<FieldSpec>) -> Self {
        let fields = specs.iter().map(FieldState::pristine).collect();
        Self {
            specs,
            fields,
            phase: Phase::Idle,
            form_errors: Vec::new(),
            last_outcome: None,
        }
    }

    fn index(&self, name: &str) -> Result<usize, FormError> {
        self.specs
            .iter()
            .position(|spec| spec.name == name)
            .ok_or_else(|| FormError::UnknownField(name.to_string()))
    }

    /// Update a value, rerun its validator, and clear the errors of fields
    /// the change disabled.
    pub fn set_field(&mut self, name: &str, value: impl Into<FieldValue>) -> Result<(), FormError> {
        let idx = self.index(name)?;
        let value = value.into();
        if !self.fields[idx].value.same_kind(&value) {
            return Err(FormError::TypeMismatch {
                field: name.to_string(),
            });
        }

        self.fields[idx].value = value;
        self.fields[idx].dirty = true;
        self.revalidate(idx);

        let values = self.all_values();
        for (spec, state) in self.specs.iter().zip(self.fields.iter_mut()) {
            if !spec.is_enabled(&values) {
                state.error = None;
            }
        }
        Ok(())
    }

    pub fn blur(&mut self, name: &str) -> Result<(), FormError> {
        let idx = self.index(name)?;
        self.fields[idx].touched = true;
        self.revalidate(idx);
        Ok(())
    }

    fn revalidate(&mut self, idx: usize) {
        let values = self.all_values();
        let spec = &self.specs[idx];
        let state = &mut self.fields[idx];
        state.error = if spec.is_enabled(&values) {
            spec.check(&state.value).reason().map(str::to_string)
        } else {
            None
        };
    }

    pub fn value(&self, name: &str) -> Option<&FieldValue> {
        self.index(name).ok().map(|idx| &self.fields[idx].value)
    }

    fn all_values(&self) -> FormValues {
        let mut values = FormValues::default();
        for (spec, state) in self.specs.iter().zip(&self.fields) {
            values.insert(&spec.name, state.value.clone());
        }
        values
    }

    /// Values of the enabled fields.
    pub fn values(&self) -> FormValues {
        let all = self.all_values();
        let mut enabled = FormValues::default();
        for (spec, state) in self.specs.iter().zip(&self.fields) {
            if spec.is_enabled(&all) {
                enabled.insert(&spec.name, state.value.clone());
            }
        }
        enabled
    }

    pub fn is_enabled(&self, name: &str) -> bool {
        self.index(name)
            .is_ok_and(|idx| self.specs[idx].is_enabled(&self.all_values()))
    }

    pub fn error(&self, name: &str) -> Option<&str> {
        self.index(name)
            .ok()
            .and_then(|idx| self.fields[idx].error.as_deref())
    }

    pub fn field_props(&self, name: &str) -> Option<FieldProps> {
        let idx = self.index(name).ok()?;
        let state = &self.fields[idx];
        Some(FieldProps {
            name: name.to_string(),
            value: state.value.clone(),
            error: state.error.clone(),
            enabled: self.specs[idx].is_enabled(&self.all_values()),
            touched: state.touched,
            dirty: state.dirty,
        })
    }

    /// Every enabled field passes its validator.
    pub fn is_valid(&self) -> bool {
        let values = self.all_values();
        self.specs
            .iter()
            .zip(&self.fields)
            .filter(|(spec, _)| spec.is_enabled(&values))
            .all(|(spec, state)| spec.check(&state.value).is_valid())
    }

    pub fn can_submit(&self) -> bool {
        self.phase == Phase::Idle && self.is_valid()
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn is_submitting(&self) -> bool {
        self.phase == Phase::Submitting
    }

    /// Validate every enabled field and, when all pass, enter `Submitting`
    /// and hand back the values to submit.
    pub fn begin_submit(&mut self) -> Result<FormValues, SubmitRejected> {
        if self.is_submitting() {
            return Err(SubmitRejected::InFlight);
        }

        let values = self.all_values();
        let mut invalid = Vec::new();
        for (spec, state) in self.specs.iter().zip(self.fields.iter_mut()) {
            state.touched = true;
            if !spec.is_enabled(&values) {
                state.error = None;
                continue;
            }
            match spec.check(&state.value) {
                Validation::Valid => state.error = None,
                Validation::Invalid(reason) => {
                    state.error = Some(reason);
                    invalid.push(spec.name.clone());
                }
            }
        }
        if !invalid.is_empty() {
            tracing::debug!(fields = ?invalid, "form submission rejected");
            return Err(SubmitRejected::Invalid { fields: invalid });
        }

        self.phase = Phase::Submitting;
        self.form_errors.clear();
        Ok(self.values())
    }

    pub fn finish_submit(&mut self, outcome: SubmitOutcome) {
        self.phase = Phase::Idle;
        self.form_errors = match &outcome {
            SubmitOutcome::Succeeded => Vec::new(),
            SubmitOutcome::Failed { messages } => messages.clone(),
        };
        self.last_outcome = Some(outcome);
    }

    /// Leave `Submitting` without recording an outcome, for a submission
    /// whose result will never arrive.
    pub fn abandon_submit(&mut self) {
        if self.is_submitting() {
            tracing::debug!("form submission abandoned");
            self.phase = Phase::Idle;
        }
    }

    /// Form-level messages from the last failed submission.
    pub fn form_errors(&self) -> &[String] {
        &self.form_errors
    }

    pub fn last_outcome(&self) -> Option<&SubmitOutcome> {
        self.last_outcome.as_ref()
    }

    /// Restore every field to its default and drop all errors.
    pub fn reset(&mut self) {
        self.fields = self.specs.iter().map(FieldState::pristine).collect();
        self.phase = Phase::Idle;
        self.form_errors.clear();
        self.last_outcome = None;
    }
}
