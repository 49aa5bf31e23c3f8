use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

/// Value held by a form field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldValue {
    Text(String),
    Flag(bool),
}

impl FieldValue {
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(text) => Some(text),
            Self::Flag(_) => None,
        }
    }

    pub fn as_flag(&self) -> Option<bool> {
        match self {
            Self::Flag(flag) => Some(*flag),
            Self::Text(_) => None,
        }
    }

    pub(crate) fn same_kind(&self, other: &FieldValue) -> bool {
        matches!(
            (self, other),
            (Self::Text(_), Self::Text(_)) | (Self::Flag(_), Self::Flag(_))
        )
    }
}

impl From<&str> for FieldValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<bool> for FieldValue {
    fn from(value: bool) -> Self {
        Self::Flag(value)
    }
}

/// Result of running a validator over one value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Validation {
    Valid,
    Invalid(String),
}

impl Validation {
    pub fn is_valid(&self) -> bool {
        matches!(self, Self::Valid)
    }

    pub fn reason(&self) -> Option<&str> {
        match self {
            Self::Valid => None,
            Self::Invalid(reason) => Some(reason),
        }
    }
}

pub type Validator = Arc<dyn Fn(&FieldValue) -> Validation + Send + Sync>;

/// Decides from the current values whether a field applies.
pub type Condition = Arc<dyn Fn(&FormValues) -> bool + Send + Sync>;

/// Declaration of one field: name, default, and optional rules.
#[derive(Clone)]
pub struct FieldSpec {
    pub(crate) name: String,
    pub(crate) default: FieldValue,
    pub(crate) validator: Option<Validator>,
    pub(crate) enabled_when: Option<Condition>,
}

impl FieldSpec {
    pub fn text(name: impl Into<String>, default: impl Into<String>) -> Self {
        Self::new(name, FieldValue::Text(default.into()))
    }

    pub fn flag(name: impl Into<String>, default: bool) -> Self {
        Self::new(name, FieldValue::Flag(default))
    }

    fn new(name: impl Into<String>, default: FieldValue) -> Self {
        Self {
            name: name.into(),
            default,
            validator: None,
            enabled_when: None,
        }
    }

    pub fn validate(mut self, validator: Validator) -> Self {
        self.validator = Some(validator);
        self
    }

    /// Only validate and submit this field while `condition` holds.
    pub fn enabled_when<F>(mut self, condition: F) -> Self
    where
        F: Fn(&FormValues) -> bool + Send + Sync + 'static,
    {
        self.enabled_when = Some(Arc::new(condition));
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub(crate) fn check(&self, value: &FieldValue) -> Validation {
        self.validator
            .as_ref()
            .map_or(Validation::Valid, |validator| validator(value))
    }

    pub(crate) fn is_enabled(&self, values: &FormValues) -> bool {
        self.enabled_when
            .as_ref()
            .is_none_or(|condition| condition(values))
    }
}

impl fmt::Debug for FieldSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FieldSpec")
            .field("name", &self.name)
            .field("default", &self.default)
            .field("validated", &self.validator.is_some())
            .field("conditional", &self.enabled_when.is_some())
            .finish()
    }
}

/// Snapshot of field values by name.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FormValues(BTreeMap<String, FieldValue>);

impl FormValues {
    pub fn get(&self, name: &str) -> Option<&FieldValue> {
        self.0.get(name)
    }

    /// Text value of `name`, or `""` when absent or not text.
    pub fn text(&self, name: &str) -> &str {
        self.get(name).and_then(FieldValue::as_text).unwrap_or("")
    }

    /// Flag value of `name`, or `false` when absent or not a flag.
    pub fn flag(&self, name: &str) -> bool {
        self.get(name)
            .and_then(FieldValue::as_flag)
            .unwrap_or(false)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.0.contains_key(name)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &FieldValue)> {
        self.0.iter().map(|(name, value)| (name.as_str(), value))
    }

    pub(crate) fn insert(&mut self, name: &str, value: FieldValue) {
        self.0.insert(name.to_string(), value);
    }
}

impl<K: Into<String>, V: Into<FieldValue>> FromIterator<(K, V)> for FormValues {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(
            iter.into_iter()
                .map(|(name, value)| (name.into(), value.into()))
                .collect(),
        )
    }
}
