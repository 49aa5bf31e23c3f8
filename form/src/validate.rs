//! Built-in validators.

use std::sync::Arc;

use crate::{FieldValue, Validation, Validator};

fn text_rule<F>(message: impl Into<String>, rule: F) -> Validator
where
    F: Fn(&str) -> bool + Send + Sync + 'static,
{
    let message = message.into();
    Arc::new(move |value: &FieldValue| match value.as_text() {
        Some(text) if rule(text) => Validation::Valid,
        _ => Validation::Invalid(message.clone()),
    })
}

/// At least one character.
pub fn non_empty(message: impl Into<String>) -> Validator {
    text_rule(message, |text| !text.is_empty())
}

/// At least one non-whitespace character.
pub fn trimmed_non_empty(message: impl Into<String>) -> Validator {
    text_rule(message, |text| !text.trim().is_empty())
}

/// An absolute URL.
pub fn url(message: impl Into<String>) -> Validator {
    text_rule(message, |text| url::Url::parse(text).is_ok())
}

/// Exactly one of `options`.
pub fn one_of<I, S>(options: I, message: impl Into<String>) -> Validator
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    let options: Vec<String> = options.into_iter().map(Into::into).collect();
    text_rule(message, move |text| options.iter().any(|option| option == text))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn trimmed_non_empty_rejects_whitespace() {
        let rule = trimmed_non_empty("required");
        assert_eq!(
            rule(&FieldValue::from("   ")),
            Validation::Invalid("required".to_string())
        );
        assert!(rule(&FieldValue::from(" a ")).is_valid());
        assert!(non_empty("required")(&FieldValue::from(" ")).is_valid());
    }

    #[test]
    fn url_requires_an_absolute_url() {
        let rule = url("bad url");
        assert!(rule(&FieldValue::from("https://github.com/acme/api")).is_valid());
        assert!(!rule(&FieldValue::from("github.com/acme/api")).is_valid());
        assert!(!rule(&FieldValue::from(true)).is_valid());
    }

    #[test]
    fn one_of_matches_exactly() {
        let rule = one_of(["production", "staging"], "unknown environment");
        assert!(rule(&FieldValue::from("staging")).is_valid());
        assert_eq!(
            rule(&FieldValue::from("Staging")).reason(),
            Some("unknown environment")
        );
    }
}
