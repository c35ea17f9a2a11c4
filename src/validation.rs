//! Request payload validation.
//!
//! Payloads are deserialized into `validator` structs and checked before
//! anything reaches a repository. Failures are collected into [`FieldErrors`]
//! and answered with a 400.

use serde::{de::DeserializeOwned, Deserialize, Deserializer, Serialize};
use std::collections::BTreeMap;
use validator::{Validate, ValidationErrors};

/// Validation failure report: body-level messages plus messages per field.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldErrors {
    pub form_errors: Vec<String>,
    pub field_errors: BTreeMap<String, Vec<String>>,
}

impl FieldErrors {
    pub fn form(message: impl Into<String>) -> Self {
        Self {
            form_errors: vec![message.into()],
            ..Self::default()
        }
    }

    pub fn field(field: &str, message: impl Into<String>) -> Self {
        let mut errors = Self::default();
        errors.push(field, message);
        errors
    }

    pub fn push(&mut self, field: &str, message: impl Into<String>) {
        self.field_errors
            .entry(field.to_string())
            .or_default()
            .push(message.into());
    }

    /// Collect `validator` failures under the keys clients send.
    pub fn from_validation<T: WireNames>(errors: ValidationErrors) -> Self {
        let mut out = FieldErrors::default();
        for (field, errs) in errors.field_errors() {
            let key = T::wire_name(&field);
            for err in errs {
                let message = err
                    .message
                    .as_ref()
                    .map(|m| m.to_string())
                    .unwrap_or_else(|| format!("Invalid value ({})", err.code));
                out.push(&key, message);
            }
        }
        out
    }
}

/// JSON key a payload field is sent under.
///
/// `validator` names failures after the Rust field, so payloads whose serde
/// names differ override this.
pub trait WireNames {
    fn wire_name(field: &str) -> String {
        field.to_string()
    }
}

/// `start_date` becomes `startDate`, as `rename_all = "camelCase"` does.
pub fn camel_case(field: &str) -> String {
    let mut out = String::with_capacity(field.len());
    let mut upper = false;
    for c in field.chars() {
        if c == '_' {
            upper = true;
        } else if upper {
            out.extend(c.to_uppercase());
            upper = false;
        } else {
            out.push(c);
        }
    }
    out
}

/// A raw request payload that validates into a typed value.
pub trait Payload: DeserializeOwned + Validate + WireNames {
    type Output;

    /// Convert an already validated payload. Only called after `validate()`
    /// succeeded.
    fn into_output(self) -> Result<Self::Output, FieldErrors>;
}

/// Parse a JSON body and run its validation.
pub fn parse_json<T>(body: &[u8]) -> Result<T, FieldErrors>
where
    T: DeserializeOwned + Validate + WireNames,
{
    if body.iter().all(u8::is_ascii_whitespace) {
        return Err(FieldErrors::form("Request body is required"));
    }
    let value: T =
        serde_json::from_slice(body).map_err(|e| FieldErrors::form(format!("Invalid JSON: {e}")))?;
    value.validate().map_err(FieldErrors::from_validation::<T>)?;
    Ok(value)
}

/// Parse, validate and convert a full payload.
pub fn parse_payload<P: Payload>(body: &[u8]) -> Result<P::Output, FieldErrors> {
    parse_json::<P>(body)?.into_output()
}

/// Take a field that `#[validate(required)]` has already checked.
pub fn required<T>(value: Option<T>, field: &str) -> Result<T, FieldErrors> {
    value.ok_or_else(|| FieldErrors::field(field, "Required"))
}

/// Deserialize an optional string, treating `""` as absent.
pub fn blank_as_none<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<String>::deserialize(deserializer)?;
    Ok(value.filter(|s| !s.is_empty()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Deserialize, Validate)]
    struct Sample {
        #[validate(required(message = "Required"), length(min = 3, message = "Too short"))]
        name: Option<String>,
        #[serde(default, deserialize_with = "blank_as_none")]
        #[validate(url(message = "Invalid url"))]
        link: Option<String>,
    }

    impl WireNames for Sample {}

    #[derive(Debug, Deserialize, Validate)]
    #[serde(rename_all = "camelCase")]
    struct CamelSample {
        #[validate(required(message = "Required"))]
        start_date: Option<String>,
    }

    impl WireNames for CamelSample {
        fn wire_name(field: &str) -> String {
            camel_case(field)
        }
    }

    #[test]
    fn test_missing_required_field_is_reported() {
        let errors = parse_json::<Sample>(br#"{}"#).unwrap_err();
        assert_eq!(errors.field_errors["name"], vec!["Required".to_string()]);
    }

    #[test]
    fn test_length_violation_is_reported() {
        let errors = parse_json::<Sample>(br#"{"name":"ab"}"#).unwrap_err();
        assert_eq!(errors.field_errors["name"], vec!["Too short".to_string()]);
    }

    #[test]
    fn test_blank_url_counts_as_absent() {
        let sample = parse_json::<Sample>(br#"{"name":"abc","link":""}"#).unwrap();
        assert!(sample.link.is_none());
    }

    #[test]
    fn test_bad_url_is_reported() {
        let errors = parse_json::<Sample>(br#"{"name":"abc","link":"not a url"}"#).unwrap_err();
        assert!(errors.field_errors.contains_key("link"));
    }

    #[test]
    fn test_errors_use_json_key() {
        let errors = parse_json::<CamelSample>(br#"{}"#).unwrap_err();
        assert_eq!(errors.field_errors["startDate"], vec!["Required".to_string()]);
        assert!(!errors.field_errors.contains_key("start_date"));
    }

    #[test]
    fn test_camel_case() {
        assert_eq!(camel_case("start_date"), "startDate");
        assert_eq!(camel_case("cover_image"), "coverImage");
        assert_eq!(camel_case("name"), "name");
    }

    #[test]
    fn test_malformed_json_is_form_error() {
        let errors = parse_json::<Sample>(br#"{"name": 12"#).unwrap_err();
        assert_eq!(errors.form_errors.len(), 1);
        assert!(errors.field_errors.is_empty());
    }

    #[test]
    fn test_empty_body_is_form_error() {
        let errors = parse_json::<Sample>(b"").unwrap_err();
        assert_eq!(errors.form_errors, vec!["Request body is required".to_string()]);
    }
}
