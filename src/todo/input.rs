// Request body validation for create and update

use serde_json::{Map, Value};
use thiserror::Error;

/// Client-caused input errors, surfaced as 400 with the message below
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Invalid JSON")]
    InvalidJson,
    #[error("title is required")]
    TitleRequired,
    #[error("title must be a non-empty string")]
    TitleNotString,
    #[error("done must be a boolean")]
    DoneNotBoolean,
    #[error("id is required")]
    IdRequired,
    #[error("Nothing to update")]
    NothingToUpdate,
}

/// Validated create input
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateTodo {
    pub title: String,
    pub done: bool,
}

impl CreateTodo {
    pub fn from_body(body: &Map<String, Value>) -> Result<Self, ValidationError> {
        let title = trimmed_title(body.get("title")).ok_or(ValidationError::TitleRequired)?;
        let done = body.get("done").map(parse_done).transpose()?.unwrap_or(false);
        Ok(Self { title, done })
    }
}

/// Validated update input; at least one field is set
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpdateTodo {
    pub title: Option<String>,
    pub done: Option<bool>,
}

impl UpdateTodo {
    pub fn from_body(body: &Map<String, Value>) -> Result<Self, ValidationError> {
        let title = body.get("title");
        let done = body.get("done");
        if title.is_none() && done.is_none() {
            return Err(ValidationError::NothingToUpdate);
        }

        let title = title
            .map(|value| trimmed_title(Some(value)).ok_or(ValidationError::TitleNotString))
            .transpose()?;
        let done = done.map(parse_done).transpose()?;
        Ok(Self { title, done })
    }
}

// U+FEFF counts as blank too, as it does for JavaScript's `trim`
fn trim_title(s: &str) -> &str {
    s.trim_matches(|c: char| c.is_whitespace() || c == '\u{feff}')
}

fn trimmed_title(value: Option<&Value>) -> Option<String> {
    match value {
        Some(Value::String(s)) => {
            let title = trim_title(s);
            (!title.is_empty()).then(|| title.to_string())
        }
        _ => None,
    }
}

// Only real booleans count; "true", 1 and null are rejected.
fn parse_done(value: &Value) -> Result<bool, ValidationError> {
    value.as_bool().ok_or(ValidationError::DoneNotBoolean)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn body(value: Value) -> Map<String, Value> {
        match value {
            Value::Object(map) => map,
            _ => panic!("test body must be an object"),
        }
    }

    #[test]
    fn test_create_trims_title_and_defaults_done() {
        let input = CreateTodo::from_body(&body(json!({"title": "  Walk dog  "}))).unwrap();
        assert_eq!(input.title, "Walk dog");
        assert!(!input.done);
    }

    #[test]
    fn test_create_accepts_done() {
        let input = CreateTodo::from_body(&body(json!({"title": "x", "done": true}))).unwrap();
        assert!(input.done);
    }

    #[test]
    fn test_create_rejects_bad_titles() {
        for value in [
            json!({}),
            json!({"title": null}),
            json!({"title": 42}),
            json!({"title": ""}),
            json!({"title": " \t\n "}),
            json!({"title": "\u{feff}"}),
            json!({"title": " \u{feff}\u{a0} "}),
            json!({"title": ["a"]}),
        ] {
            assert_eq!(
                CreateTodo::from_body(&body(value)),
                Err(ValidationError::TitleRequired)
            );
        }
    }

    #[test]
    fn test_create_rejects_non_boolean_done() {
        for done in [json!("true"), json!(1), json!(null), json!({})] {
            assert_eq!(
                CreateTodo::from_body(&body(json!({"title": "x", "done": done}))),
                Err(ValidationError::DoneNotBoolean)
            );
        }
    }

    #[test]
    fn test_update_requires_a_field() {
        assert_eq!(
            UpdateTodo::from_body(&body(json!({"other": 1}))),
            Err(ValidationError::NothingToUpdate)
        );
    }

    #[test]
    fn test_update_title_rules() {
        assert_eq!(
            UpdateTodo::from_body(&body(json!({"title": "   "}))),
            Err(ValidationError::TitleNotString)
        );
        assert_eq!(
            UpdateTodo::from_body(&body(json!({"title": null}))),
            Err(ValidationError::TitleNotString)
        );
        assert_eq!(
            UpdateTodo::from_body(&body(json!({"title": "\u{feff}"}))),
            Err(ValidationError::TitleNotString)
        );
        let input = UpdateTodo::from_body(&body(json!({"title": " New "}))).unwrap();
        assert_eq!(input.title.as_deref(), Some("New"));
        assert_eq!(input.done, None);
    }

    #[test]
    fn test_title_strips_byte_order_mark() {
        let input =
            CreateTodo::from_body(&body(json!({"title": "\u{feff}Groceries "}))).unwrap();
        assert_eq!(input.title, "Groceries");
    }

    #[test]
    fn test_update_done_only() {
        let input = UpdateTodo::from_body(&body(json!({"done": false}))).unwrap();
        assert_eq!(input.title, None);
        assert_eq!(input.done, Some(false));
        assert_eq!(
            UpdateTodo::from_body(&body(json!({"done": "yes"}))),
            Err(ValidationError::DoneNotBoolean)
        );
    }
}
