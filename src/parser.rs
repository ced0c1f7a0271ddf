//! Tolerant reader for whatever the automation workflow sends back.
//!
//! Workflows reply in a handful of shapes: a plain object, the same object
//! JSON-encoded as a string, or either of those wrapped in an `output` field.
//! Keys show up capitalized (`Title`) or lowercase (`title`). Nothing here
//! ever fails past [`extract_fields`]; a reply that cannot be read is an
//! [`ParseOutcome::Unparsable`] value.

use log::debug;
use serde::Serialize;
use serde_json::{Map, Value};
use thiserror::Error;

/// Why a workflow reply yielded no recipe
#[derive(Debug, Error)]
pub enum ParseError {
    #[error("Response is not valid JSON: {0}")]
    InvalidJson(#[from] serde_json::Error),

    #[error("Response is not a JSON object")]
    NotAnObject,

    #[error("Response carries no title, ingredients or steps")]
    NoRecipeFields,
}

/// Recipe fields located in a workflow reply. `None` means "keep what the form has".
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ParsedRecipeFields {
    pub title: Option<String>,
    pub category: Option<String>,
    pub country: Option<String>,
    /// Never `Some(vec![])`
    pub ingredients: Option<Vec<String>>,
    /// Never `Some(vec![])`
    pub steps: Option<Vec<String>>,
}

#[derive(Debug)]
pub enum ParseOutcome {
    Parsed(ParsedRecipeFields),
    Unparsable(ParseError),
}

impl ParseOutcome {
    pub fn fields(&self) -> Option<&ParsedRecipeFields> {
        match self {
            ParseOutcome::Parsed(fields) => Some(fields),
            ParseOutcome::Unparsable(_) => None,
        }
    }

    pub fn is_parsed(&self) -> bool {
        matches!(self, ParseOutcome::Parsed(_))
    }
}

/// Reads recipe fields out of an envelope's `response` value
pub fn extract_fields(response: &Value) -> ParseOutcome {
    match parse_response(response) {
        Ok(fields) => ParseOutcome::Parsed(fields),
        Err(e) => {
            debug!("Workflow response not usable as a recipe: {}", e);
            ParseOutcome::Unparsable(e)
        }
    }
}

fn parse_response(response: &Value) -> Result<ParsedRecipeFields, ParseError> {
    let candidate = unwrap_candidate(response)?;
    let object = candidate.as_object().ok_or(ParseError::NotAnObject)?;

    let fields = ParsedRecipeFields {
        title: first_text(object, &["Title", "title"]),
        category: first_text(object, &["category"]),
        country: first_text(object, &["country"]),
        ingredients: first_list(object, &["Ingredients", "ingredients"]),
        steps: first_list(object, &["Steps", "steps"]),
    };

    if fields.title.is_none() && fields.ingredients.is_none() && fields.steps.is_none() {
        return Err(ParseError::NoRecipeFields);
    }

    Ok(fields)
}

/// Peels the optional `output` wrapper and any JSON-in-a-string encoding
fn unwrap_candidate(response: &Value) -> Result<Value, ParseError> {
    let inner = response.get("output").unwrap_or(response);
    match inner {
        Value::String(text) => Ok(serde_json::from_str(text)?),
        other => Ok(other.clone()),
    }
}

fn first_text(object: &Map<String, Value>, keys: &[&str]) -> Option<String> {
    keys.iter()
        .filter_map(|key| object.get(*key)?.as_str())
        .find(|text| !text.is_empty())
        .map(String::from)
}

fn first_list(object: &Map<String, Value>, keys: &[&str]) -> Option<Vec<String>> {
    keys.iter()
        .filter_map(|key| object.get(*key)?.as_array())
        .map(|items| {
            items
                .iter()
                .filter_map(|item| item.as_str().map(String::from))
                .collect::<Vec<String>>()
        })
        .find(|items| !items.is_empty())
}
