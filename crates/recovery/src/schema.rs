//! Analysis Schema Validation
//!
//! Structural contract for a generated call analysis, checked on the raw JSON
//! value before it is converted into `GeneratedAnalysis`:
//! - `overallScore` absent, null, or a number in [1, 10]
//! - `components` is a non-empty array; each component has a `name`, a
//!   nullable score and a non-empty `subComponents` array
//! - each sub-component has a `name`, a nullable score, an `evidence` array,
//!   a `qualitativeAssessment` string and an `improvementSuggestions` array
//! - `executiveSummary` has `strengths`, `weaknesses` and `recommendations`
//!   arrays (possibly empty)
//!
//! Evidence items are citation objects (`speaker` and `quote` required,
//! `timestamp` and `context` optional) or, in the legacy format, plain
//! strings.
//!
//! `keyFindings` and `followUpCallPlanning` are advisory: they are never a
//! reason to reject an analysis. [`normalize_optional_fields`] coerces them
//! into the typed shape instead.

use serde_json::{Map, Value};
use thiserror::Error;

pub const MIN_SCORE: f64 = 1.0;
pub const MAX_SCORE: f64 = 10.0;

/// A parsed value that breaks the analysis contract.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("schema violation at {path}: {message}")]
pub struct SchemaViolation {
    pub path: String,
    pub message: String,
}

impl SchemaViolation {
    pub fn new(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            message: message.into(),
        }
    }
}

type SchemaResult = Result<(), SchemaViolation>;

/// Validate a parsed analysis value against the contract.
pub fn validate_analysis(value: &Value) -> SchemaResult {
    let root = as_object(value, "$")?;

    validate_score(root.get("overallScore"), "$.overallScore")?;

    let components = required_array(root, "components", "$")?;
    if components.is_empty() {
        return Err(SchemaViolation::new("$.components", "must not be empty"));
    }
    for (i, component) in components.iter().enumerate() {
        validate_component(component, &format!("$.components[{}]", i))?;
    }

    let summary_path = "$.executiveSummary";
    let summary = root
        .get("executiveSummary")
        .ok_or_else(|| SchemaViolation::new(summary_path, "is required"))?;
    let summary = as_object(summary, summary_path)?;
    for field in ["strengths", "weaknesses", "recommendations"] {
        let field_path = format!("{}.{}", summary_path, field);
        string_array(required_array(summary, field, summary_path)?, &field_path)?;
    }

    Ok(())
}

fn validate_component(value: &Value, path: &str) -> SchemaResult {
    let component = as_object(value, path)?;
    required_string(component, "name", path)?;
    validate_score(component.get("overallScore"), &format!("{}.overallScore", path))?;

    let subs = required_array(component, "subComponents", path)?;
    if subs.is_empty() {
        return Err(SchemaViolation::new(
            format!("{}.subComponents", path),
            "must not be empty",
        ));
    }
    for (j, sub) in subs.iter().enumerate() {
        validate_sub_component(sub, &format!("{}.subComponents[{}]", path, j))?;
    }
    Ok(())
}

fn validate_sub_component(value: &Value, path: &str) -> SchemaResult {
    let sub = as_object(value, path)?;
    required_string(sub, "name", path)?;
    validate_score(sub.get("score"), &format!("{}.score", path))?;
    validate_evidence(required_array(sub, "evidence", path)?, &format!("{}.evidence", path))?;
    required_string(sub, "qualitativeAssessment", path)?;
    let suggestions = required_array(sub, "improvementSuggestions", path)?;
    string_array(suggestions, &format!("{}.improvementSuggestions", path))
}

fn validate_evidence(items: &[Value], path: &str) -> SchemaResult {
    for (k, item) in items.iter().enumerate() {
        let item_path = format!("{}[{}]", path, k);
        match item {
            Value::String(s) if !s.trim().is_empty() => {}
            Value::Object(citation) => {
                required_string(citation, "speaker", &item_path)?;
                required_string(citation, "quote", &item_path)?;
                for optional in ["timestamp", "context"] {
                    match citation.get(optional) {
                        None | Some(Value::Null) | Some(Value::String(_)) => {}
                        Some(_) => {
                            return Err(SchemaViolation::new(
                                format!("{}.{}", item_path, optional),
                                "must be a string when present",
                            ))
                        }
                    }
                }
            }
            _ => {
                return Err(SchemaViolation::new(
                    item_path,
                    "evidence must be a citation object",
                ))
            }
        }
    }
    Ok(())
}

/// Scores are nullable; zero is not a sentinel and is rejected.
fn validate_score(value: Option<&Value>, path: &str) -> SchemaResult {
    match value {
        None | Some(Value::Null) => Ok(()),
        Some(Value::Number(n)) => match n.as_f64() {
            Some(score) if (MIN_SCORE..=MAX_SCORE).contains(&score) => Ok(()),
            _ => Err(SchemaViolation::new(
                path,
                format!("score {} is outside [1, 10]", n),
            )),
        },
        Some(_) => Err(SchemaViolation::new(path, "score must be a number or null")),
    }
}

fn as_object<'a>(value: &'a Value, path: &str) -> Result<&'a Map<String, Value>, SchemaViolation> {
    value
        .as_object()
        .ok_or_else(|| SchemaViolation::new(path, "must be an object"))
}

fn as_array<'a>(value: &'a Value, path: &str) -> Result<&'a [Value], SchemaViolation> {
    value
        .as_array()
        .map(Vec::as_slice)
        .ok_or_else(|| SchemaViolation::new(path, "must be an array"))
}

fn required_array<'a>(
    object: &'a Map<String, Value>,
    field: &str,
    parent: &str,
) -> Result<&'a [Value], SchemaViolation> {
    let path = format!("{}.{}", parent, field);
    let value = object
        .get(field)
        .ok_or_else(|| SchemaViolation::new(&path, "is required"))?;
    as_array(value, &path)
}

fn required_string(object: &Map<String, Value>, field: &str, parent: &str) -> SchemaResult {
    match object.get(field) {
        Some(Value::String(_)) => Ok(()),
        Some(_) => Err(SchemaViolation::new(
            format!("{}.{}", parent, field),
            "must be a string",
        )),
        None => Err(SchemaViolation::new(
            format!("{}.{}", parent, field),
            "is required",
        )),
    }
}

fn string_array(items: &[Value], path: &str) -> SchemaResult {
    match items.iter().position(|v| !v.is_string()) {
        Some(i) => Err(SchemaViolation::new(
            format!("{}[{}]", path, i),
            "must be a string",
        )),
        None => Ok(()),
    }
}

/// Rewrite legacy plain-string evidence into citation objects, in place.
pub fn normalize_legacy_evidence(value: &mut Value) {
    fn normalize(items: Option<&mut Value>) {
        if let Some(Value::Array(items)) = items {
            for item in items.iter_mut() {
                if let Value::String(quote) = item {
                    *item = serde_json::json!({
                        "speaker": call_analyzer_core::UNKNOWN_SPEAKER,
                        "quote": quote.clone(),
                    });
                }
            }
        }
    }

    if let Some(Value::Array(components)) = value.get_mut("components") {
        for component in components.iter_mut() {
            if let Some(Value::Array(subs)) = component.get_mut("subComponents") {
                for sub in subs.iter_mut() {
                    normalize(sub.get_mut("evidence"));
                }
            }
        }
    }
    if let Some(planning) = value.get_mut("followUpCallPlanning") {
        if let Some(Value::Array(objections)) = planning.get_mut("anticipatedObjections") {
            for objection in objections.iter_mut() {
                normalize(objection.get_mut("evidence"));
            }
        }
        normalize(planning.get_mut("supportingEvidence"));
    }
}

/// Coerce the advisory fields into the shape `GeneratedAnalysis` expects, in
/// place.
///
/// - `keyFindings` and the planning string lists become string arrays; null
///   items are dropped, a bare string is wrapped and anything else is
///   stringified
/// - objections given as plain strings become `{"objection": ..}`; items
///   without a usable objection are dropped
/// - planning evidence keeps only legacy strings and citation objects with a
///   string `speaker` and `quote`
/// - a non-object `followUpCallPlanning` is removed
pub fn normalize_optional_fields(value: &mut Value) {
    if let Some(Value::Array(components)) = value.get_mut("components") {
        for component in components.iter_mut().filter_map(Value::as_object_mut) {
            if let Some(findings) = component.get_mut("keyFindings") {
                coerce_string_list(findings);
            }
        }
    }

    let Some(root) = value.as_object_mut() else {
        return;
    };
    let Some(planning) = root.get_mut("followUpCallPlanning") else {
        return;
    };
    let Some(fields) = planning.as_object_mut() else {
        root.remove("followUpCallPlanning");
        return;
    };
    for field in ["nextCallObjectives", "keyQuestions", "stakeholdersToEngage"] {
        if let Some(items) = fields.get_mut(field) {
            coerce_string_list(items);
        }
    }
    if let Some(objections) = fields.get_mut("anticipatedObjections") {
        coerce_objections(objections);
    }
    if let Some(evidence) = fields.get_mut("supportingEvidence") {
        coerce_evidence(evidence);
    }
}

fn coerce_string_list(value: &mut Value) {
    let items = match value.take() {
        Value::Array(items) => items.into_iter().filter_map(list_item_text).collect(),
        Value::String(s) if !s.trim().is_empty() => vec![Value::String(s)],
        _ => Vec::new(),
    };
    *value = Value::Array(items);
}

/// Stakeholder lists often arrive as `{"name", "role"}` objects.
fn list_item_text(item: Value) -> Option<Value> {
    let text = match item {
        Value::Null | Value::Array(_) => return None,
        Value::String(s) => s,
        Value::Object(map) => {
            let name = map.get("name").and_then(Value::as_str).map(str::to_string);
            let role = ["role", "title"]
                .iter()
                .find_map(|field| map.get(*field).and_then(Value::as_str))
                .map(str::to_string);
            match (name, role) {
                (Some(name), Some(role)) => format!("{} ({})", name, role),
                (Some(name), None) => name,
                (None, _) => Value::Object(map).to_string(),
            }
        }
        other => other.to_string(),
    };
    (!text.trim().is_empty()).then_some(Value::String(text))
}

fn coerce_objections(value: &mut Value) {
    let items = match value.take() {
        Value::Array(items) => items
            .into_iter()
            .filter_map(|item| match item {
                Value::String(objection) if !objection.trim().is_empty() => {
                    Some(serde_json::json!({ "objection": objection }))
                }
                Value::Object(mut objection) => {
                    if !objection.get("objection").is_some_and(Value::is_string) {
                        return None;
                    }
                    if !objection.get("suggestedResponse").is_some_and(Value::is_string) {
                        objection.remove("suggestedResponse");
                    }
                    if let Some(evidence) = objection.get_mut("evidence") {
                        coerce_evidence(evidence);
                    }
                    Some(Value::Object(objection))
                }
                _ => None,
            })
            .collect(),
        _ => Vec::new(),
    };
    *value = Value::Array(items);
}

fn coerce_evidence(value: &mut Value) {
    let items = match value.take() {
        Value::Array(items) => items
            .into_iter()
            .filter_map(|item| match item {
                Value::String(s) if !s.trim().is_empty() => Some(Value::String(s)),
                Value::Object(mut citation) => {
                    let usable = ["speaker", "quote"]
                        .iter()
                        .all(|field| citation.get(*field).is_some_and(Value::is_string));
                    if !usable {
                        return None;
                    }
                    for optional in ["timestamp", "context"] {
                        if !citation.get(optional).is_some_and(Value::is_string) {
                            citation.remove(optional);
                        }
                    }
                    Some(Value::Object(citation))
                }
                _ => None,
            })
            .collect(),
        _ => Vec::new(),
    };
    *value = Value::Array(items);
}
