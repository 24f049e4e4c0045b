//! Filter construction from query parameters.
//!
//! Two mutually exclusive filter modes:
//!
//! - a `filters` parameter holding a JSON object, passed to the match stage
//!   verbatim so callers can use the full MongoDB query syntax, and
//! - any non-reserved query parameters, treated as exact-match conditions.
//!
//! When `filters` is present the flat parameters are ignored.

use std::collections::HashMap;

use bson::{Bson, Document};

use crate::error::{EventError, Result};
use crate::query::RESERVED_PARAMS;

/// Fields that live at the top level of the stored document. Everything
/// else is payload and nests under `properties`.
const SCHEMA_FIELDS: [&str; 4] = ["_id", "id", "created_at", "updated_at"];

/// Build the match-stage filter document from raw query parameters.
pub fn build_filter(params: &HashMap<String, String>) -> Result<Document> {
    if let Some(raw) = params.get("filters") {
        return parse_structured_filters(raw);
    }

    let mut filter = Document::new();
    for (key, value) in params {
        if RESERVED_PARAMS.contains(&key.as_str()) {
            continue;
        }
        filter.insert(resolve_field_path(key), Bson::String(value.clone()));
    }
    Ok(filter)
}

fn parse_structured_filters(raw: &str) -> Result<Document> {
    let parsed: serde_json::Map<String, serde_json::Value> = serde_json::from_str(raw)
        .map_err(|_| EventError::validation("filters must be a valid JSON object"))?;

    Document::try_from(parsed)
        .map_err(|_| EventError::validation("filters must be a valid JSON object"))
}

/// Resolve a user-supplied field name to its stored path.
///
/// `id` maps to the stored `_id`; known top-level fields and already-dotted
/// paths pass through; anything else is assumed to be an event property.
pub fn resolve_field_path(field: &str) -> String {
    if field == "id" {
        return "_id".to_string();
    }
    if SCHEMA_FIELDS.contains(&field) || field.contains('.') {
        return field.to_string();
    }
    format!("properties.{}", field)
}

#[cfg(test)]
mod tests {
    use super::*;
    use bson::doc;

    fn params(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_flat_params_become_exact_match() {
        let filter = build_filter(&params(&[("plan", "pro"), ("page", "2")])).unwrap();
        assert_eq!(filter, doc! { "properties.plan": "pro" });
    }

    #[test]
    fn test_reserved_params_are_excluded() {
        let filter = build_filter(&params(&[
            ("page", "1"),
            ("limit", "10"),
            ("sortBy", "created_at"),
            ("sortOrder", "asc"),
            ("groupBy", "plan"),
            ("aggregates", "count"),
            ("interval", "day"),
        ]))
        .unwrap();
        assert!(filter.is_empty());
    }

    #[test]
    fn test_structured_filters_pass_through_verbatim() {
        let filter = build_filter(&params(&[(
            "filters",
            r#"{"properties.amount": {"$gte": 100}}"#,
        )]))
        .unwrap();
        assert_eq!(filter, doc! { "properties.amount": { "$gte": 100 } });
    }

    #[test]
    fn test_structured_filters_override_flat_params() {
        let filter = build_filter(&params(&[
            ("filters", r#"{"properties.plan": "pro"}"#),
            ("region", "eu"),
        ]))
        .unwrap();
        assert_eq!(filter, doc! { "properties.plan": "pro" });
    }

    #[test]
    fn test_invalid_structured_filters_rejected() {
        assert!(build_filter(&params(&[("filters", "not json")])).is_err());
        assert!(build_filter(&params(&[("filters", "[1,2]")])).is_err());
    }

    #[test]
    fn test_resolve_field_path() {
        assert_eq!(resolve_field_path("id"), "_id");
        assert_eq!(resolve_field_path("_id"), "_id");
        assert_eq!(resolve_field_path("created_at"), "created_at");
        assert_eq!(resolve_field_path("plan"), "properties.plan");
        assert_eq!(resolve_field_path("properties.plan"), "properties.plan");
        assert_eq!(resolve_field_path("meta.region"), "meta.region");
    }
}
