// src/schema.rs
//! Structural checks for a decoded store document.
//!
//! Validation runs on the untyped JSON value before it is turned into a
//! [`PasswordStore`], so every rejection can name the exact section, site or
//! field that is wrong. Checks short-circuit on the first failure and nothing
//! is repaired.
use crate::error::{SchemaError, SchemaResult};
use crate::models::{normalize_site, PasswordStore};
use serde_json::{Map, Value};

const METADATA_FIELDS: [(&str, FieldKind); 4] = [
    ("version", FieldKind::Int),
    ("created_at", FieldKind::Str),
    ("updated_at", FieldKind::Str),
    ("count", FieldKind::Int),
];

const RECORD_FIELDS: [&str; 3] = ["username", "password", "last_updated"];

#[derive(Clone, Copy)]
enum FieldKind {
    Int,
    Str,
}

impl FieldKind {
    fn matches(self, value: &Value) -> bool {
        match self {
            // i64/u64 only: 1.0 and true are not integers here
            FieldKind::Int => value.is_i64() || value.is_u64(),
            FieldKind::Str => value.is_string(),
        }
    }

    fn name(self) -> &'static str {
        match self {
            FieldKind::Int => "int",
            FieldKind::Str => "str",
        }
    }
}

/// Accepts or rejects a whole document.
pub fn validate(document: &Value) -> SchemaResult<()> {
    let root = document.as_object().ok_or(SchemaError::RootNotObject)?;

    let (metadata, entries) = match (root.get("metadata"), root.get("entries")) {
        (Some(metadata), Some(entries)) => (metadata, entries),
        _ => return Err(SchemaError::MissingSection),
    };
    let (metadata, entries) = match (metadata.as_object(), entries.as_object()) {
        (Some(metadata), Some(entries)) => (metadata, entries),
        _ => return Err(SchemaError::SectionNotObject),
    };

    validate_metadata(metadata)?;

    // JSON object keys are always strings, so only the values need checking.
    for (site, record) in entries {
        validate_record(site, record)?;
    }

    // Lookups always normalize, so a key stored in any other form is unreachable.
    if let Some(site) = entries.keys().find(|site| normalize_site(site) != **site) {
        return Err(SchemaError::KeyNotNormalized(site.clone()));
    }

    let count = &metadata["count"];
    let declared = count
        .as_i64()
        .map(i128::from)
        .or_else(|| count.as_u64().map(i128::from))
        .ok_or(SchemaError::MetadataType { field: "count", expected: "int" })?;
    if declared != entries.len() as i128 {
        return Err(SchemaError::CountMismatch { declared, actual: entries.len() });
    }

    Ok(())
}

fn validate_metadata(metadata: &Map<String, Value>) -> SchemaResult<()> {
    for (field, kind) in METADATA_FIELDS {
        let value = metadata.get(field).ok_or(SchemaError::MetadataMissing(field))?;
        if !kind.matches(value) {
            return Err(SchemaError::MetadataType { field, expected: kind.name() });
        }
    }
    Ok(())
}

fn validate_record(site: &str, record: &Value) -> SchemaResult<()> {
    let record = record
        .as_object()
        .ok_or_else(|| SchemaError::EntryNotObject(site.to_string()))?;
    for field in RECORD_FIELDS {
        let value = record.get(field).ok_or_else(|| SchemaError::EntryMissing {
            site: site.to_string(),
            field,
        })?;
        match value.as_str() {
            None => return Err(SchemaError::EntryType { site: site.to_string(), field }),
            Some("") if field != "last_updated" => {
                return Err(SchemaError::EntryEmpty { site: site.to_string(), field })
            }
            Some(_) => {}
        }
    }
    Ok(())
}

/// Validates `document` and converts it into the typed store.
pub fn parse_document(document: Value) -> SchemaResult<PasswordStore> {
    validate(&document)?;
    serde_json::from_value(document).map_err(|e| {
        // Only reachable for values outside the typed ranges, e.g. a u64 version above i64::MAX.
        log::warn!("Validated document failed typed conversion: {}", e);
        SchemaError::Conversion(e.to_string())
    })
}
