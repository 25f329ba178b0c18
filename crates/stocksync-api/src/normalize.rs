//! Field lookup helpers for heterogeneous response shapes
//!
//! The server has returned several spellings for the same field over time
//! (`id`, `Id`, `_id`; `createdAt`, `created_at`, ...). Each per-kind mapping
//! lists the accepted spellings in priority order and resolves them through
//! these helpers: the first key present with a non-null value wins.
//!
//! A key containing a dot (`company.id`) reads a nested object.

use chrono::{DateTime, NaiveDateTime, TimeZone, Utc};
use serde_json::{Map, Value};

use stocksync_core::domain::{EntityId, RecordMeta};

use crate::ApiError;

/// Accepted spellings of the primary key, highest priority first
pub const ID_KEYS: &[&str] = &["id", "Id", "ID", "_id"];

/// Accepted spellings of the creation timestamp, highest priority first
pub const CREATED_AT_KEYS: &[&str] = &["createdAt", "created_at", "CreatedAt", "createdDate"];

pub type Object = Map<String, Value>;

// ============================================================================
// Envelopes
// ============================================================================

/// Unwraps `{ "data": { ... } }` around a single record
pub fn unwrap_record(value: Value) -> Result<Object, ApiError> {
    match value {
        Value::Object(mut map) => match map.remove("data") {
            Some(Value::Object(inner)) => Ok(inner),
            Some(other) => {
                map.insert("data".to_string(), other);
                Ok(map)
            }
            None => Ok(map),
        },
        other => Err(ApiError::InvalidResponse(format!(
            "expected a JSON object, got {}",
            type_name(&other)
        ))),
    }
}

/// Unwraps a list response: a bare array, `{ "data": [...] }` or
/// `{ "items": [...] }`
pub fn unwrap_list(value: Value) -> Result<Vec<Value>, ApiError> {
    match value {
        Value::Array(items) => Ok(items),
        Value::Object(mut map) => {
            for key in ["data", "items"] {
                if let Some(Value::Array(items)) = map.remove(key) {
                    return Ok(items);
                }
            }
            Err(ApiError::InvalidResponse(
                "expected an array or a {data|items} envelope".to_string(),
            ))
        }
        other => Err(ApiError::InvalidResponse(format!(
            "expected a JSON array, got {}",
            type_name(&other)
        ))),
    }
}

// ============================================================================
// Field lookup
// ============================================================================

/// Returns the first non-null value among `keys`
pub fn field<'a>(obj: &'a Object, keys: &[&str]) -> Option<&'a Value> {
    keys.iter().find_map(|key| lookup(obj, key))
}

fn lookup<'a>(obj: &'a Object, key: &str) -> Option<&'a Value> {
    let value = match key.split_once('.') {
        Some((head, rest)) => match obj.get(head)? {
            Value::Object(inner) => lookup(inner, rest)?,
            _ => return None,
        },
        None => obj.get(key)?,
    };
    (!value.is_null()).then_some(value)
}

/// Reads an identifier; numbers are rendered as decimal strings
pub fn id_field(obj: &Object, keys: &[&str]) -> Result<Option<EntityId>, ApiError> {
    let Some(value) = field(obj, keys) else {
        return Ok(None);
    };
    let raw = match value {
        Value::Number(n) => match n.as_u64() {
            Some(n) => return Ok(Some(EntityId::from(n))),
            None => n.to_string(),
        },
        Value::String(s) => s.trim().to_string(),
        other => {
            return Err(ApiError::InvalidResponse(format!(
                "{}: expected an identifier, got {}",
                keys[0],
                type_name(other)
            )))
        }
    };
    EntityId::new(raw)
        .map(Some)
        .map_err(|e| ApiError::InvalidResponse(format!("{}: {e}", keys[0])))
}

pub fn required_id(obj: &Object, keys: &[&str]) -> Result<EntityId, ApiError> {
    id_field(obj, keys)?.ok_or_else(|| missing(keys))
}

/// Reads a string; numbers and booleans are stringified
pub fn text_field(obj: &Object, keys: &[&str]) -> Option<String> {
    match field(obj, keys)? {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

pub fn required_text(obj: &Object, keys: &[&str]) -> Result<String, ApiError> {
    text_field(obj, keys).ok_or_else(|| missing(keys))
}

/// Reads a decimal amount; numeric strings (`"19.90"`) are accepted
pub fn amount_field(obj: &Object, keys: &[&str]) -> Result<Option<f64>, ApiError> {
    let Some(value) = field(obj, keys) else {
        return Ok(None);
    };
    let amount = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    };
    match amount {
        Some(a) if a.is_finite() => Ok(Some(a)),
        _ => Err(ApiError::InvalidResponse(format!(
            "{}: not a number: {value}",
            keys[0]
        ))),
    }
}

/// Reads a non-negative whole count
pub fn count_field(obj: &Object, keys: &[&str]) -> Result<Option<u32>, ApiError> {
    let Some(value) = field(obj, keys) else {
        return Ok(None);
    };
    let count = match value {
        Value::Number(n) => n
            .as_u64()
            .or_else(|| n.as_f64().filter(|f| f.fract() == 0.0 && *f >= 0.0).map(|f| f as u64)),
        Value::String(s) => s.trim().parse::<u64>().ok(),
        _ => None,
    };
    count
        .and_then(|c| u32::try_from(c).ok())
        .map(Some)
        .ok_or_else(|| {
            ApiError::InvalidResponse(format!(
                "{}: expected a non-negative count, got {value}",
                keys[0]
            ))
        })
}

/// Reads a timestamp: RFC 3339, `YYYY-MM-DD HH:MM:SS` (UTC) or epoch millis
pub fn timestamp_field(obj: &Object, keys: &[&str]) -> Option<DateTime<Utc>> {
    match field(obj, keys)? {
        Value::String(s) => parse_timestamp(s),
        Value::Number(n) => n
            .as_i64()
            .and_then(|ms| Utc.timestamp_millis_opt(ms).single()),
        _ => None,
    }
}

fn parse_timestamp(s: &str) -> Option<DateTime<Utc>> {
    let s = s.trim();
    if let Ok(ts) = DateTime::parse_from_rfc3339(s) {
        return Some(ts.with_timezone(&Utc));
    }
    ["%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M:%S%.f"]
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(s, fmt).ok())
        .map(|naive| naive.and_utc())
}

/// Builds the Synced envelope of a server record
///
/// A missing or unparseable creation timestamp falls back to now.
pub fn synced_meta(obj: &Object) -> Result<RecordMeta, ApiError> {
    let id = required_id(obj, ID_KEYS)?;
    let created_at = timestamp_field(obj, CREATED_AT_KEYS).unwrap_or_else(|| {
        tracing::debug!(%id, "Record has no usable creation timestamp");
        Utc::now()
    });
    Ok(RecordMeta::synced(id, created_at))
}

// ============================================================================
// Outgoing payloads
// ============================================================================

/// Encodes an identifier for a request body: server ids as JSON numbers,
/// anything else as a string
pub fn id_value(id: &EntityId) -> Value {
    if id.is_server() {
        if let Ok(n) = id.as_str().parse::<u64>() {
            return Value::from(n);
        }
    }
    Value::String(id.as_str().to_string())
}

/// Inserts `value` under `key` when present
pub fn put_opt<T: Into<Value>>(body: &mut Object, key: &str, value: Option<T>) {
    if let Some(value) = value {
        body.insert(key.to_string(), value.into());
    }
}

fn missing(keys: &[&str]) -> ApiError {
    ApiError::InvalidResponse(format!("missing field (tried {})", keys.join(", ")))
}

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
