//! Conversion between wire JSON and typed models.
//!
//! serde does the structural work. Before a value reaches serde, it is
//! checked against the model's [`ModelSpec`] so that failures come back as the
//! right [`OpenApiError`] kind with a path to the offending item:
//!
//! | problem                               | error   |
//! |---------------------------------------|---------|
//! | malformed JSON, wrong JSON kind, null on a non-nullable field | `Type` |
//! | enum value outside the allowed set    | `Value` |
//! | required field missing                | `Key`   |
//!
//! Unknown fields are ignored. Write-only fields are dropped on decode.
//! Integer-valued floats (`3.0`) are coerced for integer fields; no other
//! coercion is defined.

pub mod field;
pub mod nullable;

pub use field::{FieldAccess, FieldKind, FieldSpec, ModelSpec};
pub use nullable::Nullable;

use crate::error::{ItemPath, OpenApiError};

use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;

/// A typed structure mirroring one JSON schema component.
pub trait Model: Serialize + DeserializeOwned {
    const SPEC: ModelSpec;
}

/// Serialize a model, omitting unset fields.
///
/// A non-nullable field left as `None` is dropped even if the model forgot
/// `skip_serializing_if`; a nullable field set to [`Nullable::Null`] stays as
/// `null`.
pub fn serialize<M: Model>(model: &M) -> Result<Value, OpenApiError> {
    let mut value = to_json_value(model)?;
    prune(&mut value, &M::SPEC, false);
    Ok(value)
}

/// Decode a JSON value into `M`.
pub fn deserialize<M: Model>(mut value: Value) -> Result<M, OpenApiError> {
    validate_model(&mut value, &M::SPEC, &ItemPath::root())?;
    serde_json::from_value(value).map_err(|error| {
        OpenApiError::type_error(
            format!("cannot decode {}: {error}", M::SPEC.name),
            ItemPath::root(),
        )
    })
}

/// Parse raw bytes as JSON, then decode into `M`.
pub fn deserialize_slice<M: Model>(bytes: &[u8]) -> Result<M, OpenApiError> {
    deserialize(parse_json(bytes)?)
}

pub fn deserialize_str<M: Model>(text: &str) -> Result<M, OpenApiError> {
    deserialize_slice(text.as_bytes())
}

/// Parse bytes as JSON; malformed input is a type error.
pub fn parse_json(bytes: &[u8]) -> Result<Value, OpenApiError> {
    serde_json::from_slice(bytes).map_err(|error| {
        OpenApiError::type_error(format!("malformed JSON: {error}"), ItemPath::root())
    })
}

/// Model ready for a request body: serialized, with read-only fields removed.
pub fn sanitize_for_serialization<M: Model>(model: &M) -> Result<Value, OpenApiError> {
    let mut value = to_json_value(model)?;
    prune(&mut value, &M::SPEC, true);
    Ok(value)
}

/// A value accepted as a request body.
pub trait IntoRequestBody {
    fn into_request_body(self) -> Result<Value, OpenApiError>;
}

impl IntoRequestBody for Value {
    fn into_request_body(self) -> Result<Value, OpenApiError> {
        Ok(self)
    }
}

impl<M: Model> IntoRequestBody for &M {
    fn into_request_body(self) -> Result<Value, OpenApiError> {
        sanitize_for_serialization(self)
    }
}

/// What an operation declares it returns on success.
pub trait ResponseType: Sized {
    fn decode(body: &[u8]) -> Result<Self, OpenApiError>;
}

/// Void responses: the body is not inspected.
impl ResponseType for () {
    fn decode(_body: &[u8]) -> Result<Self, OpenApiError> {
        Ok(())
    }
}

impl ResponseType for Value {
    fn decode(body: &[u8]) -> Result<Self, OpenApiError> {
        parse_json(body)
    }
}

impl<M: Model> ResponseType for M {
    fn decode(body: &[u8]) -> Result<Self, OpenApiError> {
        deserialize_slice(body)
    }
}

fn to_json_value<T: Serialize>(value: &T) -> Result<Value, OpenApiError> {
    serde_json::to_value(value).map_err(|error| {
        OpenApiError::type_error(format!("cannot serialize: {error}"), ItemPath::root())
    })
}

fn prune(value: &mut Value, spec: &ModelSpec, drop_read_only: bool) {
    let Value::Object(object) = value else {
        return;
    };

    for field in spec.fields {
        let remove = match object.get(field.name) {
            None => false,
            Some(_) if drop_read_only && field.access == FieldAccess::ReadOnly => true,
            Some(Value::Null) => !field.nullable,
            Some(_) => false,
        };
        if remove {
            object.remove(field.name);
        } else if let Some(inner) = object.get_mut(field.name) {
            prune_kind(inner, &field.kind, drop_read_only);
        }
    }
}

fn prune_kind(value: &mut Value, kind: &FieldKind, drop_read_only: bool) {
    match kind {
        FieldKind::Model(spec) => prune(value, spec, drop_read_only),
        FieldKind::Array(inner) => {
            if let Value::Array(items) = value {
                for item in items.iter_mut() {
                    prune_kind(item, inner, drop_read_only);
                }
            }
        }
        _ => {}
    }
}

fn validate_model(value: &mut Value, spec: &ModelSpec, path: &ItemPath) -> Result<(), OpenApiError> {
    let Value::Object(object) = value else {
        return Err(OpenApiError::type_error(
            format!(
                "invalid type for {}: expected object, received {}",
                spec.name,
                json_kind(value)
            ),
            path.clone(),
        ));
    };

    for field in spec.fields {
        let field_path = path.key(field.name);

        if field.access == FieldAccess::WriteOnly {
            object.remove(field.name);
            continue;
        }

        match object.get_mut(field.name) {
            None if field.required => {
                return Err(OpenApiError::key_error(
                    format!("{} is missing required field '{}'", spec.name, field.name),
                    field_path,
                ));
            }
            None => {}
            Some(Value::Null) if field.nullable => {}
            Some(Value::Null) => {
                return Err(OpenApiError::type_error(
                    format!(
                        "invalid null for non-nullable field '{}', expected {}",
                        field.name,
                        field.kind.describe()
                    ),
                    field_path,
                ));
            }
            Some(inner) => validate_kind(inner, &field.kind, &field_path)?,
        }
    }

    Ok(())
}

fn validate_kind(value: &mut Value, kind: &FieldKind, path: &ItemPath) -> Result<(), OpenApiError> {
    let kind_matches = match kind {
        FieldKind::Any => true,
        FieldKind::String => value.is_string(),
        FieldKind::Boolean => value.is_boolean(),
        FieldKind::Number => value.is_number(),
        FieldKind::Object => value.is_object(),
        FieldKind::Integer => coerce_integer(value),
        FieldKind::Enum(allowed) => {
            let Some(text) = value.as_str() else {
                return Err(mismatch(value, kind, path));
            };
            if !allowed.iter().any(|candidate| *candidate == text) {
                return Err(OpenApiError::value_error_at(
                    format!("invalid value '{text}', must be one of {allowed:?}"),
                    path.clone(),
                ));
            }
            true
        }
        FieldKind::Array(inner) => {
            let Value::Array(items) = value else {
                return Err(mismatch(value, kind, path));
            };
            for (index, item) in items.iter_mut().enumerate() {
                let item_path = path.index(index);
                if item.is_null() {
                    return Err(OpenApiError::type_error(
                        format!("invalid null array item, expected {}", inner.describe()),
                        item_path,
                    ));
                }
                validate_kind(item, inner, &item_path)?;
            }
            true
        }
        FieldKind::Model(spec) => {
            validate_model(value, spec, path)?;
            true
        }
    };

    if kind_matches {
        Ok(())
    } else {
        Err(mismatch(value, kind, path))
    }
}

/// Accept integers, and floats with no fractional part (rewritten in place).
fn coerce_integer(value: &mut Value) -> bool {
    if value.is_i64() || value.is_u64() {
        return true;
    }
    match value.as_f64() {
        Some(float) if float.fract() == 0.0 && float.abs() < i64::MAX as f64 => {
            *value = Value::from(float as i64);
            true
        }
        _ => false,
    }
}

#[track_caller]
fn mismatch(value: &Value, kind: &FieldKind, path: &ItemPath) -> OpenApiError {
    OpenApiError::type_error(
        format!(
            "invalid type: received {}, expected {}",
            json_kind(value),
            kind.describe()
        ),
        path.clone(),
    )
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
