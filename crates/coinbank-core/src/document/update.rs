//! Update expressions: partial modifications applied to a stored document.

use serde_json::{Number, Value};

use super::{json_kind, validate_path, Document, ID_FIELD};
use crate::error::{CoinbankError, Result};

/// A list of field modifications applied in order.
///
/// Supported operators are `$inc`, `$set`, and `$unset`. The identifier
/// field can never be targeted.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Update {
    ops: Vec<Op>,
}

#[derive(Debug, Clone, PartialEq)]
enum Op {
    Inc(String, Number),
    Set(String, Value),
    Unset(String),
}

/// Result of applying an update by identifier.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct UpdateOutcome {
    /// Number of documents the identifier matched (0 or 1).
    pub matched: u64,
    /// Number of documents whose contents changed.
    pub modified: u64,
}

impl UpdateOutcome {
    pub fn not_found() -> Self {
        Self::default()
    }

    pub fn applied(modified: bool) -> Self {
        Self {
            matched: 1,
            modified: u64::from(modified),
        }
    }

    pub fn is_match(&self) -> bool {
        self.matched > 0
    }
}

impl Update {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add `delta` to a numeric field, creating it if missing.
    pub fn inc(mut self, path: impl Into<String>, delta: impl Into<Number>) -> Self {
        self.ops.push(Op::Inc(path.into(), delta.into()));
        self
    }

    pub fn set(mut self, path: impl Into<String>, value: impl Into<Value>) -> Self {
        self.ops.push(Op::Set(path.into(), value.into()));
        self
    }

    pub fn unset(mut self, path: impl Into<String>) -> Self {
        self.ops.push(Op::Unset(path.into()));
        self
    }

    /// Parse an update from a JSON object such as `{"$inc": {"amount": 1}}`.
    ///
    /// # Errors
    ///
    /// Returns `CoinbankError::InvalidInput` if the expression is empty, uses
    /// an unknown operator, has a non-numeric `$inc` operand, or targets `_id`.
    pub fn from_value(value: Value) -> Result<Self> {
        let map = match value {
            Value::Object(map) => map,
            other => {
                return Err(CoinbankError::InvalidInput(format!(
                    "Update must be a JSON object, got {}",
                    json_kind(&other)
                )))
            }
        };

        let mut update = Self::new();
        for (op, fields) in map {
            let fields = match fields {
                Value::Object(fields) => fields,
                other => {
                    return Err(CoinbankError::InvalidInput(format!(
                        "{} expects an object of fields, got {}",
                        op,
                        json_kind(&other)
                    )))
                }
            };
            for (path, operand) in fields {
                let parsed = match op.as_str() {
                    "$inc" => match operand {
                        Value::Number(delta) => Op::Inc(path, delta),
                        other => {
                            return Err(CoinbankError::InvalidInput(format!(
                                "$inc on '{}' expects a number, got {}",
                                path,
                                json_kind(&other)
                            )))
                        }
                    },
                    "$set" => Op::Set(path, operand),
                    "$unset" => Op::Unset(path),
                    unknown => {
                        return Err(CoinbankError::InvalidInput(format!(
                            "Unknown update operator '{}'",
                            unknown
                        )))
                    }
                };
                update.ops.push(parsed);
            }
        }

        update.validate()?;
        Ok(update)
    }

    /// Parse an update from JSON text.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let value: Value = serde_json::from_str(json)
            .map_err(|e| CoinbankError::InvalidInput(format!("Invalid update JSON: {}", e)))?;
        Self::from_value(value)
    }

    /// Check the expression is non-empty, well-formed, and leaves `_id` alone.
    pub fn validate(&self) -> Result<()> {
        if self.ops.is_empty() {
            return Err(CoinbankError::InvalidInput(
                "Update expression is empty".to_string(),
            ));
        }
        for op in &self.ops {
            let path = op.path();
            validate_path(path)?;
            if path == ID_FIELD || path.starts_with("_id.") {
                return Err(CoinbankError::InvalidInput(
                    "The _id field is immutable".to_string(),
                ));
            }
        }
        Ok(())
    }

    /// Apply the update to a document.
    ///
    /// Either every operation applies or the document is left untouched.
    /// Returns whether the document's contents changed.
    ///
    /// # Errors
    ///
    /// Returns `CoinbankError::Validation` if `$inc` targets a non-numeric
    /// field, a path crosses a non-object value, or a sum is not finite.
    pub fn apply(&self, document: &mut Document) -> Result<bool> {
        self.validate()?;

        let mut working = document.clone();
        for op in &self.ops {
            op.apply(&mut working)?;
        }

        let modified = working != *document;
        if modified {
            *document = working;
        }
        Ok(modified)
    }
}

impl TryFrom<Value> for Update {
    type Error = CoinbankError;

    fn try_from(value: Value) -> Result<Self> {
        Self::from_value(value)
    }
}

impl Op {
    fn path(&self) -> &str {
        match self {
            Op::Inc(path, _) | Op::Set(path, _) | Op::Unset(path) => path,
        }
    }

    fn apply(&self, document: &mut Document) -> Result<()> {
        match self {
            Op::Inc(path, delta) => {
                let (parent, key) = parent_mut(document, path)?;
                let next = match parent.get(key) {
                    None => delta.clone(),
                    Some(Value::Number(current)) => add_numbers(current, delta)?,
                    Some(other) => {
                        return Err(CoinbankError::Validation(format!(
                            "Cannot increment non-numeric field '{}' ({})",
                            path,
                            json_kind(other)
                        )))
                    }
                };
                parent.insert(key.to_string(), Value::Number(next));
            }
            Op::Set(path, value) => {
                let (parent, key) = parent_mut(document, path)?;
                parent.insert(key.to_string(), value.clone());
            }
            Op::Unset(path) => {
                if let Some((parent, key)) = existing_parent_mut(document, path) {
                    parent.remove(key);
                }
            }
        }
        Ok(())
    }
}

/// Integer sums stay integers; anything involving a float becomes a float.
fn add_numbers(current: &Number, delta: &Number) -> Result<Number> {
    if let (Some(a), Some(b)) = (current.as_i64(), delta.as_i64()) {
        return a
            .checked_add(b)
            .map(Number::from)
            .ok_or_else(|| CoinbankError::Validation("$inc overflow".to_string()));
    }
    let a = current.as_f64().unwrap_or_default();
    let b = delta.as_f64().unwrap_or_default();
    Number::from_f64(a + b).ok_or_else(|| {
        CoinbankError::Validation("Increment produced a non-finite number".to_string())
    })
}

/// Walk to the object holding the last path segment, creating intermediate
/// objects as needed.
fn parent_mut<'a, 'p>(
    document: &'a mut Document,
    path: &'p str,
) -> Result<(&'a mut Document, &'p str)> {
    let (parents, key) = split_path(path);
    let mut current = document;
    for segment in parents {
        let next = current
            .entry(segment.to_string())
            .or_insert_with(|| Value::Object(Document::new()));
        current = match next {
            Value::Object(map) => map,
            other => {
                return Err(CoinbankError::Validation(format!(
                    "Cannot traverse '{}' in '{}': field is a {}",
                    segment,
                    path,
                    json_kind(other)
                )))
            }
        };
    }
    Ok((current, key))
}

/// Like [`parent_mut`] but never creates anything.
fn existing_parent_mut<'a, 'p>(
    document: &'a mut Document,
    path: &'p str,
) -> Option<(&'a mut Document, &'p str)> {
    let (parents, key) = split_path(path);
    let mut current = document;
    for segment in parents {
        current = current.get_mut(segment)?.as_object_mut()?;
    }
    Some((current, key))
}

fn split_path(path: &str) -> (Vec<&str>, &str) {
    match path.rsplit_once('.') {
        Some((parents, key)) => (parents.split('.').collect(), key),
        None => (Vec::new(), path),
    }
}
