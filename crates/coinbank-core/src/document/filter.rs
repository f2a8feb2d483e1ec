//! Filter expressions for selecting documents.

use std::cmp::Ordering;

use serde_json::Value;

use super::{get_path, json_kind, validate_path, Document, DocumentId, ID_FIELD};
use crate::error::{CoinbankError, Result};

/// A predicate over documents: every clause must hold.
///
/// An empty filter matches every document.
///
/// ```
/// use coinbank_core::document::Filter;
/// use serde_json::json;
///
/// let filter = Filter::from_value(json!({"name": "foo", "amount": {"$gte": 0}})).unwrap();
/// assert!(!filter.is_empty());
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Filter {
    clauses: Vec<Clause>,
}

#[derive(Debug, Clone, PartialEq)]
struct Clause {
    path: String,
    condition: Condition,
}

#[derive(Debug, Clone, PartialEq)]
enum Condition {
    Eq(Value),
    Ne(Value),
    Gt(Value),
    Gte(Value),
    Lt(Value),
    Lte(Value),
    Exists(bool),
    In(Vec<Value>),
}

impl Filter {
    /// A filter matching every document.
    pub fn new() -> Self {
        Self::default()
    }

    /// A filter matching the single document with this identifier.
    pub fn by_id(id: DocumentId) -> Self {
        Self::new().eq(ID_FIELD, id)
    }

    /// Add an equality clause.
    pub fn eq(mut self, path: impl Into<String>, value: impl Into<Value>) -> Self {
        self.clauses.push(Clause {
            path: path.into(),
            condition: Condition::Eq(value.into()),
        });
        self
    }

    /// Parse a filter from a JSON object.
    ///
    /// Each key is a dotted field path. A value is either a literal to compare
    /// for equality, or an object of operators (`$eq`, `$ne`, `$gt`, `$gte`,
    /// `$lt`, `$lte`, `$exists`, `$in`).
    ///
    /// # Errors
    ///
    /// Returns `CoinbankError::InvalidInput` for non-object filters, bad field
    /// paths, unknown operators, or operator objects mixed with plain keys.
    pub fn from_value(value: Value) -> Result<Self> {
        let map = match value {
            Value::Object(map) => map,
            other => {
                return Err(CoinbankError::InvalidInput(format!(
                    "Filter must be a JSON object, got {}",
                    json_kind(&other)
                )))
            }
        };

        let mut clauses = Vec::new();
        for (path, value) in map {
            validate_path(&path)?;
            match value {
                Value::Object(ops) if ops.keys().any(|key| key.starts_with('$')) => {
                    if !ops.keys().all(|key| key.starts_with('$')) {
                        return Err(CoinbankError::InvalidInput(format!(
                            "Filter on '{}' mixes operators and fields",
                            path
                        )));
                    }
                    for (op, operand) in ops {
                        clauses.push(Clause {
                            path: path.clone(),
                            condition: Condition::parse(&op, operand)?,
                        });
                    }
                }
                literal => clauses.push(Clause {
                    path,
                    condition: Condition::Eq(literal),
                }),
            }
        }

        Ok(Self { clauses })
    }

    /// Parse a filter from JSON text.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let value: Value = serde_json::from_str(json)
            .map_err(|e| CoinbankError::InvalidInput(format!("Invalid filter JSON: {}", e)))?;
        Self::from_value(value)
    }

    pub fn is_empty(&self) -> bool {
        self.clauses.is_empty()
    }

    /// Check whether a document satisfies every clause.
    pub fn matches(&self, document: &Document) -> bool {
        self.clauses
            .iter()
            .all(|clause| clause.condition.holds(get_path(document, &clause.path)))
    }

    /// The identifier this filter pins, if it has an `_id` equality clause.
    ///
    /// Backends use this to turn a scan into a keyed lookup; the full filter
    /// must still be applied to the fetched document.
    pub fn id_hint(&self) -> Option<DocumentId> {
        self.clauses.iter().find_map(|clause| match &clause.condition {
            Condition::Eq(Value::String(value)) if clause.path == ID_FIELD => {
                DocumentId::parse_str(value).ok()
            }
            _ => None,
        })
    }
}

impl TryFrom<Value> for Filter {
    type Error = CoinbankError;

    fn try_from(value: Value) -> Result<Self> {
        Self::from_value(value)
    }
}

impl Condition {
    fn parse(op: &str, operand: Value) -> Result<Self> {
        let condition = match op {
            "$eq" => Condition::Eq(operand),
            "$ne" => Condition::Ne(operand),
            "$gt" => Condition::Gt(operand),
            "$gte" => Condition::Gte(operand),
            "$lt" => Condition::Lt(operand),
            "$lte" => Condition::Lte(operand),
            "$exists" => match operand {
                Value::Bool(flag) => Condition::Exists(flag),
                other => {
                    return Err(CoinbankError::InvalidInput(format!(
                        "$exists expects a boolean, got {}",
                        json_kind(&other)
                    )))
                }
            },
            "$in" => match operand {
                Value::Array(values) => Condition::In(values),
                other => {
                    return Err(CoinbankError::InvalidInput(format!(
                        "$in expects an array, got {}",
                        json_kind(&other)
                    )))
                }
            },
            unknown => {
                return Err(CoinbankError::InvalidInput(format!(
                    "Unknown filter operator '{}'",
                    unknown
                )))
            }
        };
        Ok(condition)
    }

    fn holds(&self, field: Option<&Value>) -> bool {
        match self {
            Condition::Eq(expected) => field.is_some_and(|value| values_equal(value, expected)),
            Condition::Ne(expected) => !field.is_some_and(|value| values_equal(value, expected)),
            Condition::Gt(bound) => compare(field, bound) == Some(Ordering::Greater),
            Condition::Gte(bound) => matches!(
                compare(field, bound),
                Some(Ordering::Greater | Ordering::Equal)
            ),
            Condition::Lt(bound) => compare(field, bound) == Some(Ordering::Less),
            Condition::Lte(bound) => matches!(
                compare(field, bound),
                Some(Ordering::Less | Ordering::Equal)
            ),
            Condition::Exists(expected) => field.is_some() == *expected,
            Condition::In(candidates) => field.is_some_and(|value| {
                candidates
                    .iter()
                    .any(|candidate| values_equal(value, candidate))
            }),
        }
    }
}

/// Equality where numbers compare by value, so `1` equals `1.0`, including
/// inside arrays and nested objects.
fn values_equal(left: &Value, right: &Value) -> bool {
    match (left, right) {
        (Value::Number(a), Value::Number(b)) => match (a.as_i64(), b.as_i64()) {
            (Some(a), Some(b)) => a == b,
            _ => a.as_f64() == b.as_f64(),
        },
        (Value::Array(a), Value::Array(b)) => {
            a.len() == b.len() && a.iter().zip(b).all(|(x, y)| values_equal(x, y))
        }
        (Value::Object(a), Value::Object(b)) => {
            a.len() == b.len()
                && a.iter().all(|(key, x)| b.get(key).is_some_and(|y| values_equal(x, y)))
        }
        _ => left == right,
    }
}

/// Order two values of the same kind; mixed kinds are incomparable.
fn compare(field: Option<&Value>, bound: &Value) -> Option<Ordering> {
    match (field?, bound) {
        (Value::Number(a), Value::Number(b)) => match (a.as_i64(), b.as_i64()) {
            (Some(a), Some(b)) => Some(a.cmp(&b)),
            _ => a.as_f64()?.partial_cmp(&b.as_f64()?),
        },
        (Value::String(a), Value::String(b)) => Some(a.cmp(b)),
        (Value::Bool(a), Value::Bool(b)) => Some(a.cmp(b)),
        _ => None,
    }
}
