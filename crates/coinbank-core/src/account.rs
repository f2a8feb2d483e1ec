//! Account data model.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Number, Value};

use crate::document::{Document, DocumentId, ID_FIELD};
use crate::error::{CoinbankError, Result};

/// Coins credited for completing a hard chore.
pub const HARD_CHORE_REWARD: i64 = 50;

/// Field holding an account's balance.
pub const AMOUNT_FIELD: &str = "amount";

/// Field holding an account's display name.
pub const NAME_FIELD: &str = "name";

/// A stored account.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Account {
    /// Store-assigned identifier
    #[serde(rename = "_id")]
    pub id: DocumentId,

    /// Optional display name
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    /// Balance; missing or null on disk means zero
    #[serde(default, deserialize_with = "null_as_zero")]
    pub amount: f64,
}

fn null_as_zero<'de, D>(deserializer: D) -> std::result::Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<f64>::deserialize(deserializer)?.unwrap_or_default())
}

impl TryFrom<Document> for Account {
    type Error = CoinbankError;

    fn try_from(document: Document) -> Result<Self> {
        if !document.contains_key(ID_FIELD) {
            return Err(CoinbankError::Validation(
                "Account document has no _id".to_string(),
            ));
        }
        serde_json::from_value(Value::Object(document))
            .map_err(|e| CoinbankError::Validation(format!("Not an account document: {}", e)))
    }
}

/// Builder for creating new accounts.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NewAccount {
    pub name: Option<String>,
    pub amount: f64,
}

impl NewAccount {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn with_amount(mut self, amount: f64) -> Self {
        self.amount = amount;
        self
    }

    /// Build the document to insert.
    ///
    /// # Errors
    ///
    /// Returns `CoinbankError::InvalidInput` if the amount is not finite.
    pub fn to_document(&self) -> Result<Document> {
        let mut document = Document::new();
        if let Some(name) = &self.name {
            document.insert(NAME_FIELD.to_string(), Value::String(name.clone()));
        }
        document.insert(
            AMOUNT_FIELD.to_string(),
            Value::Number(amount_number(self.amount)?),
        );
        Ok(document)
    }
}

/// Encode an amount as JSON, keeping whole numbers as integers.
pub fn amount_number(amount: f64) -> Result<Number> {
    if !amount.is_finite() {
        return Err(CoinbankError::InvalidInput(format!(
            "Amount must be a finite number, got {}",
            amount
        )));
    }
    if amount.fract() == 0.0 && amount.abs() < i64::MAX as f64 {
        return Ok(Number::from(amount as i64));
    }
    Number::from_f64(amount)
        .ok_or_else(|| CoinbankError::InvalidInput(format!("Invalid amount {}", amount)))
}
