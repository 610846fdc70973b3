//! Form field descriptors.
//!
//! Each field of a user-facing form is described by a `FieldKind` variant
//! carrying its own parse/validate/normalize strategy, resolved when the form
//! is constructed rather than inferred from the value at runtime.

use crate::error::LedgerError;
use crate::model::{Amount, AmountStatus, StateCode};
use crate::Result;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// The kind of a form field, with its validation strategy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldKind {
    /// Optional proper-cased text.
    Text,
    /// Proper-cased text that must not be blank.
    RequiredText,
    /// A two-letter uppercase Brazilian state code.
    StateCode,
    /// A currency amount in the user's decimal-comma notation.
    Currency,
}

/// A normalized field value, ready for storage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldValue {
    Text(String),
    Amount(Amount),
}

impl FieldValue {
    pub fn into_text(self) -> String {
        match self {
            FieldValue::Text(text) => text,
            FieldValue::Amount(amount) => amount.cents().to_string(),
        }
    }

    pub fn amount(&self) -> Option<Amount> {
        match self {
            FieldValue::Text(_) => None,
            FieldValue::Amount(amount) => Some(*amount),
        }
    }
}

impl FieldKind {
    pub fn is_required(&self) -> bool {
        matches!(
            self,
            FieldKind::RequiredText | FieldKind::StateCode | FieldKind::Currency
        )
    }

    /// Validates and normalizes raw user input for a field named `name`.
    /// Failures are `LedgerError::Validation` naming the field.
    pub fn normalize(&self, name: &str, raw: &str) -> Result<FieldValue> {
        match self {
            FieldKind::Text => Ok(FieldValue::Text(title_case(raw.trim()))),
            FieldKind::RequiredText => {
                let trimmed = raw.trim();
                if trimmed.is_empty() {
                    return Err(LedgerError::validation(format!(
                        "required field '{name}' must not be blank"
                    )));
                }
                Ok(FieldValue::Text(title_case(trimmed)))
            }
            FieldKind::StateCode => {
                let upper = raw.trim().to_uppercase();
                let code = StateCode::from_str(&upper).map_err(|_| {
                    LedgerError::Validation(format!(
                        "'{raw}' is not a valid state code for field '{name}'"
                    ))
                })?;
                Ok(FieldValue::Text(code.to_string()))
            }
            FieldKind::Currency => {
                let parsed = Amount::parse(raw);
                match parsed.status() {
                    AmountStatus::Valid => Ok(FieldValue::Amount(parsed.amount())),
                    AmountStatus::Empty => Err(LedgerError::validation(format!(
                        "required field '{name}' must not be blank"
                    ))),
                    AmountStatus::Invalid => Err(LedgerError::validation(format!(
                        "'{raw}' is not a valid amount for field '{name}'"
                    ))),
                }
            }
        }
    }
}

/// The raw user input of the create/edit customer form. `normalized()`
/// validates every field through its descriptor and produces the values the
/// store accepts; the raw form is left untouched so a failed submission can
/// be corrected.
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CustomerForm {
    pub first_name: String,
    pub last_name: String,
    pub nickname: String,
    pub phone: String,
    pub city: String,
    pub neighborhood: String,
    pub address: String,
    pub state: String,
}

impl CustomerForm {
    /// The field descriptors, in `clientes` column order.
    fn fields(&self) -> [(&'static str, FieldKind, &str); 8] {
        [
            ("PrimeiroNome", FieldKind::RequiredText, &self.first_name),
            ("Sobrenome", FieldKind::RequiredText, &self.last_name),
            ("Apelido", FieldKind::Text, &self.nickname),
            ("Telefone", FieldKind::Text, &self.phone),
            ("Cidade", FieldKind::RequiredText, &self.city),
            ("Bairro", FieldKind::Text, &self.neighborhood),
            ("Endereco", FieldKind::Text, &self.address),
            ("Estado", FieldKind::StateCode, &self.state),
        ]
    }

    /// Validates every field and returns the normalized form. The first
    /// failing field aborts with `LedgerError::Validation`.
    pub fn normalized(&self) -> Result<CustomerForm> {
        let mut values = Vec::with_capacity(8);
        for (name, kind, raw) in self.fields() {
            values.push(kind.normalize(name, raw)?.into_text());
        }
        let mut values = values.into_iter();
        let mut next = || values.next().unwrap_or_default();
        Ok(CustomerForm {
            first_name: next(),
            last_name: next(),
            nickname: next(),
            phone: next(),
            city: next(),
            neighborhood: next(),
            address: next(),
            state: next(),
        })
    }
}

/// Proper-cases a name: every whitespace-separated word starts uppercase,
/// the rest lowercased.
fn title_case(s: &str) -> String {
    s.split_whitespace()
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => {
                    first.to_uppercase().collect::<String>() + &chars.as_str().to_lowercase()
                }
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}
