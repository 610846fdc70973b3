//! The customer row type and its derived display values.
//!
//! Column names mirror the `clientes` table. A customer's owed balance is
//! never stored here; it is always recomputed from the transactions table
//! (see `Ledger::customer_balance`).

use crate::source::SearchableRow;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Two-letter Brazilian state code (UF), the only accepted values for the
/// `Estado` column.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[allow(clippy::upper_case_acronyms)]
pub enum StateCode {
    AC, AL, AP, AM, BA, CE, DF, ES, GO, MA, MT, MS, MG, PA, PB, PR,
    #[default]
    PE,
    PI, RJ, RN, RS, RO, RR, SC, SP, SE, TO,
}

serde_plain::derive_display_from_serialize!(StateCode);
serde_plain::derive_fromstr_from_deserialize!(StateCode);

/// A row from the `clientes` table.
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct Customer {
    #[sqlx(rename = "Id")]
    pub id: i64,
    #[sqlx(rename = "PrimeiroNome")]
    pub first_name: String,
    #[sqlx(rename = "Sobrenome")]
    pub last_name: String,
    #[sqlx(rename = "Apelido")]
    pub nickname: String,
    #[sqlx(rename = "Telefone")]
    pub phone: String,
    #[sqlx(rename = "Cidade")]
    pub city: String,
    #[sqlx(rename = "Bairro")]
    pub neighborhood: String,
    #[sqlx(rename = "Endereco")]
    pub address: String,
    #[sqlx(rename = "Estado")]
    pub state: String,
}

impl Customer {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }

    /// The list-of-values label shown in customer selectors. The nickname
    /// disambiguates customers with the same name; failing that, the
    /// neighborhood does.
    pub fn display_label(&self) -> String {
        if !self.nickname.is_empty() {
            format!("{} ({})", self.full_name(), self.nickname)
        } else if !self.neighborhood.is_empty() {
            format!("{}, {}", self.full_name(), self.neighborhood)
        } else {
            self.full_name()
        }
    }

    /// Display string combining city and neighborhood.
    pub fn locale(&self) -> String {
        match (self.city.is_empty(), self.neighborhood.is_empty()) {
            (false, false) => format!("{} - {}", self.city, self.neighborhood),
            (false, true) => self.city.clone(),
            (true, false) => self.neighborhood.clone(),
            (true, true) => String::new(),
        }
    }
}

impl SearchableRow for Customer {
    fn search_text(&self) -> String {
        format!("{} {} {}", self.first_name, self.last_name, self.nickname)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn customer() -> Customer {
        Customer {
            id: 1,
            first_name: "Ana".to_string(),
            last_name: "Souza".to_string(),
            nickname: String::new(),
            phone: String::new(),
            city: "Palmares".to_string(),
            neighborhood: "Centro".to_string(),
            address: String::new(),
            state: "PE".to_string(),
        }
    }

    #[test]
    fn test_state_code_round_trip() {
        assert_eq!(StateCode::from_str("PE").unwrap(), StateCode::PE);
        assert_eq!(StateCode::SP.to_string(), "SP");
        assert!(StateCode::from_str("XX").is_err());
        assert!(StateCode::from_str("pe").is_err());
    }

    #[test]
    fn test_display_label_prefers_nickname() {
        let mut c = customer();
        assert_eq!(c.display_label(), "Ana Souza, Centro");
        c.nickname = "Aninha".to_string();
        assert_eq!(c.display_label(), "Ana Souza (Aninha)");
        c.nickname.clear();
        c.neighborhood.clear();
        assert_eq!(c.display_label(), "Ana Souza");
    }

    #[test]
    fn test_locale() {
        let mut c = customer();
        assert_eq!(c.locale(), "Palmares - Centro");
        c.neighborhood.clear();
        assert_eq!(c.locale(), "Palmares");
    }

    #[test]
    fn test_search_text_is_names_only() {
        let mut c = customer();
        c.nickname = "Aninha".to_string();
        assert_eq!(c.search_text(), "Ana Souza Aninha");
    }
}
