//! Types that represent the core data model, such as `Customer`,
//! `Transaction` and `Amount`.
mod amount;
mod customer;
mod form;
mod stats;
mod transaction;

pub use amount::{Amount, AmountStatus, ParsedAmount, MAX_ALLOWED_CENTS};
pub use customer::{Customer, StateCode};
pub use form::{CustomerForm, FieldKind, FieldValue};
pub use stats::{DateGrouping, DebtorBalance, InactiveCustomer, PeriodBalance, RecentTransaction};
pub use transaction::Transaction;
