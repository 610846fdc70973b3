//! Customer commands: add, edit, list and show.

use crate::args::{CustomerFieldArgs, ListArgs};
use crate::commands::{render_page, Out};
use crate::model::{Amount, Customer, CustomerForm, Transaction};
use crate::{Config, Ledger, Result};
use serde::Serialize;

/// A customer with their recomputed balance and transactions, the structured
/// output of `customer show`.
#[derive(Debug, Clone, Serialize)]
pub struct CustomerView {
    pub customer: Customer,
    pub balance: Amount,
    pub transactions: Vec<Transaction>,
}

/// Builds the raw form from CLI fields, falling back to the configured
/// default city and state when they were not given.
fn form_from_args(config: &Config, fields: &CustomerFieldArgs) -> CustomerForm {
    CustomerForm {
        first_name: fields.first_name().to_string(),
        last_name: fields.last_name().to_string(),
        nickname: fields.nickname().to_string(),
        phone: fields.phone().to_string(),
        city: fields
            .city()
            .unwrap_or_else(|| config.default_city())
            .to_string(),
        neighborhood: fields.neighborhood().to_string(),
        address: fields.address().to_string(),
        state: fields
            .state()
            .map(str::to_string)
            .unwrap_or_else(|| config.default_state().to_string()),
    }
}

/// Validates the fields and stores a new customer.
pub async fn customer_add(config: Config, fields: &CustomerFieldArgs) -> Result<Out<Customer>> {
    let form = form_from_args(&config, fields);
    let customer = Ledger::new(&config).create_customer(&form).await?;
    Ok(Out::new(
        format!("Created customer {}: {}", customer.id, customer.display_label()),
        customer,
    ))
}

/// Overwrites every field of an existing customer.
pub async fn customer_edit(
    config: Config,
    id: i64,
    fields: &CustomerFieldArgs,
) -> Result<Out<Customer>> {
    let form = form_from_args(&config, fields);
    let customer = Ledger::new(&config).update_customer(id, &form).await?;
    Ok(Out::new(
        format!("Updated customer {}: {}", customer.id, customer.display_label()),
        customer,
    ))
}

/// Lists customers with the search filter applied.
pub async fn customer_list(config: Config, list: &ListArgs) -> Result<Out<Vec<Customer>>> {
    let source = Ledger::new(&config).customers().await?;
    Ok(render_page(source, list, |c| {
        format!("{:>4}  {}  {}", c.id, c.display_label(), c.locale())
    }))
}

/// Shows one customer with their balance and first page of transactions.
pub async fn customer_show(config: Config, id: i64) -> Result<Out<CustomerView>> {
    let ledger = Ledger::new(&config);
    let customer = ledger.customer(id).await?;
    let balance = ledger.customer_balance(id).await?;
    let transactions = ledger
        .transactions(id)
        .await?
        .current_page()
        .into_iter()
        .cloned()
        .collect::<Vec<_>>();

    let mut message = format!(
        "{} ({})\nowes {}\n",
        customer.display_label(),
        customer.locale(),
        balance
    );
    for t in &transactions {
        message.push_str(&format!("{:>4}  {}\n", t.id, t.display_line()));
    }
    message.truncate(message.trim_end().len());

    Ok(Out::new(
        message,
        CustomerView {
            customer,
            balance,
            transactions,
        },
    ))
}
