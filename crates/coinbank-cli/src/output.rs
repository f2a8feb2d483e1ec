//! Output formatting helpers for the CLI.

use coinbank_core::Account;

/// Render an amount without a trailing `.0` for whole numbers.
pub fn format_amount(amount: f64) -> String {
    if amount.fract() == 0.0 && amount.abs() < 1e15 {
        format!("{:.0}", amount)
    } else {
        amount.to_string()
    }
}

/// Convert an account to JSON for output.
pub fn account_json(account: &Account) -> serde_json::Value {
    serde_json::json!({
        "id": account.id,
        "name": account.name,
        "amount": account.amount,
    })
}

/// Convert multiple accounts to a JSON array for output.
pub fn accounts_json(accounts: &[Account]) -> Vec<serde_json::Value> {
    accounts.iter().map(account_json).collect()
}

/// Print a single account in human-readable format.
pub fn print_account(account: &Account, quiet: bool) {
    if quiet {
        println!("{}", format_amount(account.amount));
        return;
    }
    println!("ID: {}", account.id);
    println!("Name: {}", account.name.as_deref().unwrap_or("-"));
    println!("Amount: {}", format_amount(account.amount));
}

/// Print one line per account.
pub fn print_account_lines(accounts: &[Account]) {
    for account in accounts {
        println!(
            "{}  {}  {}",
            account.id,
            format_amount(account.amount),
            account.name.as_deref().unwrap_or("-")
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use coinbank_core::DocumentId;

    #[test]
    fn test_format_amount() {
        assert_eq!(format_amount(50.0), "50");
        assert_eq!(format_amount(-3.0), "-3");
        assert_eq!(format_amount(2.5), "2.5");
    }

    #[test]
    fn test_account_json() {
        let id = DocumentId::generate();
        let account = Account {
            id,
            name: Some("foo".to_string()),
            amount: 1.0,
        };
        let value = account_json(&account);
        assert_eq!(value["id"], serde_json::json!(id.to_string()));
        assert_eq!(value["name"], "foo");
        assert_eq!(value["amount"], 1.0);
    }
}
