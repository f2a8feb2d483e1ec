use clap::{ArgGroup, Args, Parser, Subcommand};

use coinbank_core::VERSION;

/// Coinbank - a tiny coin ledger for chores and allowances
#[derive(Parser)]
#[command(name = "coinbank")]
#[command(author, version = VERSION, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Database connection URI (sqlite://PATH, sqlite::memory:, or a path)
    #[arg(long, global = true, env = "COINBANK_DB_URI")]
    pub db: Option<String>,

    /// Collection holding the accounts
    #[arg(long, global = true, env = "COINBANK_COLLECTION")]
    pub collection: Option<String>,

    #[command(subcommand)]
    pub command: Commands,

    /// Quiet mode (minimal output)
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Enable debug logging
    #[arg(long, global = true)]
    pub debug: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Write a config file pointing at a database
    Init,

    /// Create a new account
    Create(CreateArgs),

    /// Show the first account matching an id, name, or filter
    Show(ShowArgs),

    /// List accounts
    List(ListArgs),

    /// Apply a raw update expression to an account
    Update(UpdateArgs),

    /// Add coins to an account
    Deposit(DepositArgs),

    /// Credit the reward for a hard chore
    Chore {
        /// Account ID
        #[arg(value_name = "ID")]
        id: String,
    },
}

/// Arguments for the `create` command
#[derive(Args)]
pub struct CreateArgs {
    /// Account name
    #[arg(long)]
    pub name: Option<String>,

    /// Opening balance
    #[arg(long, default_value = "0", allow_hyphen_values = true)]
    pub amount: String,
}

/// Arguments for the `show` command
#[derive(Args)]
#[command(group(ArgGroup::new("selector").required(true).args(["id", "name", "filter"])))]
pub struct ShowArgs {
    /// Account ID
    #[arg(long)]
    pub id: Option<String>,

    /// Account name
    #[arg(long)]
    pub name: Option<String>,

    /// Filter expression as JSON, e.g. '{"amount": {"$gte": 10}}'
    #[arg(long)]
    pub filter: Option<String>,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

/// Arguments for the `list` command
#[derive(Args)]
pub struct ListArgs {
    /// Filter expression as JSON
    #[arg(long)]
    pub filter: Option<String>,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

/// Arguments for the `update` command
#[derive(Args)]
pub struct UpdateArgs {
    /// Account ID
    #[arg(value_name = "ID")]
    pub id: String,

    /// Update expression as JSON, e.g. '{"$inc": {"amount": 1}}'
    #[arg(long)]
    pub update: String,
}

/// Arguments for the `deposit` command
#[derive(Args)]
pub struct DepositArgs {
    /// Account ID
    #[arg(value_name = "ID")]
    pub id: String,

    /// Amount to add (negative to withdraw)
    #[arg(value_name = "AMOUNT", allow_hyphen_values = true)]
    pub amount: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_show_requires_a_selector() {
        assert!(Cli::try_parse_from(["coinbank", "show"]).is_err());
        assert!(Cli::try_parse_from(["coinbank", "show", "--name", "foo"]).is_ok());
    }

    #[test]
    fn test_deposit_accepts_negative_amounts() {
        let cli = Cli::try_parse_from(["coinbank", "deposit", "abc", "-5"]).unwrap();
        match cli.command {
            Commands::Deposit(args) => assert_eq!(args.amount, "-5"),
            _ => panic!("expected deposit"),
        }
    }
}
