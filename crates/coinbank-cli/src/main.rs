//! Coinbank CLI - a tiny coin ledger for chores and allowances
//!
//! This is the command-line interface for Coinbank. It owns connection
//! bootstrapping and configuration, and forwards each command to the core
//! account store.

mod app;
mod cli;
mod config;
mod constants;
mod errors;
mod logging;
mod output;

use clap::Parser;

use coinbank_core::{
    AccountStore, CoinbankError, DocumentId, Filter, NewAccount, SqliteStore, Update,
};

use crate::app::{
    exit_unknown_account, open_accounts, parse_amount, parse_id, resolve_config_path,
    resolve_settings,
};
use crate::cli::{Cli, Commands};
use crate::config::{write_config, CoinbankConfig};
use crate::errors::CliError;

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    if let Err(err) = logging::init_tracing(cli.debug) {
        eprintln!("Warning: logging disabled: {:#}", err);
    }

    match run(&cli) {
        Ok(()) => Ok(()),
        Err(err) => match err.downcast_ref::<CoinbankError>().and_then(CliError::from_core) {
            Some(cli_err) => cli_err.exit(),
            None => Err(err),
        },
    }
}

fn run(cli: &Cli) -> anyhow::Result<()> {
    let settings = resolve_settings(cli)?;
    tracing::debug!(uri = %settings.uri, collection = %settings.collection, "resolved settings");

    match &cli.command {
        Commands::Init => {
            let config_path = resolve_config_path()?;
            // Opening creates the database and schema up front.
            open_accounts(&settings)?;
            write_config(
                &config_path,
                &CoinbankConfig::new(&settings.uri, &settings.collection),
            )?;
            if !cli.quiet {
                println!("Wrote config to {}", config_path.display());
                println!("Database: {}", settings.uri);
            }
        }
        Commands::Create(args) => {
            let amount = parse_amount(&args.amount).unwrap_or_else(|e| e.exit());
            let mut accounts = open_accounts(&settings)?;
            let mut account = NewAccount::new().with_amount(amount);
            if let Some(name) = &args.name {
                account = account.with_name(name);
            }
            let id = accounts.create_account(&account)?;
            if cli.quiet {
                println!("{}", id);
            } else {
                println!("Created account {}", id);
            }
        }
        Commands::Show(args) => {
            let filter = match (&args.id, &args.name, &args.filter) {
                (Some(id), _, _) => Filter::by_id(parse_id(id).unwrap_or_else(|e| e.exit())),
                (None, Some(name), _) => Filter::new().eq("name", name.as_str()),
                (None, None, Some(json)) => Filter::from_json_str(json)?,
                (None, None, None) => {
                    CliError::invalid_input("Provide --id, --name, or --filter").exit()
                }
            };

            let accounts = open_accounts(&settings)?;
            let Some(account) = accounts.read(&filter)? else {
                CliError::not_found(
                    "No account matches",
                    "Create one with: coinbank create --name <NAME>",
                )
                .exit()
            };

            if args.json {
                println!(
                    "{}",
                    serde_json::to_string_pretty(&output::account_json(&account))?
                );
            } else {
                output::print_account(&account, cli.quiet);
            }
        }
        Commands::List(args) => {
            let filter = match &args.filter {
                Some(json) => Filter::from_json_str(json)?,
                None => Filter::new(),
            };
            let accounts = open_accounts(&settings)?;
            let listed = accounts.list(&filter)?;

            if args.json {
                println!(
                    "{}",
                    serde_json::to_string_pretty(&output::accounts_json(&listed))?
                );
            } else if listed.is_empty() {
                if !cli.quiet {
                    println!("No accounts");
                }
            } else {
                output::print_account_lines(&listed);
            }
        }
        Commands::Update(args) => {
            let id = parse_id(&args.id).unwrap_or_else(|e| e.exit());
            let update = Update::from_json_str(&args.update)?;
            let mut accounts = open_accounts(&settings)?;
            let outcome = accounts.update(&id, &update)?;
            if !outcome.is_match() {
                exit_unknown_account(&id);
            }
            if !cli.quiet {
                if outcome.modified > 0 {
                    println!("Updated account {}", id);
                } else {
                    println!("Account {} already up to date", id);
                }
            }
        }
        Commands::Deposit(args) => {
            let id = parse_id(&args.id).unwrap_or_else(|e| e.exit());
            let amount = parse_amount(&args.amount).unwrap_or_else(|e| e.exit());
            let mut accounts = open_accounts(&settings)?;
            if !accounts.deposit(&id, amount)?.is_match() {
                exit_unknown_account(&id);
            }
            print_balance(&accounts, &id, cli.quiet)?;
        }
        Commands::Chore { id } => {
            let id = parse_id(id).unwrap_or_else(|e| e.exit());
            let mut accounts = open_accounts(&settings)?;
            if !accounts.reward_chore(&id)?.is_match() {
                exit_unknown_account(&id);
            }
            print_balance(&accounts, &id, cli.quiet)?;
        }
    }

    Ok(())
}

fn print_balance(
    accounts: &AccountStore<SqliteStore>,
    id: &DocumentId,
    quiet: bool,
) -> anyhow::Result<()> {
    let Some(account) = accounts.get(id)? else {
        exit_unknown_account(id);
    };
    if quiet {
        println!("{}", output::format_amount(account.amount));
    } else {
        println!("Balance: {}", output::format_amount(account.amount));
    }
    Ok(())
}
