use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use crate::application::LedgerService;
use crate::domain::{Account, AccountField, parse_amount};

/// OneBank - single-branch account ledger
#[derive(Parser)]
#[command(name = "onebank")]
#[command(about = "Open, fund and manage bank accounts stored in a local JSON file")]
#[command(version)]
pub struct Cli {
    /// Account data file path
    #[arg(short, long, default_value = "data.json")]
    pub data: PathBuf,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Open a new account
    Create {
        /// Account holder name
        name: String,

        /// Holder age (must be 18 or older)
        #[arg(long)]
        age: u32,

        /// Contact email
        #[arg(long)]
        email: String,

        /// 4-digit PIN
        #[arg(long)]
        pin: String,
    },

    /// Deposit money into an account (max 10000 per transaction)
    Deposit {
        /// Account number
        account: String,

        /// Account PIN
        #[arg(long)]
        pin: String,

        /// Amount to deposit
        #[arg(allow_hyphen_values = true)]
        amount: String,
    },

    /// Withdraw money from an account (max 10000 per transaction)
    Withdraw {
        /// Account number
        account: String,

        /// Account PIN
        #[arg(long)]
        pin: String,

        /// Amount to withdraw
        #[arg(allow_hyphen_values = true)]
        amount: String,
    },

    /// Show account details
    Show {
        /// Account number
        account: String,

        /// Account PIN
        #[arg(long)]
        pin: String,
    },

    /// Change one field of an account
    Update {
        /// Account number
        account: String,

        /// Account PIN
        #[arg(long)]
        pin: String,

        /// Field to change: name, age, email, pin
        #[arg(short, long)]
        field: String,

        /// New value
        value: String,
    },

    /// Permanently delete an account
    Delete {
        /// Account number
        account: String,

        /// Account PIN
        #[arg(long)]
        pin: String,

        /// Confirm the deletion
        #[arg(long)]
        yes: bool,
    },

    /// List all accounts (operator command: no account PIN is checked)
    List,

    /// Export accounts to CSV or JSON (operator command: no account PIN is checked)
    Export {
        /// Format: csv, json
        #[arg(short, long, default_value = "csv")]
        format: String,

        /// Output file (stdout if omitted)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

/// Install the stderr log subscriber. `RUST_LOG` wins over `--verbose`.
pub fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

impl Cli {
    pub async fn run(self) -> Result<()> {
        let service = LedgerService::open(&self.data)
            .await
            .with_context(|| format!("Failed to open ledger at {}", self.data.display()))?;

        match self.command {
            Commands::Create {
                name,
                age,
                email,
                pin,
            } => {
                let account = service.create_account(name, age, email, &pin).await?;
                println!("Account created. Keep your account number safe.");
                print_account(&account);
            }

            Commands::Deposit {
                account,
                pin,
                amount,
            } => {
                let amount = parse_amount(&amount).context("Invalid amount. Use a whole number like '250'")?;
                let account = service.deposit(&account, &pin, amount).await?;
                println!("Deposit successful.");
                print_account(&account);
            }

            Commands::Withdraw {
                account,
                pin,
                amount,
            } => {
                let amount = parse_amount(&amount).context("Invalid amount. Use a whole number like '250'")?;
                let account = service.withdraw(&account, &pin, amount).await?;
                println!("Withdrawal successful.");
                print_account(&account);
            }

            Commands::Show { account, pin } => {
                let account = service.find_account(&account, &pin).await?;
                print_account(&account);
            }

            Commands::Update {
                account,
                pin,
                field,
                value,
            } => {
                let field = AccountField::from_str(&field).with_context(|| {
                    format!("Invalid field '{}'. Valid fields: name, age, email, pin", field)
                })?;
                let account = service.update_field(&account, &pin, field, &value).await?;
                println!("Account updated ({}).", field);
                print_account(&account);
            }

            Commands::Delete { account, pin, yes } => {
                if !yes {
                    anyhow::bail!("Deletion is permanent. Re-run with --yes to confirm.");
                }
                let removed = service.delete_account(&account, &pin).await?;
                println!("Deleted account {}", removed.account_number);
            }

            Commands::List => {
                let accounts = service.list_accounts().await;
                if accounts.is_empty() {
                    println!("No accounts found.");
                } else {
                    println!("{:<16} {:<24} {:>12}", "ACCOUNT", "NAME", "BALANCE");
                    println!("{}", "-".repeat(54));
                    for account in &accounts {
                        println!(
                            "{:<16} {:<24} {:>12}",
                            account.account_number, account.name, account.balance
                        );
                    }
                }
            }

            Commands::Export { format, output } => {
                run_export_command(&service, &format, output.as_deref()).await?;
            }
        }

        Ok(())
    }
}

fn print_account(account: &Account) {
    println!("  Account number: {}", account.account_number);
    println!("  Name:           {}", account.name);
    println!("  Age:            {}", account.age);
    println!("  Email:          {}", account.email);
    println!("  PIN:            ****");
    println!("  Balance:        {}", account.balance);
}

async fn run_export_command(
    service: &LedgerService,
    format: &str,
    output: Option<&std::path::Path>,
) -> Result<()> {
    use crate::io::Exporter;
    use std::fs::File;
    use std::io::{Write, stdout};

    let exporter = Exporter::new(service);

    let writer: Box<dyn Write> = match output {
        Some(path) => {
            let file = File::create(path)
                .with_context(|| format!("Failed to create output file: {}", path.display()))?;
            Box::new(file)
        }
        None => Box::new(stdout()),
    };

    let count = match format {
        "csv" => exporter.export_accounts_csv(writer).await?,
        "json" => exporter.export_accounts_json(writer).await?.accounts.len(),
        _ => {
            anyhow::bail!("Invalid export format '{}'. Valid formats: csv, json", format);
        }
    };

    if output.is_some() {
        eprintln!("Exported {} accounts", count);
    }
    Ok(())
}
