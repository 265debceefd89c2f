// backend/services/account/ledger-cli/src/main.rs

use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use clap::{Parser, Subcommand};

// Application
use account::application::transfer::{TransferCommand, TransferUseCase};
use account::domain::entities::Account;
use account::domain::repositories::AccountRepository;
use account::domain::value_objects::Money;

// Infrastructure
use account::infrastructure::postgres::repositories::PostgresAccountRepository;

// Shared Kernel
use shared_kernel::domain::transaction::{TransactionContext, UnitOfWork};
use shared_kernel::domain::value_objects::AccountId;
use shared_kernel::errors::{internal_err, AppResult};
use shared_kernel::infrastructure::bootstrap::init_tracing;
use shared_kernel::infrastructure::postgres::factories::PostgresContext;
use shared_kernel::infrastructure::postgres::utils::run_postgres_migrations;

#[derive(Parser, Debug)]
#[command(name = "ledger", version, about = "Comptes et virements sur Postgres (configuration via LEDGER_DB_*)")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Applique les migrations de la table `accounts`
    Migrate {
        #[arg(long, default_value = "crates/account/migrations/postgres")]
        path: PathBuf,
    },
    /// Ouvre un compte avec un solde initial
    Open {
        id: AccountId,
        #[arg(allow_negative_numbers = true)]
        balance: i64,
    },
    /// Affiche un compte (JSON)
    Show { id: AccountId },
    /// Vire `amount` de `from` vers `to` dans une seule transaction
    Transfer {
        from: AccountId,
        to: AccountId,
        #[arg(allow_negative_numbers = true)]
        amount: i64,
    },
    /// Supprime un compte (sans effet s'il n'existe pas)
    Close { id: AccountId },
}

#[tokio::main]
async fn main() -> ExitCode {
    init_tracing("info");
    let cli = Cli::parse();

    match run(cli.command).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(error) => {
            let rendered = serde_json::to_string_pretty(&error).unwrap_or_else(|_| error.to_string());
            eprintln!("{}", rendered);
            ExitCode::FAILURE
        }
    }
}

async fn run(command: Command) -> AppResult<()> {
    // --- 1. INITIALISATION DU POOL ---
    let pg_ctx = PostgresContext::builder()?.build().await?;

    // --- 2. REPOSITORIES & TRANSACTIONS ---
    let provider = pg_ctx.connection_provider();
    let account_repo = Arc::new(PostgresAccountRepository::new(provider.clone()));
    let tx_manager = Arc::new(UnitOfWork::new(provider));

    // Hors unité de travail : chaque opération emprunte sa propre connexion
    let mut ctx = TransactionContext::new();

    match command {
        Command::Migrate { path } => {
            run_postgres_migrations(&pg_ctx.pool(), &path).await?;
            println!("✅ Postgres migrations completed.");
        }
        Command::Open { id, balance } => {
            let account = Account::new(id, Money::new(balance));
            account_repo.insert(&mut ctx, &account).await?;
            print_json(&account)?;
        }
        Command::Show { id } => {
            let account = account_repo.find_by_id(&mut ctx, &id).await?;
            print_json(&account)?;
        }
        Command::Transfer { from, to, amount } => {
            let use_case = TransferUseCase::new(account_repo.clone(), tx_manager);
            use_case
                .execute(TransferCommand {
                    from: from.clone(),
                    to: to.clone(),
                    amount: Money::new(amount),
                })
                .await?;

            for id in [from, to] {
                print_json(&account_repo.find_by_id(&mut ctx, &id).await?)?;
            }
        }
        Command::Close { id } => {
            account_repo.delete(&mut ctx, &id).await?;
            tracing::info!(account_id = %id, "🗑️ Account closed");
        }
    }

    Ok(())
}

fn print_json(account: &Account) -> AppResult<()> {
    let json = serde_json::to_string_pretty(account)
        .map_err(|e| internal_err(format!("Serialization failed: {}", e)))?;
    println!("{}", json);
    Ok(())
}
