//! Currency CLI
//!
//! Command-line interface for the Currency API.

use anyhow::Result;
use clap::{Parser, Subcommand};

use currency_client::CurrencyClient;

#[derive(Parser)]
#[command(name = "currency")]
#[command(author, version, about = "Currency API CLI client", long_about = None)]
struct Cli {
    /// Base URL of the Currency API
    #[arg(
        long,
        env = "CURRENCY_API_URL",
        default_value = "http://localhost:8080"
    )]
    api_url: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List all currencies
    List,
    /// Show one currency
    Get {
        /// Currency code (case-insensitive)
        code: String,
    },
    /// Create or replace a currency
    Create {
        code: String,
        /// Value of one unit in the base currency
        #[arg(long)]
        rate: f64,
        #[arg(long)]
        name: String,
        #[arg(long)]
        symbol: String,
    },
    /// Replace an existing currency
    Update {
        code: String,
        #[arg(long)]
        rate: f64,
        #[arg(long)]
        name: String,
        #[arg(long)]
        symbol: String,
    },
    /// Delete a currency
    Delete { code: String },
    /// Convert an amount between two currencies
    Convert {
        amount: f64,
        from: String,
        to: String,
    },
    /// Show the conversion history
    History,
    /// Check API health
    Health,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    let client = CurrencyClient::new(&cli.api_url);

    match cli.command {
        Commands::Health => {
            let healthy = client.health().await?;
            if healthy {
                println!("✓ API is healthy");
            } else {
                println!("✗ API is not healthy");
                std::process::exit(1);
            }
        }

        Commands::List => {
            let mut currencies: Vec<_> = client.list_currencies().await?.into_values().collect();
            currencies.sort_by(|a, b| a.code.cmp(&b.code));
            for currency in currencies {
                println!(
                    "{:<4} {:>4} {:>14.6}  {}",
                    currency.code, currency.symbol, currency.rate, currency.name
                );
            }
        }

        Commands::Get { code } => {
            let currency = client.get_currency(&code).await?;
            println!("{}", serde_json::to_string_pretty(&currency)?);
        }

        Commands::Create {
            code,
            rate,
            name,
            symbol,
        } => {
            let currency = client.create_currency(&code, rate, &name, &symbol).await?;
            println!("{}", serde_json::to_string_pretty(&currency)?);
        }

        Commands::Update {
            code,
            rate,
            name,
            symbol,
        } => {
            let currency = client.update_currency(&code, rate, &name, &symbol).await?;
            println!("{}", serde_json::to_string_pretty(&currency)?);
        }

        Commands::Delete { code } => {
            client.delete_currency(&code).await?;
            println!("✓ Currency {} deleted", code.to_uppercase());
        }

        Commands::Convert { amount, from, to } => {
            let conversion = client.convert(amount, &from, &to).await?;
            println!("{}", conversion);
        }

        Commands::History => {
            for conversion in client.list_conversions().await? {
                println!(
                    "{}  {}",
                    conversion.created_at().format("%Y-%m-%d %H:%M:%S"),
                    conversion
                );
            }
        }
    }

    Ok(())
}
