//! Coffee Storefront - terminal client

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use clap::Parser;
use coffee_storefront::gateway::{AnyCatalog, InMemoryCatalog, LocationGateway, PgCatalog, TimeoutCatalog};
use coffee_storefront::shell::HELP;
use coffee_storefront::{App, Config, Money, Outcome, Storefront};
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "coffee-storefront")]
#[command(version, about = "Browse, favorite and order coffee from the terminal")]
struct Cli {
    /// JSON catalog to load instead of the database
    #[arg(long)]
    catalog: Option<PathBuf>,
    /// Quiet period before a search runs, in milliseconds
    #[arg(long)]
    debounce_ms: Option<u64>,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();
    let mut config = Config::from_env()?;
    if let Some(path) = cli.catalog { config.catalog_path = Some(path); config.database_url = None; }
    if let Some(ms) = cli.debounce_ms { config.search_debounce = Duration::from_millis(ms); }

    let catalog = match (&config.database_url, &config.catalog_path) {
        (Some(url), _) => {
            tracing::info!("Using PostgreSQL catalog");
            AnyCatalog::Postgres(PgCatalog::connect(url).await?)
        }
        (None, Some(path)) => {
            let catalog = InMemoryCatalog::load(path).await?;
            tracing::info!("Loaded {} coffees from {}", catalog.len(), path.display());
            AnyCatalog::Memory(catalog)
        }
        (None, None) => {
            tracing::info!("No catalog configured, using the house menu");
            AnyCatalog::Memory(InMemoryCatalog::seed())
        }
    };
    let catalog = Arc::new(TimeoutCatalog::new(catalog, config.request_timeout));

    let store = Storefront::new(Money::ngn(config.delivery_fee));
    let location = LocationGateway::new(config.device.clone());
    let mut app = App::new(store, catalog, location, config.search_debounce);

    println!("☕ Coffee Storefront\n{HELP}\n");
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        if line.trim().is_empty() { continue; }
        match app.execute(&line).await {
            Outcome::Show(view) => print!("{view}"),
            Outcome::Quit => break,
        }
    }
    tracing::info!("Goodbye");
    Ok(())
}
