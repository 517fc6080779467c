use std::{fs, io, path::Path};

use clap::{Parser, Subcommand};
use serde::Serialize;
use tariff_app::{
    config::{self, CatalogConfig, LoggingConfig},
    context::AppContext,
    observability,
};

mod channels;
mod discounts;
mod markup;
mod price;
mod products;
mod webhook;

#[derive(Debug, Parser)]
#[command(name = "tariff-app", about = "Tariff CLI", long_about = None)]
pub(crate) struct Cli {
    #[command(subcommand)]
    command: Commands,

    #[command(flatten)]
    catalog: CatalogConfig,

    #[command(flatten)]
    logging: LoggingConfig,
}

#[derive(Debug, Subcommand)]
enum Commands {
    Channels(channels::ChannelsCommand),
    Markup(markup::MarkupCommand),
    Discounts(discounts::DiscountsCommand),
    Products(products::ProductsCommand),
    Price(price::PriceCommand),
    Webhook(webhook::WebhookArgs),
}

impl Cli {
    pub(crate) fn load() -> Result<Self, clap::Error> {
        config::load_dotenv();

        Self::try_parse()
    }

    pub(crate) async fn run(self) -> Result<(), String> {
        observability::init(&self.logging)
            .map_err(|error| format!("failed to initialise logging: {error}"))?;

        // Validation needs no catalog.
        if let Commands::Discounts(command) = &self.command
            && let Some(args) = command.validate_args()
        {
            return discounts::validate(args);
        }

        let context = AppContext::from_config(&self.catalog)
            .map_err(|error| format!("failed to initialise: {error}"))?;

        match self.command {
            Commands::Channels(command) => channels::run(&context, command).await,
            Commands::Markup(command) => markup::run(&context, command).await,
            Commands::Discounts(command) => discounts::run(&context, command).await,
            Commands::Products(command) => products::run(&context, command).await,
            Commands::Price(command) => price::run(&context, command).await,
            Commands::Webhook(args) => webhook::run(&context, args).await,
        }
    }
}

/// Read a file, or stdin when the path is `-`.
fn read_input(path: &Path) -> Result<String, String> {
    if path == Path::new("-") {
        return io::read_to_string(io::stdin())
            .map_err(|error| format!("failed to read stdin: {error}"));
    }

    fs::read_to_string(path)
        .map_err(|error| format!("failed to read {}: {error}", path.display()))
}

fn print_json<T: Serialize>(value: &T) -> Result<(), String> {
    let text = serde_json::to_string_pretty(value)
        .map_err(|error| format!("failed to encode output: {error}"))?;

    println!("{text}");

    Ok(())
}
