use std::path::PathBuf;

use clap::{Args, Subcommand};
use jiff::Timestamp;
use rust_decimal::Decimal;
use serde_json::{Value, json};
use tariff_app::{
    context::AppContext,
    prices::{PriceRequest, PricesServiceError},
};

#[derive(Debug, Args)]
pub(crate) struct PriceCommand {
    #[command(subcommand)]
    command: PriceSubcommand,
}

#[derive(Debug, Subcommand)]
enum PriceSubcommand {
    /// Calculate a product's final price in a channel
    Calculate(CalculatePriceArgs),

    /// Calculate final prices for a JSON list of requests
    Batch(BatchPriceArgs),
}

#[derive(Debug, Args)]
struct CalculatePriceArgs {
    /// Product ID
    #[arg(long)]
    product: String,

    /// Channel ID
    #[arg(long, required_unless_present = "subdomain", conflicts_with = "subdomain")]
    channel: Option<String>,

    /// Storefront subdomain identifying the channel
    #[arg(long)]
    subdomain: Option<String>,

    /// Price before markup and discount
    #[arg(long)]
    base_price: Decimal,

    /// Evaluate rules at this instant instead of now (RFC 3339)
    #[arg(long)]
    at: Option<Timestamp>,
}

#[derive(Debug, Args)]
struct BatchPriceArgs {
    /// JSON list of `{product_id, channel_id, base_price}`, `-` for stdin
    #[arg(long)]
    file: PathBuf,

    /// Evaluate rules at this instant instead of now (RFC 3339)
    #[arg(long)]
    at: Option<Timestamp>,
}

pub(crate) async fn run(context: &AppContext, command: PriceCommand) -> Result<(), String> {
    match command.command {
        PriceSubcommand::Calculate(args) => calculate(context, args).await,
        PriceSubcommand::Batch(args) => batch(context, args).await,
    }
}

async fn calculate(context: &AppContext, args: CalculatePriceArgs) -> Result<(), String> {
    let channel_id = match (args.channel, args.subdomain) {
        (Some(channel), _) => channel,
        (None, Some(subdomain)) => {
            context
                .markups
                .channel_by_subdomain(&subdomain)
                .await
                .map_err(|error| format!("failed to find channel: {error}"))?
                .ok_or_else(|| format!("no channel for subdomain {subdomain}"))?
                .id
        }
        (None, None) => return Err("either --channel or --subdomain is required".to_string()),
    };

    let request = PriceRequest {
        product_id: args.product,
        channel_id,
        base_price: args.base_price,
    };

    let calculation = context
        .prices
        .calculate_price(request, args.at.unwrap_or_else(Timestamp::now))
        .await
        .map_err(|error| describe(&error))?;

    super::print_json(&calculation)
}

async fn batch(context: &AppContext, args: BatchPriceArgs) -> Result<(), String> {
    let text = super::read_input(&args.file)?;

    let requests: Vec<PriceRequest> = serde_json::from_str(&text)
        .map_err(|error| format!("invalid price requests: {error}"))?;

    let results = context
        .prices
        .batch_calculate(requests, args.at.unwrap_or_else(Timestamp::now))
        .await;

    let output: Vec<Value> = results
        .into_iter()
        .map(|result| match result {
            Ok(calculation) => json!(calculation),
            Err(error) => json!({ "error": describe(&error) }),
        })
        .collect();

    super::print_json(&output)
}

fn describe(error: &PricesServiceError) -> String {
    let class = if error.is_bad_request() {
        "bad request"
    } else {
        "calculation failed"
    };

    match std::error::Error::source(error) {
        Some(source) => format!("{class}: {error}: {source}"),
        None => format!("{class}: {error}"),
    }
}
