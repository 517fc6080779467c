use clap::{Args, Subcommand};
use jiff::Timestamp;
use tariff_app::{catalog::DEFAULT_PAGE_SIZE, context::AppContext};

#[derive(Debug, Args)]
pub(crate) struct ProductsCommand {
    #[command(subcommand)]
    command: ProductsSubcommand,
}

#[derive(Debug, Subcommand)]
enum ProductsSubcommand {
    /// List products with their discount rules and the rule active now
    List(ListProductsArgs),
}

#[derive(Debug, Args)]
struct ListProductsArgs {
    /// Only products listed in this channel
    #[arg(long, conflicts_with = "subdomain")]
    channel_slug: Option<String>,

    /// Only products listed in the channel routed to this subdomain
    #[arg(long)]
    subdomain: Option<String>,

    /// Maximum number of products
    #[arg(long, default_value_t = DEFAULT_PAGE_SIZE)]
    first: u32,

    /// Evaluate rules at this instant instead of now (RFC 3339)
    #[arg(long)]
    at: Option<Timestamp>,
}

pub(crate) async fn run(context: &AppContext, command: ProductsCommand) -> Result<(), String> {
    let ProductsSubcommand::List(args) = command.command;

    let channel_slug = match args.subdomain {
        Some(subdomain) => Some(
            context
                .markups
                .channel_by_subdomain(&subdomain)
                .await
                .map_err(|error| format!("failed to find channel: {error}"))?
                .ok_or_else(|| format!("no channel for subdomain {subdomain}"))?
                .slug,
        ),
        None => args.channel_slug,
    };

    let products = context
        .discounts
        .list_products_with_discounts(
            channel_slug,
            args.first,
            args.at.unwrap_or_else(Timestamp::now),
        )
        .await
        .map_err(|error| format!("failed to list products: {error}"))?;

    super::print_json(&products)
}
