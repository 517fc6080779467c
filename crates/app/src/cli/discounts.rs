use std::path::PathBuf;

use clap::{Args, Subcommand};
use jiff::Timestamp;
use serde::Deserialize;
use serde_json::json;
use tariff::discounts::{DiscountRuleInput, validate_rules};
use tariff_app::{catalog::DEFAULT_PAGE_SIZE, context::AppContext};

#[derive(Debug, Args)]
pub(crate) struct DiscountsCommand {
    #[command(subcommand)]
    command: DiscountsSubcommand,
}

impl DiscountsCommand {
    pub(crate) fn validate_args(&self) -> Option<&RulesFileArgs> {
        match &self.command {
            DiscountsSubcommand::Validate(args) => Some(args),
            _ => None,
        }
    }
}

#[derive(Debug, Subcommand)]
enum DiscountsSubcommand {
    /// Show a product's rules and the rule active now
    Show(ShowDiscountsArgs),

    /// Replace a product's rules
    Set(SetDiscountsArgs),

    /// Replace the rules of every product, or of those listed in a channel
    SetAll(SetAllDiscountsArgs),

    /// Check a rules file without writing anything
    Validate(RulesFileArgs),
}

#[derive(Debug, Args)]
struct ShowDiscountsArgs {
    /// Product ID
    #[arg(long)]
    product: String,

    /// Evaluate rules at this instant instead of now (RFC 3339)
    #[arg(long)]
    at: Option<Timestamp>,
}

#[derive(Debug, Args)]
pub(crate) struct RulesFileArgs {
    /// JSON rules file, `-` for stdin
    #[arg(long)]
    file: PathBuf,
}

#[derive(Debug, Args)]
struct SetDiscountsArgs {
    /// Product ID
    #[arg(long)]
    product: String,

    #[command(flatten)]
    rules: RulesFileArgs,
}

#[derive(Debug, Args)]
struct SetAllDiscountsArgs {
    /// Only products listed in this channel
    #[arg(long)]
    channel_slug: Option<String>,

    /// Maximum number of products
    #[arg(long, default_value_t = DEFAULT_PAGE_SIZE)]
    first: u32,

    #[command(flatten)]
    rules: RulesFileArgs,
}

/// A bare rule list, or a request body with a `discounts` list.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum RulesDocument {
    List(Vec<DiscountRuleInput>),
    Request { discounts: Vec<DiscountRuleInput> },
}

impl RulesFileArgs {
    fn read(&self) -> Result<Vec<DiscountRuleInput>, String> {
        let text = super::read_input(&self.file)?;

        let document: RulesDocument = serde_json::from_str(&text)
            .map_err(|error| format!("invalid rules file: {error}"))?;

        Ok(match document {
            RulesDocument::List(rules) | RulesDocument::Request { discounts: rules } => rules,
        })
    }
}

pub(crate) fn validate(args: &RulesFileArgs) -> Result<(), String> {
    let rules = validate_rules(&args.read()?).map_err(|errors| errors.messages.join("\n"))?;

    super::print_json(&json!({ "valid": true, "discounts_count": rules.len() }))
}

pub(crate) async fn run(context: &AppContext, command: DiscountsCommand) -> Result<(), String> {
    match command.command {
        DiscountsSubcommand::Show(args) => {
            let now = args.at.unwrap_or_else(Timestamp::now);

            let rules = context
                .discounts
                .get_discount_rules(&args.product)
                .await
                .map_err(|error| format!("failed to read discount rules: {error}"))?;

            let active = context
                .discounts
                .active_discount(&args.product, now)
                .await
                .map_err(|error| format!("failed to read discount rules: {error}"))?;

            super::print_json(&json!({
                "product_id": args.product,
                "current_time": now,
                "discounts": rules,
                "active_discount": active,
                "total_discounts": rules.len(),
            }))
        }
        DiscountsSubcommand::Set(args) => {
            let rules = context
                .discounts
                .set_discount_rules(&args.product, args.rules.read()?)
                .await
                .map_err(|error| format!("failed to store discount rules: {error}"))?;

            super::print_json(&json!({ "success": true, "discounts_count": rules.len() }))
        }
        DiscountsSubcommand::SetAll(args) => {
            let summary = context
                .discounts
                .set_discount_rules_for_all(args.rules.read()?, args.channel_slug, args.first)
                .await
                .map_err(|error| format!("failed to store discount rules: {error}"))?;

            super::print_json(&summary)
        }
        DiscountsSubcommand::Validate(args) => validate(&args),
    }
}
