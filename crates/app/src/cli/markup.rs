use clap::{Args, Subcommand};
use serde_json::json;
use tariff::markups::MarkupPercent;
use tariff_app::context::AppContext;

#[derive(Debug, Args)]
pub(crate) struct MarkupCommand {
    #[command(subcommand)]
    command: MarkupSubcommand,
}

#[derive(Debug, Subcommand)]
enum MarkupSubcommand {
    /// Show a channel's markup
    Get(GetMarkupArgs),

    /// Store a channel's markup
    Set(SetMarkupArgs),
}

#[derive(Debug, Args)]
struct GetMarkupArgs {
    /// Channel ID
    #[arg(long)]
    channel: String,
}

#[derive(Debug, Args)]
struct SetMarkupArgs {
    /// Channel ID
    #[arg(long)]
    channel: String,

    /// Markup percentage, 0 to 1000
    #[arg(long)]
    percent: MarkupPercent,
}

pub(crate) async fn run(context: &AppContext, command: MarkupCommand) -> Result<(), String> {
    let (channel, markup) = match command.command {
        MarkupSubcommand::Get(args) => {
            let markup = context
                .markups
                .get_channel_markup(&args.channel)
                .await
                .map_err(|error| format!("failed to read markup: {error}"))?;

            (args.channel, markup)
        }
        MarkupSubcommand::Set(args) => {
            let markup = context
                .markups
                .set_channel_markup(&args.channel, args.percent)
                .await
                .map_err(|error| format!("failed to store markup: {error}"))?;

            (args.channel, markup)
        }
    };

    super::print_json(&json!({ "channel_id": channel, "markup_percent": markup }))
}
