use clap::{Args, Subcommand};
use tariff_app::context::AppContext;

#[derive(Debug, Args)]
pub(crate) struct ChannelsCommand {
    #[command(subcommand)]
    command: ChannelsSubcommand,
}

#[derive(Debug, Subcommand)]
enum ChannelsSubcommand {
    /// List channels with their markups
    List,

    /// Show the channel routed to a storefront subdomain
    Find(FindChannelArgs),
}

#[derive(Debug, Args)]
struct FindChannelArgs {
    /// Storefront subdomain
    #[arg(long)]
    subdomain: String,
}

pub(crate) async fn run(context: &AppContext, command: ChannelsCommand) -> Result<(), String> {
    match command.command {
        ChannelsSubcommand::List => {
            let channels = context
                .markups
                .list_channels_with_markups()
                .await
                .map_err(|error| format!("failed to list channels: {error}"))?;

            super::print_json(&channels)
        }
        ChannelsSubcommand::Find(args) => {
            let channel = context
                .markups
                .channel_by_subdomain(&args.subdomain)
                .await
                .map_err(|error| format!("failed to find channel: {error}"))?
                .ok_or_else(|| format!("no channel for subdomain {}", args.subdomain))?;

            super::print_json(&channel)
        }
    }
}
