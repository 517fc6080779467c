use std::path::PathBuf;

use clap::Args;
use jiff::Timestamp;
use tariff_app::{
    context::AppContext,
    webhooks::{WebhookKind, WebhookPayload},
};

#[derive(Debug, Args)]
pub(crate) struct WebhookArgs {
    /// Event the payload is delivered as
    #[arg(long, value_enum)]
    kind: WebhookKind,

    /// JSON webhook payload, `-` for stdin
    #[arg(long)]
    payload: PathBuf,
}

pub(crate) async fn run(context: &AppContext, args: WebhookArgs) -> Result<(), String> {
    let text = super::read_input(&args.payload)?;

    let payload: WebhookPayload = serde_json::from_str(&text)
        .map_err(|error| format!("Invalid webhook payload: {error}"))?;

    let outcome = context
        .webhooks
        .handle(args.kind, &payload, Timestamp::now())
        .await
        .map_err(|error| error.to_string())?;

    super::print_json(&outcome)
}
