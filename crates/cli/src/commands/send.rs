//! `send` command implementation.

use std::io;

use broadcaster::BroadcastRequest;
use tracing::info;

use crate::cli::SendArgs;
use crate::error::Result;
use crate::report::{write_destinations, write_summary};
use crate::session::Session;

/// Build the request from profile defaults and command-line overrides
pub fn build_request(
    defaults: &contracts::BroadcastDefaults,
    args: &SendArgs,
) -> Result<BroadcastRequest> {
    let mut defaults = defaults.clone();
    if let Some(rounds) = args.rounds {
        defaults.rounds = rounds;
    }
    if let Some(delay) = args.delay {
        defaults.inter_round_delay_secs = delay;
    }
    defaults.exclude.extend(args.exclude.iter().copied());

    Ok(BroadcastRequest::from_defaults(&defaults, args.message.clone())?)
}

/// Execute the `send` command
pub async fn run_send(session: &Session, args: &SendArgs) -> Result<()> {
    let request = build_request(&session.profile.broadcast, args)?;
    let mut engine = session.broadcaster();

    if args.dry_run {
        let plan = engine.plan(request.exclude()).await?;
        info!(
            accepted = plan.accepted.len(),
            skipped = plan.skipped.len(),
            "Dry run - nothing sent"
        );
        let mut out = io::stdout().lock();
        write_destinations(&mut out, &plan.accepted)?;
        if !plan.skipped.is_empty() {
            println!("\nExcluded ({}):", plan.skipped.len());
            for destination in &plan.skipped {
                println!("  - {destination}");
            }
        }
        println!(
            "\nWould send {} round(s), {}s apart.",
            request.rounds(),
            request.inter_round_delay().as_secs()
        );
        return Ok(());
    }

    println!(
        "\nStarting broadcast ({} rounds, {}s delay)...",
        request.rounds(),
        request.inter_round_delay().as_secs()
    );
    let summary = engine.broadcast(&request).await?;
    write_summary(&mut io::stdout().lock(), &summary, Some(&engine.metrics()))?;
    Ok(())
}
