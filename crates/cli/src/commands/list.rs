//! `list` command implementation.

use std::io;

use tracing::info;

use crate::cli::ListArgs;
use crate::error::Result;
use crate::report::write_destinations;
use crate::session::Session;

/// Execute the `list` command
pub async fn run_list(session: &Session, args: &ListArgs) -> Result<()> {
    let destinations = session.broadcaster().list_destinations().await?;
    info!(destinations = destinations.len(), "Destinations resolved");

    if args.json {
        let json = serde_json::to_string_pretty(&destinations).map_err(io::Error::other)?;
        println!("{json}");
    } else {
        write_destinations(&mut io::stdout().lock(), &destinations)?;
    }
    Ok(())
}
