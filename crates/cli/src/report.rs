//! Human-readable output.

use std::io::{self, Write};

use contracts::{BroadcastSummary, Destination};
use observability::MetricsSummary;

const RULE: &str = "------------------------------------------------------------";

/// Numbered destination listing
pub fn write_destinations(out: &mut impl Write, destinations: &[Destination]) -> io::Result<()> {
    if destinations.is_empty() {
        writeln!(out, "No groups found!")?;
        return Ok(());
    }

    writeln!(out, "\nYour Groups/Channels ({} total):", destinations.len())?;
    writeln!(out, "{RULE}")?;
    for (i, destination) in destinations.iter().enumerate() {
        writeln!(out, "{}. {}", i + 1, destination.display_name)?;
        writeln!(out, "   ID: {}", destination.id)?;
        writeln!(out, "   Type: {}", destination.kind)?;
        writeln!(out, "{RULE}")?;
    }
    Ok(())
}

/// Final summary plus per-round lines
pub fn write_summary(
    out: &mut impl Write,
    summary: &BroadcastSummary,
    metrics: Option<&MetricsSummary>,
) -> io::Result<()> {
    writeln!(out, "\nFINAL SUMMARY:")?;
    for round in &summary.rounds {
        if round.catalog_failed {
            writeln!(out, "  Round {}: catalog unavailable, skipped", round.round)?;
            continue;
        }
        write!(
            out,
            "  Round {}: {} success, {} failed",
            round.round, round.sent, round.failed
        )?;
        if round.excluded > 0 {
            write!(out, ", {} excluded", round.excluded)?;
        }
        if round.interrupted {
            write!(out, ", {} not attempted", round.not_attempted)?;
        }
        writeln!(out)?;
    }
    writeln!(out, "{summary}")?;

    if let Some(metrics) = metrics {
        writeln!(out, "\n{metrics}")?;
    }
    Ok(())
}
