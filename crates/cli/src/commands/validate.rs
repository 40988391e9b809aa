//! `validate` command implementation.

use std::path::Path;

use anyhow::Context;
use contracts::{BroadcastProfile, SinkType};
use serde::Serialize;
use tracing::info;

use crate::cli::{Cli, ValidateArgs};
use crate::session::{load_fixture, load_profile};

/// Validation result for JSON output
#[derive(Serialize)]
struct ValidationResult {
    valid: bool,
    config_path: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    warnings: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    summary: Option<ProfileSummary>,
}

#[derive(Serialize)]
struct ProfileSummary {
    session_name: String,
    rounds: u32,
    inter_round_delay_secs: u64,
    excluded: usize,
    has_default_message: bool,
    sink_count: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    fixture_dialogs: Option<usize>,
}

/// Execute the `validate` command
pub fn run_validate(cli: &Cli, args: &ValidateArgs) -> anyhow::Result<()> {
    info!(config = %cli.config.display(), "Validating configuration");

    let result = validate_profile(cli);

    if args.json {
        let json = serde_json::to_string_pretty(&result)
            .context("Failed to serialize validation result")?;
        println!("{}", json);
    } else {
        print_validation_result(&result);
    }

    if result.valid {
        Ok(())
    } else {
        anyhow::bail!("Configuration validation failed")
    }
}

fn validate_profile(cli: &Cli) -> ValidationResult {
    let config_path = cli.config.display().to_string();

    let profile = match load_profile(&cli.config, &cli.account) {
        Ok(profile) => profile,
        Err(e) => return invalid(config_path, e.to_string()),
    };

    let fixture_dialogs = match cli.fixture.as_deref().map(check_fixture).transpose() {
        Ok(count) => count,
        Err(e) => return invalid(config_path, e),
    };

    let warnings = collect_warnings(&profile);
    ValidationResult {
        valid: true,
        config_path,
        error: None,
        warnings: (!warnings.is_empty()).then_some(warnings),
        summary: Some(ProfileSummary {
            session_name: profile.account.session_name.clone(),
            rounds: profile.broadcast.rounds,
            inter_round_delay_secs: profile.broadcast.inter_round_delay_secs,
            excluded: profile.broadcast.exclude.len(),
            has_default_message: profile.broadcast.message.is_some(),
            sink_count: profile.sinks.len(),
            fixture_dialogs,
        }),
    }
}

fn check_fixture(path: &Path) -> Result<usize, String> {
    load_fixture(Some(path))
        .map(|fixture| fixture.dialogs.len())
        .map_err(|e| format!("fixture {}: {e}", path.display()))
}

fn invalid(config_path: String, error: String) -> ValidationResult {
    ValidationResult {
        valid: false,
        config_path,
        error: Some(error),
        warnings: None,
        summary: None,
    }
}

/// Collect configuration warnings (non-fatal issues)
fn collect_warnings(profile: &BroadcastProfile) -> Vec<String> {
    let mut warnings = Vec::new();

    if profile.sinks.is_empty() {
        warnings.push("No sinks configured - broadcast events are not recorded".to_string());
    } else if profile.sinks.iter().all(|s| s.sink_type == SinkType::Memory) {
        warnings.push("Only memory sinks configured - events are lost on exit".to_string());
    }

    if profile.broadcast.message.is_none() {
        warnings.push("broadcast.message is not set - `send` needs --message".to_string());
    }

    if profile.broadcast.rounds > 1 && profile.broadcast.inter_round_delay_secs == 0 {
        warnings.push("Multiple rounds with no delay between them".to_string());
    }

    warnings
}

fn print_validation_result(result: &ValidationResult) {
    if result.valid {
        println!("✓ Configuration is valid: {}", result.config_path);

        if let Some(ref summary) = result.summary {
            println!("\n  Session: {}", summary.session_name);
            println!("  Rounds: {}", summary.rounds);
            println!("  Delay between rounds: {}s", summary.inter_round_delay_secs);
            println!("  Excluded ids: {}", summary.excluded);
            println!("  Sinks: {}", summary.sink_count);
            if let Some(dialogs) = summary.fixture_dialogs {
                println!("  Fixture dialogs: {}", dialogs);
            }
        }

        if let Some(ref warnings) = result.warnings {
            println!("\n⚠ Warnings:");
            for warning in warnings {
                println!("  - {}", warning);
            }
        }
    } else {
        println!("✗ Configuration is invalid: {}", result.config_path);
        if let Some(ref error) = result.error {
            println!("\n  Error: {}", error);
        }
    }
}
