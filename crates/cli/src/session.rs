//! Profile loading, provider session and event bus lifecycle.

use std::path::Path;

use broadcaster::Broadcaster;
use catalog::{MockChatProvider, MockConfig};
use config_loader::ConfigLoader;
use contracts::{BroadcastProfile, ChatProvider};
use dispatcher::TokioPacer;
use events::{create_event_bus, EventBus};
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use crate::cli::{AccountOverrides, Cli};
use crate::error::{CliError, Result};

/// Load the profile, apply account overrides and validate
pub fn load_profile(path: &Path, overrides: &AccountOverrides) -> Result<BroadcastProfile> {
    if !path.exists() {
        return Err(CliError::config_not_found(path.display().to_string()));
    }

    let mut profile = ConfigLoader::parse_from_path(path)?;
    apply_overrides(&mut profile, overrides);
    config_loader::validate(&profile)?;

    info!(
        config = %path.display(),
        session = %profile.account.session_name,
        sinks = profile.sinks.len(),
        "Profile loaded"
    );
    Ok(profile)
}

fn apply_overrides(profile: &mut BroadcastProfile, overrides: &AccountOverrides) {
    if let Some(api_id) = overrides.api_id {
        profile.account.api_id = api_id;
    }
    if let Some(api_hash) = &overrides.api_hash {
        profile.account.api_hash = api_hash.clone();
    }
    if let Some(phone) = &overrides.phone {
        profile.account.phone_number = phone.clone();
    }
}

/// Load the chat provider fixture
pub fn load_fixture(path: Option<&Path>) -> Result<MockConfig> {
    let path = path.ok_or(CliError::ProviderMissing)?;
    let fixture: MockConfig = ConfigLoader::load_document(path)?;
    info!(
        fixture = %path.display(),
        dialogs = fixture.dialogs.len(),
        scripts = fixture.scripts.len(),
        "Provider fixture loaded"
    );
    Ok(fixture)
}

/// A connected provider plus the event bus for one CLI invocation
pub struct Session {
    pub profile: BroadcastProfile,
    pub provider: MockChatProvider,
    pub events: EventBus,
    pub cancel: CancellationToken,
}

impl Session {
    /// Load everything and connect
    pub async fn open(cli: &Cli, cancel: CancellationToken) -> Result<Self> {
        let profile = load_profile(&cli.config, &cli.account)?;
        let fixture = load_fixture(cli.fixture.as_deref())?;
        let events = create_event_bus(&profile.sinks)?;

        let mut provider = MockChatProvider::new(fixture);
        info!(phone = %profile.account.phone_number, "Connecting...");
        if let Err(e) = provider.connect(&profile.account).await {
            events.shutdown().await;
            return Err(CliError::Connect(e));
        }
        info!("Session connected");

        Ok(Self {
            profile,
            provider,
            events,
            cancel,
        })
    }

    /// Engine bound to this session, real-time pacing
    pub fn broadcaster(&self) -> Broadcaster<'_, MockChatProvider, TokioPacer> {
        Broadcaster::new(&self.provider, TokioPacer, &self.events)
            .with_cancellation(self.cancel.clone())
            .with_catalog_policy(self.profile.broadcast.on_catalog_error)
    }

    /// Disconnect and drain the event sinks
    pub async fn close(mut self) {
        if let Err(e) = self.provider.disconnect().await {
            warn!(error = %e, "Disconnect failed");
        }
        for (name, metrics) in self.events.metrics() {
            if metrics.dropped_count > 0 {
                warn!(sink = %name, dropped = metrics.dropped_count, "Sink dropped events");
            }
        }
        self.events.shutdown().await;
        info!("Session closed");
    }
}

/// Exit status used when a second signal forces the process down
pub const FORCED_EXIT_CODE: i32 = 130;

/// Cancel `token` on Ctrl+C or SIGTERM; a second signal exits immediately
pub fn spawn_shutdown_listener(token: CancellationToken) {
    tokio::spawn(async move {
        shutdown_signal().await;
        warn!("Received shutdown signal, finishing current send (signal again to force exit)...");
        escalate(token, shutdown_signal()).await;
        warn!("Second shutdown signal, exiting now");
        std::process::exit(FORCED_EXIT_CODE);
    });
}

/// Cancel `token`, then wait for `second` before returning
async fn escalate(token: CancellationToken, second: impl std::future::Future<Output = ()>) {
    token.cancel();
    second.await;
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                warn!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
