//! The dispatch loop.
//!
//! ```rust,ignore
//! use herald_runtime::{HeraldRuntime, InboundUpdate};
//!
//! let runtime = HeraldRuntime::builder()
//!     .config_file("herald.toml")
//!     .library(library)
//!     .build()?;
//!
//! let (tx, rx) = tokio::sync::mpsc::channel(64);
//! // Feed `tx` from the webhook or polling side.
//! let stats = runtime.run_until_signal(rx).await;
//! ```

use std::path::Path;
use std::sync::Arc;

use herald_core::Update;
use herald_framework::{CommandLibrary, DispatchOutcome, NotificationSink, TracingSink};
use tokio::signal;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::bots::BotsManager;
use crate::config::{ConfigLoader, HeraldConfig};
use crate::error::RuntimeResult;
use crate::logging;

/// An update waiting to be dispatched, optionally addressed to a named bot.
#[derive(Debug, Clone)]
pub struct InboundUpdate {
    pub bot: Option<String>,
    pub update: Update,
}

impl InboundUpdate {
    /// An update for the default bot.
    pub fn new(update: Update) -> Self {
        Self { bot: None, update }
    }

    pub fn for_bot(bot: impl Into<String>, update: Update) -> Self {
        Self {
            bot: Some(bot.into()),
            update,
        }
    }
}

/// Counters collected by [`HeraldRuntime::run`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunStats {
    /// Updates taken off the channel.
    pub received: u64,
    /// Commands whose handler completed.
    pub succeeded: u64,
    /// Commands that failed in binding or in the handler.
    pub failed: u64,
    /// Commands with no registered handler.
    pub not_found: u64,
    /// Updates without a command for this bot.
    pub ignored: u64,
    /// Malformed updates and updates for unknown bots.
    pub rejected: u64,
}

impl RunStats {
    fn record(&mut self, outcome: &RuntimeResult<DispatchOutcome>) {
        match outcome {
            Ok(DispatchOutcome::Succeeded { .. }) => self.succeeded += 1,
            Ok(DispatchOutcome::Failed { .. }) => self.failed += 1,
            Ok(DispatchOutcome::NotFound { .. }) => self.not_found += 1,
            Ok(DispatchOutcome::NoCommand | DispatchOutcome::NotAddressed { .. }) => {
                self.ignored += 1
            }
            Ok(DispatchOutcome::Malformed(_)) | Err(_) => self.rejected += 1,
        }
    }
}

/// Owns the bots and feeds updates to their dispatchers, one at a time.
#[derive(Debug)]
pub struct HeraldRuntime {
    config: HeraldConfig,
    bots: BotsManager,
}

impl HeraldRuntime {
    pub fn builder() -> RuntimeBuilder {
        RuntimeBuilder::new()
    }

    /// Builds a runtime whose notifications are logged with [`TracingSink`].
    pub fn from_config(config: HeraldConfig, library: &CommandLibrary) -> RuntimeResult<Self> {
        Self::with_sink(config, library, Arc::new(TracingSink))
    }

    pub fn with_sink(
        config: HeraldConfig,
        library: &CommandLibrary,
        sink: Arc<dyn NotificationSink>,
    ) -> RuntimeResult<Self> {
        let bots = BotsManager::from_config(&config, library, sink)?;
        info!(bots = bots.len(), "Runtime initialized from configuration");
        Ok(Self { config, bots })
    }

    pub fn config(&self) -> &HeraldConfig {
        &self.config
    }

    pub fn bots(&self) -> &BotsManager {
        &self.bots
    }

    pub fn bots_mut(&mut self) -> &mut BotsManager {
        &mut self.bots
    }

    /// Dispatches one update to `bot`, or to the default bot.
    ///
    /// Handler failures are reported through notifications and come back as
    /// [`DispatchOutcome::Failed`]; only an unknown bot is an error.
    pub async fn handle_update(
        &self,
        bot: Option<&str>,
        update: Update,
    ) -> RuntimeResult<DispatchOutcome> {
        let managed = self.bots.resolve(bot)?;
        Ok(managed
            .dispatcher()
            .dispatch(update, Arc::clone(managed.handle()))
            .await)
    }

    /// Decodes a raw JSON update and dispatches it.
    pub async fn handle_json(&self, bot: Option<&str>, raw: &str) -> RuntimeResult<DispatchOutcome> {
        let update = Update::from_json(raw)?;
        self.handle_update(bot, update).await
    }

    /// Dispatches updates from `updates` until the channel closes or `shutdown`
    /// is cancelled.
    ///
    /// Updates are handled sequentially; an update already being dispatched
    /// when `shutdown` fires runs to completion.
    pub async fn run(
        &self,
        mut updates: mpsc::Receiver<InboundUpdate>,
        shutdown: CancellationToken,
    ) -> RunStats {
        let mut stats = RunStats::default();
        info!("Herald runtime is now running");

        loop {
            let inbound = tokio::select! {
                biased;
                () = shutdown.cancelled() => {
                    info!("Shutdown requested, stopping dispatch loop");
                    break;
                }
                next = updates.recv() => match next {
                    Some(inbound) => inbound,
                    None => {
                        debug!("Update channel closed, stopping dispatch loop");
                        break;
                    }
                },
            };

            stats.received += 1;
            let outcome = self.handle_update(inbound.bot.as_deref(), inbound.update).await;
            if let Err(e) = &outcome {
                warn!(error = %e, "Dropping update");
            }
            stats.record(&outcome);
        }

        info!(
            received = stats.received,
            succeeded = stats.succeeded,
            failed = stats.failed,
            "Herald runtime stopped"
        );
        stats
    }

    /// Runs the dispatch loop until Ctrl+C or SIGTERM, or until `updates` closes.
    pub async fn run_until_signal(&self, updates: mpsc::Receiver<InboundUpdate>) -> RunStats {
        let shutdown = CancellationToken::new();
        let run = self.run(updates, shutdown.clone());
        tokio::pin!(run);

        tokio::select! {
            stats = &mut run => stats,
            () = wait_for_shutdown() => {
                shutdown.cancel();
                run.await
            }
        }
    }
}

/// Waits for shutdown signals (Ctrl+C or SIGTERM).
///
/// Never resolves if no signal handler can be installed.
pub async fn wait_for_shutdown() {
    #[cfg(unix)]
    {
        let mut sigterm = match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(sigterm) => Some(sigterm),
            Err(e) => {
                warn!(error = %e, "Failed to register SIGTERM handler");
                None
            }
        };
        let terminate = async {
            match sigterm.as_mut() {
                Some(sigterm) => {
                    sigterm.recv().await;
                }
                None => std::future::pending().await,
            }
        };

        tokio::select! {
            result = signal::ctrl_c() => match result {
                Ok(()) => info!("Received Ctrl+C, shutting down"),
                Err(e) => {
                    warn!(error = %e, "Failed to listen for Ctrl+C");
                    std::future::pending::<()>().await;
                }
            },
            () = terminate => info!("Received SIGTERM, shutting down"),
        }
    }

    #[cfg(not(unix))]
    {
        match signal::ctrl_c().await {
            Ok(()) => info!("Received Ctrl+C, shutting down"),
            Err(e) => {
                warn!(error = %e, "Failed to listen for Ctrl+C");
                std::future::pending::<()>().await;
            }
        }
    }
}

// =============================================================================
// RuntimeBuilder
// =============================================================================

/// Loads configuration, installs logging and builds a [`HeraldRuntime`].
pub struct RuntimeBuilder {
    config_loader: ConfigLoader,
    config: Option<HeraldConfig>,
    library: CommandLibrary,
    sink: Arc<dyn NotificationSink>,
    init_logging: bool,
}

impl RuntimeBuilder {
    pub fn new() -> Self {
        Self {
            config_loader: ConfigLoader::new().with_current_dir(),
            config: None,
            library: CommandLibrary::new(),
            sink: Arc::new(TracingSink),
            init_logging: true,
        }
    }

    /// Sets a specific configuration file to load.
    pub fn config_file<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.config_loader = self.config_loader.file(path);
        self
    }

    /// Sets the configuration profile (e.g., "development", "production").
    pub fn profile(mut self, profile: impl AsRef<str>) -> Self {
        self.config_loader = self.config_loader.profile(profile);
        self
    }

    /// Adds a search path for configuration files.
    pub fn search_path<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.config_loader = self.config_loader.search_path(path);
        self
    }

    /// Disables loading environment variables.
    pub fn without_env(mut self) -> Self {
        self.config_loader = self.config_loader.without_env();
        self
    }

    /// Uses `config` as is, skipping the loader.
    pub fn config(mut self, config: HeraldConfig) -> Self {
        self.config = Some(config);
        self
    }

    /// The commands and groups bots select from.
    pub fn library(mut self, library: CommandLibrary) -> Self {
        self.library = library;
        self
    }

    pub fn sink(mut self, sink: impl NotificationSink + 'static) -> Self {
        self.sink = Arc::new(sink);
        self
    }

    pub fn shared_sink(mut self, sink: Arc<dyn NotificationSink>) -> Self {
        self.sink = sink;
        self
    }

    /// Whether `build` installs the global subscriber (default: true).
    pub fn init_logging(mut self, enabled: bool) -> Self {
        self.init_logging = enabled;
        self
    }

    pub fn build(self) -> RuntimeResult<HeraldRuntime> {
        let config = match self.config {
            Some(config) => {
                crate::config::validate_config(&config)?;
                config
            }
            None => self.config_loader.load()?,
        };

        if self.init_logging {
            logging::init_from_config(&config.logging);
        }

        HeraldRuntime::with_sink(config, &self.library, self.sink)
    }
}

impl Default for RuntimeBuilder {
    fn default() -> Self {
        Self::new()
    }
}
