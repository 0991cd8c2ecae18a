//! ModuleInstance: the facade a host embeds.
//!
//! Owns one of everything (config, state store, command channel, action
//! dispatcher, feedback evaluator, sync engine) and exposes the lifecycle a
//! control-surface host drives:
//!
//! ```text
//! new ─> init ─> (run_action | check_feedback | config_updated)* ─> destroy
//! ```

use std::sync::Arc;

use capacitimer_core::variables::VARIABLE_DEFINITIONS;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tracing::info;

use crate::application::dispatch_action::{action_definitions, ActionDispatcher};
use crate::application::evaluate_feedback::{feedback_definitions, FeedbackEvaluator};
use crate::application::host::{HostSurface, InstanceStatus, OptionValues, VariableInterpolator};
use crate::application::send_command::{
    CommandChannel, CommandError, CommandOutcome, HttpTransport, TransportError,
};
use crate::application::state_store::StateStore;
use crate::application::track_discovery::{
    DiscoveryEvent, DiscoveryTracker, DEFAULT_SERVICE_PREFIX,
};
use crate::domain::{ModuleConfig, SharedConfig};
use crate::infrastructure::http::ReqwestTransport;
use crate::infrastructure::push::{PushTransport, WsTransport};
use crate::infrastructure::sync_engine::{LinkState, SyncEngine};

pub struct ModuleInstance {
    config: SharedConfig,
    host: Arc<dyn HostSurface>,
    store: StateStore,
    channel: CommandChannel,
    dispatcher: ActionDispatcher,
    feedback: FeedbackEvaluator,
    engine: SyncEngine,
    discovery_prefix: String,
}

impl ModuleInstance {
    /// Wires an instance from explicit transports.
    pub fn new(
        config: ModuleConfig,
        host: Arc<dyn HostSurface>,
        interpolator: Arc<dyn VariableInterpolator>,
        http: Arc<dyn HttpTransport>,
        push: Arc<dyn PushTransport>,
    ) -> Self {
        let config = SharedConfig::new(config);
        let store = StateStore::new(Arc::clone(&host));
        let channel = CommandChannel::new(config.clone(), http, store.clone());
        let engine = SyncEngine::new(config.clone(), channel.clone(), Arc::clone(&host), push);
        Self {
            dispatcher: ActionDispatcher::new(channel.clone(), interpolator),
            channel,
            feedback: FeedbackEvaluator::new(store.clone()),
            discovery_prefix: DEFAULT_SERVICE_PREFIX.to_string(),
            config,
            host,
            store,
            engine,
        }
    }

    /// Wires an instance with the reqwest and tokio-tungstenite transports.
    ///
    /// # Errors
    ///
    /// Fails only if the HTTP client cannot be constructed.
    pub fn connect(
        config: ModuleConfig,
        host: Arc<dyn HostSurface>,
        interpolator: Arc<dyn VariableInterpolator>,
    ) -> Result<Self, TransportError> {
        let http = Arc::new(ReqwestTransport::new()?);
        Ok(Self::new(config, host, interpolator, http, Arc::new(WsTransport::default())))
    }

    /// Overrides the service-name prefix used by [`spawn_discovery`](Self::spawn_discovery).
    pub fn with_discovery_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.discovery_prefix = prefix.into();
        self
    }

    /// Publishes definitions and initial variables, then starts syncing.
    pub async fn init(&mut self) {
        info!("initialising Capacitimer instance");
        self.host.update_status(InstanceStatus::Connecting, None);
        self.publish_definitions();
        self.store.export_current();
        self.engine.start().await;
    }

    /// Stores a new configuration and reconnects against it.
    pub async fn config_updated(&mut self, config: ModuleConfig) {
        info!(host = ?config.host, "configuration updated");
        let style_changed = config.parameter_style != self.config.get().parameter_style;
        self.config.replace(config);
        if style_changed {
            self.publish_definitions();
        }
        self.engine.start().await;
    }

    /// Stops the sync engine.  Commands already in flight still complete.
    pub async fn destroy(&mut self) {
        info!("destroying Capacitimer instance");
        self.engine.shutdown().await;
    }

    /// Runs an action by id.  Failures are logged, never returned.
    pub async fn run_action(&self, action_id: &str, options: &OptionValues) -> Option<CommandOutcome> {
        self.dispatcher.execute_by_id(action_id, options).await
    }

    /// Fetches the timer once over HTTP and applies it.
    ///
    /// # Errors
    ///
    /// See [`CommandChannel::refresh_timer`].
    pub async fn refresh_timer(&self) -> Result<(), CommandError> {
        self.channel.refresh_timer().await
    }

    /// Evaluates a feedback by id against the current state.
    pub fn check_feedback(&self, feedback_id: &str, options: &OptionValues) -> bool {
        self.feedback.evaluate_by_id(feedback_id, options)
    }

    /// Starts tracking discovery events from `events`.
    ///
    /// The task ends when the sender is dropped and yields the final tracker.
    pub fn spawn_discovery(
        &self,
        events: mpsc::Receiver<DiscoveryEvent>,
    ) -> JoinHandle<DiscoveryTracker> {
        let tracker = DiscoveryTracker::new(&self.discovery_prefix, Arc::clone(&self.host));
        tokio::spawn(tracker.run(events))
    }

    pub fn config(&self) -> ModuleConfig {
        self.config.get()
    }

    pub fn store(&self) -> &StateStore {
        &self.store
    }

    pub fn link_state(&self) -> LinkState {
        self.engine.link_state()
    }

    pub fn subscribe_link(&self) -> watch::Receiver<LinkState> {
        self.engine.subscribe()
    }

    fn publish_definitions(&self) {
        let style = self.config.get().parameter_style;
        self.host.set_action_definitions(&action_definitions(style));
        self.host.set_feedback_definitions(&feedback_definitions());
        self.host.set_variable_definitions(&VARIABLE_DEFINITIONS);
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
