//! SyncEngine: keeps local state in step with the server.
//!
//! Two independent tasks run while the engine is started:
//!
//! ```text
//! connection task                          poller task
//! ───────────────                          ───────────
//! ┌─> Connecting ── open ws://host:port    every poll_interval:
//! │      │ ok            │ err               link == Connected? skip
//! │      v               v                   else GET /api/timer → store
//! │   Connected      ConnectionFailure
//! │      │ frames → store
//! │      │ close / error
//! │      v
//! │   Disconnected
//! └── sleep(reconnect_delay)
//! ```
//!
//! The reconnect delay is fixed and attempts never stop while a host is
//! configured.  The poller bounds staleness during outages to one poll
//! interval regardless of how the reconnect loop is doing.
//!
//! # Cancellation
//!
//! Each task watches its own `watch::Receiver<bool>`.  The reconnect sleep,
//! the poll tick and the frame receive all race against that signal, so
//! [`SyncEngine::shutdown`] (and a restart) take effect immediately.  A
//! command request already in flight on the `CommandChannel` is not touched;
//! its response is applied whenever it lands.

use std::sync::Arc;
use std::time::Duration;

use capacitimer_core::{decode_push_frame, FrameError, PushFrame};
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{self, Instant, MissedTickBehavior};
use tracing::{debug, error, info, warn};

use super::push::{PushConnection, PushError, PushTransport};
use crate::application::host::{HostSurface, InstanceStatus};
use crate::application::send_command::CommandChannel;
use crate::application::state_store::{StateStore, UpdateSource};
use crate::domain::SharedConfig;

/// Upper bound on the graceful close performed at shutdown.
const CLOSE_TIMEOUT: Duration = Duration::from_secs(1);

/// Status reported when there is nothing to connect to.
pub const NO_HOST_MESSAGE: &str = "no Capacitimer host configured";

/// State of the push link.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkState {
    Disconnected,
    Connecting,
    Connected,
}

/// A spawned task and the signal that stops it.
struct TaskHandle {
    shutdown: watch::Sender<bool>,
    join: JoinHandle<()>,
}

impl TaskHandle {
    fn spawn<F, Fut>(task: F) -> Self
    where
        F: FnOnce(watch::Receiver<bool>) -> Fut,
        Fut: std::future::Future<Output = ()> + Send + 'static,
    {
        let (shutdown, rx) = watch::channel(false);
        let join = tokio::spawn(task(rx));
        Self { shutdown, join }
    }

    async fn stop(self) {
        let _ = self.shutdown.send(true);
        if let Err(e) = self.join.await {
            error!("sync task ended abnormally: {e}");
        }
    }
}

/// Everything the connection task needs, cloned out of the engine.
#[derive(Clone)]
struct ConnectionContext {
    url: String,
    reconnect_delay: Duration,
    push: Arc<dyn PushTransport>,
    store: StateStore,
    host: Arc<dyn HostSurface>,
    link: Arc<watch::Sender<LinkState>>,
}

/// How a receive session ended.
enum SessionEnd {
    Shutdown,
    Closed,
    Failed(PushError),
}

/// Owns the connection and poller tasks.
pub struct SyncEngine {
    config: SharedConfig,
    channel: CommandChannel,
    host: Arc<dyn HostSurface>,
    push: Arc<dyn PushTransport>,
    link: Arc<watch::Sender<LinkState>>,
    connection: Option<TaskHandle>,
    /// The running poller and the period it was started with.
    poller: Option<(Duration, TaskHandle)>,
}

impl SyncEngine {
    pub fn new(
        config: SharedConfig,
        channel: CommandChannel,
        host: Arc<dyn HostSurface>,
        push: Arc<dyn PushTransport>,
    ) -> Self {
        let (link, _) = watch::channel(LinkState::Disconnected);
        Self {
            config,
            channel,
            host,
            push,
            link: Arc::new(link),
            connection: None,
            poller: None,
        }
    }

    pub fn link_state(&self) -> LinkState {
        *self.link.borrow()
    }

    /// Subscribes to link state changes.
    pub fn subscribe(&self) -> watch::Receiver<LinkState> {
        self.link.subscribe()
    }

    /// Starts, or restarts, synchronisation against the current configuration.
    ///
    /// Any running connection task is stopped first and a new one starts from
    /// `Connecting` against the re-resolved host.  The poller keeps running
    /// across restarts unless the poll interval changed, in which case it is
    /// replaced; calling this repeatedly never leaves two loops behind.
    pub async fn start(&mut self) {
        if let Some(connection) = self.connection.take() {
            connection.stop().await;
        }
        self.link.send_replace(LinkState::Disconnected);

        let config = self.config.get();
        match config.resolve_target() {
            Some(target) => {
                let ctx = ConnectionContext {
                    url: target.ws_url(),
                    reconnect_delay: config.reconnect_delay(),
                    push: Arc::clone(&self.push),
                    store: self.channel.store().clone(),
                    host: Arc::clone(&self.host),
                    link: Arc::clone(&self.link),
                };
                info!(url = %ctx.url, "starting push channel");
                self.host.update_status(InstanceStatus::Connecting, None);
                self.connection = Some(TaskHandle::spawn(|rx| run_connection(ctx, rx)));
            }
            None => {
                warn!("{NO_HOST_MESSAGE}");
                self.host
                    .update_status(InstanceStatus::ConnectionFailure, Some(NO_HOST_MESSAGE));
            }
        }

        let period = config.poll_interval();
        if let Some((running, poller)) = self.poller.take() {
            if running == period {
                self.poller = Some((running, poller));
            } else {
                debug!(?running, ?period, "poll interval changed; restarting poller");
                poller.stop().await;
            }
        }
        if self.poller.is_none() {
            let channel = self.channel.clone();
            let link = self.link.subscribe();
            let task = TaskHandle::spawn(move |rx| run_poller(channel, link, period, rx));
            self.poller = Some((period, task));
        }
    }

    /// Closes the connection and stops both tasks.
    pub async fn shutdown(&mut self) {
        if let Some(connection) = self.connection.take() {
            connection.stop().await;
        }
        if let Some((_, poller)) = self.poller.take() {
            poller.stop().await;
        }
        self.link.send_replace(LinkState::Disconnected);
        debug!("sync engine stopped");
    }
}

// ── Connection task ───────────────────────────────────────────────────────────

async fn run_connection(ctx: ConnectionContext, mut shutdown: watch::Receiver<bool>) {
    loop {
        ctx.link.send_replace(LinkState::Connecting);
        let opened = tokio::select! {
            biased;
            _ = shutdown.changed() => break,
            opened = ctx.push.open(&ctx.url) => opened,
        };

        match opened {
            Ok(mut conn) => {
                ctx.link.send_replace(LinkState::Connected);
                ctx.host.update_status(InstanceStatus::Ok, None);
                info!(url = %ctx.url, "push channel connected");

                let end = receive_frames(conn.as_mut(), &ctx.store, &mut shutdown).await;
                ctx.link.send_replace(LinkState::Disconnected);
                match end {
                    SessionEnd::Shutdown => {
                        if time::timeout(CLOSE_TIMEOUT, conn.close()).await.is_err() {
                            debug!("push channel close timed out");
                        }
                        break;
                    }
                    SessionEnd::Closed => {
                        ctx.host.update_status(InstanceStatus::Disconnected, None);
                        info!(
                            "push channel closed; reconnecting in {:?}",
                            ctx.reconnect_delay
                        );
                    }
                    SessionEnd::Failed(e) => {
                        let reason = e.to_string();
                        ctx.host
                            .update_status(InstanceStatus::ConnectionFailure, Some(&reason));
                        warn!(
                            "push channel error: {reason}; reconnecting in {:?}",
                            ctx.reconnect_delay
                        );
                    }
                }
            }
            Err(e) => {
                ctx.link.send_replace(LinkState::Disconnected);
                let reason = e.to_string();
                ctx.host
                    .update_status(InstanceStatus::ConnectionFailure, Some(&reason));
                warn!("{reason}; retrying in {:?}", ctx.reconnect_delay);
            }
        }

        tokio::select! {
            biased;
            _ = shutdown.changed() => break,
            _ = time::sleep(ctx.reconnect_delay) => {}
        }
    }
    ctx.link.send_replace(LinkState::Disconnected);
}

async fn receive_frames(
    conn: &mut dyn PushConnection,
    store: &StateStore,
    shutdown: &mut watch::Receiver<bool>,
) -> SessionEnd {
    loop {
        let next = tokio::select! {
            biased;
            _ = shutdown.changed() => return SessionEnd::Shutdown,
            next = conn.next_text() => next,
        };
        match next {
            Some(Ok(text)) => apply_frame(&text, store),
            Some(Err(e)) => return SessionEnd::Failed(e),
            None => return SessionEnd::Closed,
        }
    }
}

/// Decodes one frame and applies it.  Bad frames never end the session.
fn apply_frame(text: &str, store: &StateStore) {
    match decode_push_frame(text) {
        Ok(PushFrame::TimerUpdate(timer)) => store.apply_timer(timer, UpdateSource::Push),
        Ok(PushFrame::SettingsUpdate(settings)) => {
            store.apply_settings(settings, UpdateSource::Push)
        }
        Err(FrameError::UnknownType(kind)) => debug!(%kind, "ignoring push frame"),
        Err(e) => error!("dropping push frame: {e}"),
    }
}

// ── Poller task ───────────────────────────────────────────────────────────────

async fn run_poller(
    channel: CommandChannel,
    link: watch::Receiver<LinkState>,
    period: Duration,
    mut shutdown: watch::Receiver<bool>,
) {
    let mut ticker = time::interval_at(Instant::now() + period, period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            biased;
            _ = shutdown.changed() => break,
            _ = ticker.tick() => {}
        }
        if *link.borrow() == LinkState::Connected {
            continue;
        }
        // A poll still in flight at shutdown is abandoned.
        tokio::select! {
            biased;
            _ = shutdown.changed() => break,
            result = channel.refresh_timer() => {
                if let Err(e) = result {
                    debug!("poll failed: {e}");
                }
            }
        }
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
