//! Screen session: owns the view state for one screen lifetime.
//!
//! A session runs the startup pipeline, then consumes the data source's
//! status and location streams together with user start/stop requests on
//! a single task. That task is the only writer of the [`ViewState`];
//! everyone else reads snapshots through [`SessionHandle`].

mod pipeline;
mod projector;
mod runtime;

use std::sync::Arc;

use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tracing::Instrument;
use uuid::Uuid;

use crate::config::{AuthConfig, Config, PortalConfig, PositioningConfig};
use crate::platform::MappingPlatform;
use crate::shutdown::ShutdownHandle;
use crate::ui::positioning::ViewState;

pub use projector::ViewStateProjector;

const COMMAND_CHANNEL_SIZE: usize = 16;

/// Settings a session needs from the configuration.
#[derive(Debug, Clone, Default)]
pub struct SessionSettings {
    pub portal: PortalConfig,
    pub positioning: PositioningConfig,
    pub auth: AuthConfig,
}

impl From<&Config> for SessionSettings {
    fn from(config: &Config) -> Self {
        Self {
            portal: config.portal.clone(),
            positioning: config.positioning.clone(),
            auth: config.auth.clone(),
        }
    }
}

/// User requests forwarded to the session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UserCommand {
    Start,
    Stop,
}

pub struct PositioningSession;

impl PositioningSession {
    /// Spawn a session on the current tokio runtime.
    pub fn spawn(platform: Arc<dyn MappingPlatform>, settings: SessionSettings) -> SessionHandle {
        let id = Uuid::new_v4();
        let shutdown = ShutdownHandle::new();
        let (projector, snapshots) = ViewStateProjector::new(shutdown.clone());
        let (commands, command_rx) = mpsc::channel(COMMAND_CHANNEL_SIZE);

        let span = tracing::info_span!("session", %id);
        let task = tokio::spawn(
            runtime::run_session(platform, settings, projector, command_rx, shutdown.clone())
                .instrument(span),
        );

        SessionHandle {
            id,
            commands,
            snapshots,
            shutdown,
            task: Some(task),
        }
    }
}

/// Handle to a running session. Dropping it tears the session down without
/// waiting; prefer [`SessionHandle::shutdown`].
pub struct SessionHandle {
    id: Uuid,
    commands: mpsc::Sender<UserCommand>,
    snapshots: watch::Receiver<ViewState>,
    shutdown: ShutdownHandle,
    task: Option<JoinHandle<()>>,
}

impl SessionHandle {
    pub fn id(&self) -> Uuid {
        self.id
    }

    /// Current view state.
    pub fn snapshot(&self) -> ViewState {
        self.snapshots.borrow().clone()
    }

    /// A receiver notified on every published snapshot.
    pub fn subscribe(&self) -> watch::Receiver<ViewState> {
        self.snapshots.clone()
    }

    /// Ask the session to start the data source. Ignored unless the
    /// current phase allows it.
    pub async fn start(&self) {
        self.send(UserCommand::Start).await;
    }

    /// Ask the session to stop the data source.
    pub async fn stop(&self) {
        self.send(UserCommand::Stop).await;
    }

    async fn send(&self, command: UserCommand) {
        if self.commands.send(command).await.is_err() {
            tracing::debug!(?command, "Command dropped (session ended)");
        }
    }

    /// Tear the session down and wait for it to finish. No snapshot is
    /// published after this returns.
    pub async fn shutdown(mut self) {
        self.shutdown.signal();
        if let Some(task) = self.task.take() {
            if let Err(err) = task.await {
                tracing::warn!(error = %err, "Session task ended abnormally");
            }
        }
    }
}

impl Drop for SessionHandle {
    fn drop(&mut self) {
        self.shutdown.signal();
    }
}
