//! Event loop of a running session.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::Instrument;

use crate::error::AppError;
use crate::platform::{IndoorsLocationDataSource, MappingPlatform};
use crate::shutdown::ShutdownHandle;
use crate::ui::positioning::PositioningIntent;

use super::pipeline::run_startup;
use super::projector::ViewStateProjector;
use super::{SessionSettings, UserCommand};

/// How long teardown waits for queued data-source calls to finish.
const STOP_TIMEOUT: Duration = Duration::from_secs(2);

/// Issues start/stop calls to the data source on one task, strictly in the
/// order they were requested, without blocking the event loop. A failing
/// start is reported back as an intent.
struct DataSourceController {
    calls: mpsc::UnboundedSender<UserCommand>,
    task: JoinHandle<()>,
}

impl DataSourceController {
    fn spawn(
        source: Arc<dyn IndoorsLocationDataSource>,
        outcomes: mpsc::Sender<PositioningIntent>,
    ) -> Self {
        let (calls, mut rx) = mpsc::unbounded_channel();
        let task = tokio::spawn(
            async move {
                while let Some(call) = rx.recv().await {
                    match call {
                        UserCommand::Start => {
                            if let Err(err) = source.start().await {
                                tracing::warn!(error = %err, "Data source start call failed");
                                let intent = PositioningIntent::StartCallFailed(
                                    AppError::DataSourceFailedToStart {
                                        reason: Some(err.message),
                                    },
                                );
                                if outcomes.send(intent).await.is_err() {
                                    tracing::trace!("Start failure dropped (session gone)");
                                }
                            }
                        }
                        UserCommand::Stop => {
                            if let Err(err) = source.stop().await {
                                tracing::warn!(error = %err, "Data source stop call failed");
                            }
                        }
                    }
                }
            }
            .in_current_span(),
        );
        Self { calls, task }
    }

    fn start(&self) {
        self.enqueue(UserCommand::Start);
    }

    fn stop(&self) {
        self.enqueue(UserCommand::Stop);
    }

    fn enqueue(&self, call: UserCommand) {
        if self.calls.send(call).is_err() {
            tracing::warn!(?call, "Data source controller is gone");
        }
    }

    /// Run every queued call, then end the controller task.
    async fn finish(self) {
        let Self { calls, mut task } = self;
        drop(calls);
        match tokio::time::timeout(STOP_TIMEOUT, &mut task).await {
            Ok(Ok(())) => {}
            Ok(Err(err)) => tracing::warn!(error = %err, "Data source controller ended abnormally"),
            Err(_) => {
                tracing::warn!("Data source did not stop within {:?}", STOP_TIMEOUT);
                task.abort();
            }
        }
    }
}

pub(super) async fn run_session(
    platform: Arc<dyn MappingPlatform>,
    settings: SessionSettings,
    mut projector: ViewStateProjector,
    mut commands: mpsc::Receiver<UserCommand>,
    shutdown: ShutdownHandle,
) {
    let startup = tokio::select! {
        biased;
        _ = shutdown.wait() => {
            tracing::debug!("Torn down during startup");
            return;
        }
        source = run_startup(platform.as_ref(), &settings, &mut projector) => source,
    };

    let Some(source) = startup else {
        // Startup failed; the error is on screen until teardown.
        loop {
            tokio::select! {
                biased;
                _ = shutdown.wait() => return,
                command = commands.recv() => match command {
                    Some(command) => tracing::debug!(?command, "Ignored, startup failed"),
                    None => return,
                },
            }
        }
    };

    // Subscribe before starting so no status is missed.
    let mut statuses = source.status_stream();
    let mut samples = source.location_stream();
    let (outcome_tx, mut outcomes) = mpsc::channel(8);
    let controller = DataSourceController::spawn(Arc::clone(&source), outcome_tx);

    if settings.positioning.auto_start {
        tracing::info!("Auto-starting indoor positioning");
        projector.apply(PositioningIntent::StartRequested);
        controller.start();
    }

    let mut statuses_open = true;
    let mut samples_open = true;

    loop {
        tokio::select! {
            biased;
            _ = shutdown.wait() => break,

            status = statuses.recv(), if statuses_open => match status {
                Some(status) => {
                    tracing::debug!(?status, "Data source status");
                    projector.apply(PositioningIntent::StatusChanged(status));
                }
                None => statuses_open = false,
            },

            sample = samples.recv(), if samples_open => match sample {
                Some(sample) => {
                    tracing::trace!(x = sample.x, y = sample.y, "Location sample");
                    projector.apply(PositioningIntent::LocationReceived(sample));
                }
                None => samples_open = false,
            },

            Some(intent) = outcomes.recv() => {
                projector.apply(intent);
            }

            command = commands.recv() => match command {
                Some(UserCommand::Start) if projector.state().can_start() => {
                    tracing::info!("Start requested");
                    projector.apply(PositioningIntent::StartRequested);
                    controller.start();
                }
                Some(UserCommand::Stop) if projector.state().can_stop() => {
                    tracing::info!("Stop requested");
                    projector.apply(PositioningIntent::StopRequested);
                    controller.stop();
                }
                Some(command) => {
                    tracing::debug!(?command, phase = ?projector.state().phase, "Command ignored");
                }
                None => break,
            },
        }
    }

    // Dropping the receivers cancels both subscriptions.
    drop(statuses);
    drop(samples);
    drop(outcomes);

    // Queued behind any start still in flight, so the source ends stopped.
    if projector.state().source_active() {
        tracing::debug!("Stopping data source for teardown");
        controller.stop();
    }
    controller.finish().await;
}
