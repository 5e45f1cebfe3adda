//! Single writer of the view state.

use tokio::sync::watch;

use crate::shutdown::ShutdownHandle;
use crate::ui::mvi::Reducer;
use crate::ui::positioning::{PositioningIntent, PositioningReducer, ViewState};

/// Owns the authoritative [`ViewState`], folds intents into it and
/// publishes each changed snapshot.
///
/// After teardown is signalled every intent is dropped, so nothing reaches
/// the view once the session is gone.
pub struct ViewStateProjector {
    state: ViewState,
    publisher: watch::Sender<ViewState>,
    shutdown: ShutdownHandle,
}

impl ViewStateProjector {
    pub fn new(shutdown: ShutdownHandle) -> (Self, watch::Receiver<ViewState>) {
        let (publisher, snapshots) = watch::channel(ViewState::default());
        let projector = Self {
            state: ViewState::default(),
            publisher,
            shutdown,
        };
        (projector, snapshots)
    }

    pub fn state(&self) -> &ViewState {
        &self.state
    }

    /// Apply `intent`. Returns whether the state changed.
    pub fn apply(&mut self, intent: PositioningIntent) -> bool {
        if self.shutdown.is_shutting_down() {
            tracing::trace!(?intent, "Intent dropped after teardown");
            return false;
        }

        let previous_phase = self.state.phase;
        let next = PositioningReducer::reduce(self.state.clone(), intent);
        if next == self.state {
            return false;
        }

        if next.phase != previous_phase {
            tracing::info!(from = ?previous_phase, to = ?next.phase, "Phase changed");
        }
        if let Some(error) = next.error.as_ref().filter(|_| next.error != self.state.error) {
            tracing::warn!(error = %error.details, "{}", error.message);
        }

        self.state = next;
        self.publisher.send_replace(self.state.clone());
        true
    }
}
