use super::intent::Intent;
use super::state::UiState;

/// The only place state transitions happen.
///
/// Reducers never perform I/O; side effects such as starting a data source
/// are issued by whoever dispatches the intent.
pub trait Reducer {
    type State: UiState;
    type Intent: Intent;

    fn reduce(state: Self::State, intent: Self::Intent) -> Self::State;
}
