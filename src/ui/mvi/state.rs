/// Marker trait for view state.
///
/// `PartialEq` lets the runtime skip publishing snapshots that did not
/// change; `Default` is the state before any event arrived.
pub trait UiState: Clone + PartialEq + Default + Send + 'static {}
