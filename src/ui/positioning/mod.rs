//! Indoor positioning screen.
//!
//! Uses the MVI pattern:
//! - `state.rs` - view state and phases
//! - `intent.rs` - platform events and user requests
//! - `reducer.rs` - state transitions
//! - `details.rs` - location details derived from raw samples

mod details;
mod intent;
mod reducer;
mod state;

pub use details::{
    format_significant, LocationDetails, PositionSource, SenderCount, SenderKind,
    ACCURACY_SIGNIFICANT_DIGITS,
};
pub use intent::PositioningIntent;
pub use reducer::PositioningReducer;
pub use state::{ButtonLabel, DataSourceRef, Phase, PositioningTableRef, ViewState};
