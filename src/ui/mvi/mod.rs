//! Model-View-Intent (MVI) primitives.
//!
//! ```text
//! platform events ─┐
//!                  ├─→ Intent ──→ Reducer ──→ State ──→ view
//! user start/stop ─┘
//! ```
//!
//! - **State**: everything the view needs to render, as one value
//! - **Intent**: a platform event or a user request
//! - **Reducer**: pure `(State, Intent) -> State`

mod intent;
mod reducer;
mod state;

pub use intent::Intent;
pub use reducer::Reducer;
pub use state::UiState;
