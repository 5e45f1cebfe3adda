//! Presentation layer.
//!
//! `mvi` and `positioning` hold the toolkit-independent state machine; the
//! rest renders it in a terminal with ratatui.

pub mod events;
pub mod mvi;
pub mod positioning;
pub mod render;
pub mod runtime;
pub mod terminal_guard;
pub mod theme;
