//! Indoor positioning viewer.
//!
//! Loads a hosted map, finds its positioning table and pathways layer,
//! builds an indoor location data source on top of them and projects the
//! data source's status and location streams into a single view state.
//! The mapping platform itself is consumed through the traits in
//! [`platform`].

pub mod auth;
pub mod config;
pub mod error;
pub mod loader;
pub mod logging;
pub mod platform;
pub mod resolve;
pub mod session;
pub mod shutdown;
pub mod ui;
