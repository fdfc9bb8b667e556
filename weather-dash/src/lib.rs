//! Weather dashboard TUI
//!
//! This library exposes the dashboard's modules for testing.

pub mod action;
pub mod api;
pub mod components;
pub mod config;
pub mod effect;
pub mod error;
pub mod geolocation;
pub mod i18n;
pub mod logging;
pub mod model;
pub mod reducer;
pub mod state;
