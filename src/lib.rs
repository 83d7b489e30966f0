//! A terminal picker control that pairs a workspace with a local "live
//! file", plus the pieces the `livefile-picker` binary builds around it.

pub mod app;
pub mod components;
pub mod config;
pub mod dnd;
pub mod drivers;
pub mod error;
pub mod event_loop;
pub mod keybindings;
pub mod layout;
pub mod menu;
pub mod model;
pub mod provider;
pub mod tasks;
pub mod theme;
pub mod tracing_sub;
pub mod ui;
