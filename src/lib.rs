//! Input binding dialog core for N64 emulator input plugins
//!
//! Edits the button, axis, hat and key bindings of four controller slots
//! stored as textual key specifications in a sectioned configuration store.

pub mod controller;
pub mod dialog;
pub mod mapping;
pub mod persistence;
pub mod ui;
