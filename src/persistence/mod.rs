//! # Persistence Module
//!
//! Bindings live in named sections of a key/value configuration store, one
//! section per controller slot. The dialog only talks to the [`ConfigStore`]
//! trait; [`toml_store::TomlConfigStore`] keeps the sections as tables of a
//! TOML document on disk.
//!
//! ## Why This Module Exists
//!
//! The emulator plugin reads its bindings from the same store the dialog
//! writes, so the section layout is a contract with a second program:
//!
//! - **Section Names**: [`section_name`] derives `input-sdl-controlN` from the
//!   plugin identity and the 1-based controller number
//! - **Parameter Names**: one string parameter per control group, named after
//!   the group (`"X Axis"`, `"A Button"`), plus the `mode` integer
//! - **Untouched Data**: sections and parameters the dialog does not edit are
//!   kept as they are on save
//!
//! ## Module Organization
//!
//! - [`ConfigStore`] - open/read/write/save over [`SectionHandle`]s
//! - [`toml_store`] - file backed store, one table per section
//! - [`settings`] - where the store lives and which plugin it configures
//!
//! ## Design Rationale
//!
//! ### Handles Instead of Names
//! The dialog takes its [`SectionHandle`]s from [`ConfigStore::open_section`]
//! only. A slot holding one has seen its section open successfully, and a
//! slot whose section failed to open simply has no handle.
//!
//! ### Saving Per Section
//! [`ConfigStore::save_section`] persists one section at a time. The TOML
//! store re-reads the file and swaps in only that table, so edits another
//! program made to other sections survive.
//!
//! ## Error Handling Strategy
//! Every failure is typed through [`StoreError`] so callers can decide how to
//! degrade. An unopened section yields empty bindings. Failed writes are
//! logged and skipped, and a failed save is reported without rolling back
//! memory.

pub mod settings;
pub mod toml_store;

#[cfg(test)]
pub(crate) mod fake;

use std::fmt;

/// Literal prefix stripped from the plugin identity when naming sections
pub const PLUGIN_PREFIX: &str = "mupen64plus-";

/// Number of controller slots the dialog edits
pub const CONTROLLER_COUNT: usize = 4;

/// Derives the section id for the 1-based `controller` number.
///
/// `mupen64plus-input-sdl` and controller 2 give `input-sdl-control2`.
pub fn section_name(plugin: &str, controller: usize) -> String {
    let base = plugin.strip_prefix(PLUGIN_PREFIX).unwrap_or(plugin);
    format!("{base}-control{controller}")
}

/// Opaque reference to an opened section
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct SectionHandle {
    name: String,
}

impl SectionHandle {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

/// Typed parameter value
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ParamValue {
    Int(i64),
    Str(String),
}

impl fmt::Display for ParamValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParamValue::Int(v) => write!(f, "{v}"),
            ParamValue::Str(s) => f.write_str(s),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("Could not open section {0}")]
    SectionOpen(String),

    #[error("Could not set configuration parameter {key} in {section}: {reason}")]
    Write {
        section: String,
        key: String,
        reason: String,
    },

    #[error("Could not save configuration section {section}: {reason}")]
    Save { section: String, reason: String },

    #[error("Configuration file {path}: {reason}")]
    File { path: String, reason: String },
}

/// Synchronous key/value store grouped into sections
pub trait ConfigStore {
    fn open_section(&mut self, id: &str) -> Result<SectionHandle, StoreError>;

    /// Raw text of `key`, empty when unset
    fn get_string(&self, handle: &SectionHandle, key: &str) -> String;

    fn set_parameter(
        &mut self,
        handle: &SectionHandle,
        key: &str,
        value: ParamValue,
    ) -> Result<(), StoreError>;

    /// Persists the section with the given id
    fn save_section(&mut self, id: &str) -> Result<(), StoreError>;
}
