//! TOML file backed [`ConfigStore`]
//!
//! Each section is a top-level table:
//!
//! ```toml
//! [input-sdl-control1]
//! mode = 0
//! "X Axis" = "axis(0-,0+)"
//! "A Button" = "button(0)"
//! ```
//!
//! Sections are edited in memory. Saving a section re-reads the file and
//! replaces only that table, so sections saved by someone else survive.

use super::{ConfigStore, ParamValue, SectionHandle, StoreError};
use std::fs;
use std::path::{Path, PathBuf};
use toml::{Table, Value};
use tracing::{debug, info, warn};

pub struct TomlConfigStore {
    path: PathBuf,
    document: Table,
}

impl TomlConfigStore {
    /// Loads `path`, starting empty when the file does not exist yet
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let path = path.into();
        let document = read_document(&path)?.unwrap_or_else(|| {
            info!("Configuration file {} does not exist yet", path.display());
            Table::new()
        });
        debug!(
            "Loaded {} sections from {}",
            document.len(),
            path.display()
        );
        Ok(Self { path, document })
    }

    fn section(&self, name: &str) -> Option<&Table> {
        self.document.get(name).and_then(Value::as_table)
    }
}

fn read_document(path: &Path) -> Result<Option<Table>, StoreError> {
    let file_error = |reason: String| StoreError::File {
        path: path.display().to_string(),
        reason,
    };

    if !path.exists() {
        return Ok(None);
    }
    let content = fs::read_to_string(path).map_err(|e| file_error(e.to_string()))?;
    let table = content
        .parse::<Table>()
        .map_err(|e| file_error(e.to_string()))?;
    Ok(Some(table))
}

impl ConfigStore for TomlConfigStore {
    fn open_section(&mut self, id: &str) -> Result<SectionHandle, StoreError> {
        match self.document.get(id) {
            Some(Value::Table(_)) => {}
            Some(other) => {
                warn!("Entry {} is a {}, not a section", id, other.type_str());
                return Err(StoreError::SectionOpen(id.to_string()));
            }
            None => {
                debug!("Creating section {}", id);
                self.document
                    .insert(id.to_string(), Value::Table(Table::new()));
            }
        }
        Ok(SectionHandle::new(id))
    }

    fn get_string(&self, handle: &SectionHandle, key: &str) -> String {
        match self.section(handle.name()).and_then(|s| s.get(key)) {
            Some(Value::String(s)) => s.clone(),
            Some(Value::Integer(i)) => i.to_string(),
            Some(other) => {
                warn!(
                    "Parameter {} in {} is a {}",
                    key,
                    handle.name(),
                    other.type_str()
                );
                String::new()
            }
            None => String::new(),
        }
    }

    fn set_parameter(
        &mut self,
        handle: &SectionHandle,
        key: &str,
        value: ParamValue,
    ) -> Result<(), StoreError> {
        let Some(section) = self
            .document
            .get_mut(handle.name())
            .and_then(Value::as_table_mut)
        else {
            return Err(StoreError::Write {
                section: handle.name().to_string(),
                key: key.to_string(),
                reason: "section is not open".to_string(),
            });
        };

        let value = match value {
            ParamValue::Int(i) => Value::Integer(i),
            ParamValue::Str(s) => Value::String(s),
        };
        section.insert(key.to_string(), value);
        Ok(())
    }

    fn save_section(&mut self, id: &str) -> Result<(), StoreError> {
        let save_error = |reason: String| StoreError::Save {
            section: id.to_string(),
            reason,
        };

        let section = self
            .section(id)
            .cloned()
            .ok_or_else(|| save_error("section is not open".to_string()))?;

        let mut on_disk = read_document(&self.path)
            .map_err(|e| save_error(e.to_string()))?
            .unwrap_or_default();
        on_disk.insert(id.to_string(), Value::Table(section));

        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).map_err(|e| save_error(e.to_string()))?;
            }
        }
        let content = toml::to_string_pretty(&on_disk).map_err(|e| save_error(e.to_string()))?;
        fs::write(&self.path, content).map_err(|e| save_error(e.to_string()))?;

        info!("Saved section {} to {}", id, self.path.display());
        Ok(())
    }
}
