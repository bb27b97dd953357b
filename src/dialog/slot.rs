use crate::mapping::binding::{merge_key, Binding, ButtonMapping, Parameter};
use crate::mapping::keyspec::{parse_all, serialize_all, KeySpec};
use crate::persistence::{ConfigStore, ParamValue, SectionHandle, StoreError};
use tracing::{debug, info, warn};

/// Control-mode parameter written with every committed slot (0 = manual)
pub const MODE_KEY: &str = "mode";
pub const MODE_MANUAL: i64 = 0;

/// Bindings of one physical controller index
#[derive(Debug)]
pub struct ControllerSlot {
    section_id: String,
    handle: Option<SectionHandle>,
    bindings: Option<Vec<Binding>>,
    dirty: bool,
}

impl ControllerSlot {
    /// `handle` is `None` when the section could not be opened
    pub fn new(section_id: String, handle: Option<SectionHandle>) -> Self {
        Self {
            section_id,
            handle,
            bindings: None,
            dirty: false,
        }
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    pub fn bindings(&self) -> &[Binding] {
        self.bindings.as_deref().unwrap_or_default()
    }

    /// Fetches the bindings from the store the first time it is called.
    ///
    /// One binding per control that owns its config name, in control table
    /// order. Without an open section every binding is empty.
    pub fn load_bindings(&mut self, mappings: &[ButtonMapping], store: &dyn ConfigStore) {
        if self.bindings.is_some() {
            return;
        }

        let bindings: Vec<Binding> = mappings
            .iter()
            .filter(|m| m.parameter.loads_binding())
            .map(|m| {
                let text = self
                    .handle
                    .as_ref()
                    .map(|handle| store.get_string(handle, m.config_name))
                    .unwrap_or_default();
                let keys = parse_all(&text);
                debug!("{} / {}: {:?} -> {:?}", self.section_id, m.config_name, text, keys);
                Binding::new(m.config_name, keys)
            })
            .collect();

        info!(
            "Loaded {} bindings for {}",
            bindings.len(),
            self.section_id
        );
        self.bindings = Some(bindings);
    }

    /// Merges a captured key into binding `index` and marks the slot dirty
    pub fn apply(&mut self, index: usize, key: &KeySpec, parameter: Parameter) -> bool {
        let Some(binding) = self
            .bindings
            .as_mut()
            .and_then(|bindings| bindings.get_mut(index))
        else {
            warn!("No binding {} in {}", index, self.section_id);
            return false;
        };
        merge_key(&mut binding.keys, key, parameter);
        self.dirty = true;
        true
    }

    /// Writes the bindings back when changed, then always saves the section.
    ///
    /// Individual write failures are logged and skipped. The returned error is
    /// the section save failure, if any.
    pub fn commit(&self, store: &mut dyn ConfigStore) -> Result<(), StoreError> {
        if self.dirty {
            match &self.handle {
                Some(handle) => self.write_bindings(handle, store),
                None => warn!(
                    "Section {} is not open, skipping binding writes",
                    self.section_id
                ),
            }
        }
        store.save_section(&self.section_id)
    }

    fn write_bindings(&self, handle: &SectionHandle, store: &mut dyn ConfigStore) {
        if let Err(e) = store.set_parameter(handle, MODE_KEY, ParamValue::Int(MODE_MANUAL)) {
            warn!("{}", e);
        }

        for binding in self.bindings() {
            let text = serialize_all(&binding.keys);
            if let Err(e) = store.set_parameter(handle, &binding.config_name, ParamValue::Str(text)) {
                warn!("{}", e);
            }
        }
    }
}
