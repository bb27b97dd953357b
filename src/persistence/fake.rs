//! In-memory store recording every call, for tests

use super::{ConfigStore, ParamValue, SectionHandle, StoreError};
use std::cell::RefCell;
use std::collections::{HashMap, HashSet};
use std::rc::Rc;

#[derive(Debug, Default)]
pub struct FakeStoreState {
    pub values: HashMap<(String, String), String>,
    pub writes: Vec<(String, String, ParamValue)>,
    pub saves: Vec<String>,
    pub reads: Vec<(String, String)>,
    pub failing_sections: HashSet<String>,
    pub failing_keys: HashSet<String>,
    pub fail_save: bool,
}

#[derive(Clone, Default)]
pub struct FakeStore {
    pub state: Rc<RefCell<FakeStoreState>>,
}

impl FakeStore {
    pub fn with_value(self, section: &str, key: &str, value: &str) -> Self {
        self.state
            .borrow_mut()
            .values
            .insert((section.to_string(), key.to_string()), value.to_string());
        self
    }

    pub fn boxed(&self) -> Box<dyn ConfigStore> {
        Box::new(self.clone())
    }
}

impl ConfigStore for FakeStore {
    fn open_section(&mut self, id: &str) -> Result<SectionHandle, StoreError> {
        if self.state.borrow().failing_sections.contains(id) {
            return Err(StoreError::SectionOpen(id.to_string()));
        }
        Ok(SectionHandle::new(id))
    }

    fn get_string(&self, handle: &SectionHandle, key: &str) -> String {
        let mut state = self.state.borrow_mut();
        state
            .reads
            .push((handle.name().to_string(), key.to_string()));
        state
            .values
            .get(&(handle.name().to_string(), key.to_string()))
            .cloned()
            .unwrap_or_default()
    }

    fn set_parameter(
        &mut self,
        handle: &SectionHandle,
        key: &str,
        value: ParamValue,
    ) -> Result<(), StoreError> {
        let mut state = self.state.borrow_mut();
        state
            .writes
            .push((handle.name().to_string(), key.to_string(), value.clone()));
        if state.failing_keys.contains(key) {
            return Err(StoreError::Write {
                section: handle.name().to_string(),
                key: key.to_string(),
                reason: "rejected".to_string(),
            });
        }
        state
            .values
            .insert((handle.name().to_string(), key.to_string()), value.to_string());
        Ok(())
    }

    fn save_section(&mut self, id: &str) -> Result<(), StoreError> {
        let mut state = self.state.borrow_mut();
        state.saves.push(id.to_string());
        if state.fail_save {
            return Err(StoreError::Save {
                section: id.to_string(),
                reason: "disk full".to_string(),
            });
        }
        Ok(())
    }
}
