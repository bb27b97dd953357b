//! # Input Dialog
//!
//! Ties the binding model, the capture machine and the configuration store
//! together for the four controller slots.
//!
//! ```text
//! activate ──► Capturer ──► poll / key_pressed ──► merge into slot ──► redraw
//!                                                         │
//!                                           accept ──► commit every slot
//! ```
//!
//! The dialog is UI agnostic. A host drives it with [`InputDialog::poll`]
//! from its frame loop and drains [`InputDialog::take_signals`] and
//! [`InputDialog::take_notices`] after each call.

pub mod slot;

use crate::controller::capture::{CaptureSignal, CaptureTarget, Captured, Capturer};
use crate::controller::device::{DeviceError, DeviceService};
use crate::mapping::binding::{project, Binding, ButtonMapping, ControlId, BUTTON_MAPPINGS};
use crate::mapping::keyspec::{serialize_all, KeySpec};
use crate::persistence::{section_name, ConfigStore, CONTROLLER_COUNT};
use slot::ControllerSlot;
use std::collections::HashMap;
use std::time::{Duration, Instant};
use tracing::{debug, error, info, warn};

/// Keycode of the Escape key
pub const ESCAPE_KEY: i32 = 27;

/// Text shown on a control without a binding
pub const UNBOUND_TEXT: &str = "Select...";

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum NoticeLevel {
    Error,
    Warning,
}

/// User facing failure report
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Notice {
    pub level: NoticeLevel,
    pub message: String,
}

impl Notice {
    pub fn error(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Error,
            message: message.into(),
        }
    }

    pub fn warning(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Warning,
            message: message.into(),
        }
    }
}

/// What a keyboard key press did
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum KeyOutcome {
    /// Bound to the control being captured
    Captured,
    /// The host should close the dialog
    CloseRequested,
    Ignored,
}

/// A control resolved against the binding list it edits
#[derive(Clone, Debug)]
struct Control {
    mapping: ButtonMapping,
    binding: Option<usize>,
}

/// Resolves every control to the index of the binding loaded for its name
fn resolve_controls(mappings: &[ButtonMapping]) -> Vec<Control> {
    let loaded: HashMap<&str, usize> = mappings
        .iter()
        .filter(|m| m.parameter.loads_binding())
        .enumerate()
        .map(|(index, m)| (m.config_name, index))
        .collect();

    mappings
        .iter()
        .map(|mapping| {
            let binding = loaded.get(mapping.config_name).copied();
            if binding.is_none() {
                warn!("Control {} has no loading entry", mapping.config_name);
            }
            Control {
                mapping: mapping.clone(),
                binding,
            }
        })
        .collect()
}

pub struct InputDialog {
    store: Box<dyn ConfigStore>,
    slots: Vec<ControllerSlot>,
    controls: Vec<Control>,
    current: usize,
    capturer: Capturer,
    notices: Vec<Notice>,
}

impl InputDialog {
    /// Opens the sections of all controller slots and loads controller 1.
    ///
    /// `devices` is the outcome of initializing the device subsystem. On
    /// failure capturing is disabled but bindings can still be viewed and
    /// committed.
    pub fn new(
        plugin_name: &str,
        mut store: Box<dyn ConfigStore>,
        devices: Result<Box<dyn DeviceService>, DeviceError>,
    ) -> Self {
        let mut notices = Vec::new();

        let slots = (1..=CONTROLLER_COUNT)
            .map(|number| {
                let section_id = section_name(plugin_name, number);
                let handle = match store.open_section(&section_id) {
                    Ok(handle) => Some(handle),
                    Err(e) => {
                        error!("{}", e);
                        notices.push(Notice::error(e.to_string()));
                        None
                    }
                };
                ControllerSlot::new(section_id, handle)
            })
            .collect();

        let devices = match devices {
            Ok(devices) => Some(devices),
            Err(e) => {
                error!("{}", e);
                notices.push(Notice::error(e.to_string()));
                None
            }
        };

        let mut dialog = Self {
            store,
            slots,
            controls: resolve_controls(&BUTTON_MAPPINGS),
            current: 0,
            capturer: Capturer::new(devices),
            notices,
        };
        dialog.load_current();
        info!("Input dialog ready for {}", plugin_name);
        dialog
    }

    pub fn controller_count(&self) -> usize {
        self.slots.len()
    }

    pub fn current_controller(&self) -> usize {
        self.current
    }

    /// Controls with the mapping they edit, in display order
    pub fn controls(&self) -> impl Iterator<Item = (ControlId, &ButtonMapping)> + '_ {
        self.controls
            .iter()
            .enumerate()
            .map(|(index, control)| (ControlId(index), &control.mapping))
    }

    pub fn can_capture(&self) -> bool {
        self.capturer.is_enabled()
    }

    pub fn is_capturing(&self) -> bool {
        self.capturer.is_capturing()
    }

    /// Control being captured, if any
    pub fn capturing(&self) -> Option<CaptureTarget> {
        self.capturer.active_target()
    }

    pub fn is_dirty(&self, controller: usize) -> bool {
        self.slots.get(controller).is_some_and(ControllerSlot::is_dirty)
    }

    /// Bindings of `controller`, empty until the controller has been shown
    pub fn bindings(&self, controller: usize) -> &[Binding] {
        self.slots
            .get(controller)
            .map(ControllerSlot::bindings)
            .unwrap_or_default()
    }

    /// Switches the visible controller, loading its bindings on first use
    pub fn select_controller(&mut self, index: usize) {
        if index >= self.slots.len() {
            warn!("No controller slot {}", index);
            return;
        }
        if index != self.current {
            debug!("Showing controller {}", index + 1);
        }
        self.current = index;
        self.load_current();
    }

    /// Key specifications a control of the current controller shows
    pub fn projected(&self, control: ControlId) -> Vec<KeySpec> {
        let Some(control) = self.controls.get(control.0) else {
            return Vec::new();
        };
        control
            .binding
            .and_then(|index| self.slots[self.current].bindings().get(index))
            .map(|binding| project(&binding.keys, control.mapping.parameter))
            .unwrap_or_default()
    }

    pub fn display_text(&self, control: ControlId) -> String {
        let keys = self.projected(control);
        if keys.is_empty() {
            UNBOUND_TEXT.to_string()
        } else {
            serialize_all(&keys)
        }
    }

    /// Starts capturing for `control` of the current controller.
    ///
    /// A capture already running is torn down first. Returns false when the
    /// control is unknown or capturing is disabled.
    pub fn activate(&mut self, control: ControlId, now: Instant) -> bool {
        if control.0 >= self.controls.len() {
            warn!("Unknown control {:?}", control);
            return false;
        }
        let target = CaptureTarget {
            controller: self.current,
            control,
        };
        self.capturer.start(target, now)
    }

    /// Runs the poll tick when due. Returns true when a binding changed.
    pub fn poll(&mut self, now: Instant) -> bool {
        match self.capturer.tick(now) {
            Some(captured) => self.apply(captured),
            None => false,
        }
    }

    pub fn key_pressed(&mut self, code: i32) -> KeyOutcome {
        if let Some(captured) = self.capturer.key_press(code) {
            self.apply(captured);
            return KeyOutcome::Captured;
        }
        if code == ESCAPE_KEY {
            debug!("Escape pressed, requesting close");
            return KeyOutcome::CloseRequested;
        }
        KeyOutcome::Ignored
    }

    /// Time until the next poll tick, `None` when nothing is being captured
    pub fn next_poll_in(&self, now: Instant) -> Option<Duration> {
        self.capturer.next_poll_in(now)
    }

    /// Commits every controller slot
    pub fn accept(&mut self) {
        self.capturer.cancel();
        for slot in &self.slots {
            if let Err(e) = slot.commit(self.store.as_mut()) {
                warn!("{}", e);
                self.notices.push(Notice::warning(e.to_string()));
            }
        }
        info!("Bindings committed");
    }

    /// Discards every in-memory edit
    pub fn reject(&mut self) {
        self.capturer.cancel();
        info!("Binding changes discarded");
    }

    pub fn take_signals(&mut self) -> Vec<CaptureSignal> {
        self.capturer.take_signals()
    }

    pub fn take_notices(&mut self) -> Vec<Notice> {
        std::mem::take(&mut self.notices)
    }

    fn load_current(&mut self) {
        self.slots[self.current].load_bindings(&BUTTON_MAPPINGS, self.store.as_ref());
    }

    fn apply(&mut self, captured: Captured) -> bool {
        let Captured { target, key } = captured;
        let Some(control) = self.controls.get(target.control.0) else {
            warn!("Captured key for unknown control {:?}", target.control);
            return false;
        };
        let (Some(index), Some(slot)) = (control.binding, self.slots.get_mut(target.controller))
        else {
            return false;
        };
        slot.apply(index, &key, control.mapping.parameter)
    }
}
